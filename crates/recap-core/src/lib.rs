//! recap-core: replay squashing for recorded game sessions.
//!
//! A recording is a time-ordered stream of [`TimedRecord`]s. The
//! [`Squasher`] folds a prefix of that stream into the smallest record
//! sequence that rebuilds the same client state, so a viewer can jump to
//! any point of a long recording without replaying everything before it.
//!
//! # Conventions
//!
//! - **Errors**: the engine is infallible; the log codec uses `thiserror`
//!   enums; config loading returns `anyhow::Result`.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod coord;
pub mod error;
pub mod log;
pub mod record;
pub mod registry;
pub mod squash;
pub mod verify;

pub use config::RecapConfig;
pub use error::ErrorCode;
pub use record::{Record, RecordKind, TimedRecord};
pub use registry::DecodeRegistry;
pub use squash::{SquashConfig, SquashReport, Squasher, squash};
pub use verify::{ReplayView, verify_squash};
