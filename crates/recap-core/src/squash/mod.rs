//! Single-pass squash of a recorded session.
//!
//! The [`Squasher`] consumes every record of a recording in order, folding
//! each one into per-domain running state, and emits nothing until
//! [`Squasher::finish`]. The output replays to the same final observable
//! state as the input, plus the motion needed to move entities to where
//! they ended up.
//!
//! # Emission order
//!
//! At flush the following lists are concatenated and stably sorted by
//! timestamp:
//!
//! 1. unhandled pass-through records
//! 2. current-world records (sounds, signs, explosions, destroys, ...)
//! 3. secondary window records and close-window records
//! 4. the main-inventory snapshot and slot changes
//! 5. one session record (join, respawn or game-mode notify), experience
//!    and abilities
//! 6. entity synthesis
//! 7. chunk synthesis
//!
//! Team and map records follow the sorted block, unsorted, at the end
//! timestamp. They are order-independent.
//!
//! # Respawn
//!
//! A respawn discards entities, chunks, pending unloads, the current-world
//! queue and the open window. Teams, maps, the main inventory, close records
//! and the session scalars survive.

pub mod chunk;
pub mod entity;
pub mod global;
pub mod team;
pub mod window;

use serde::{Deserialize, Serialize};

use crate::record::{
    BlockChangeRecord, Domain, EntityRef, Notification, NotifyClientData, Record, RecordKind,
    TimedRecord,
};
use crate::registry::DecodeRegistry;

pub use chunk::{BlockUpdate, ChunkState, ChunkTracker};
pub use entity::{EntityState, EntityTracker};
pub use global::GlobalState;
pub use team::{TeamState, TeamStatus, TeamTracker};
pub use window::WindowTracker;

/// Kinds the engine interprets and therefore requires decoded.
pub const DECODED_KINDS: [RecordKind; 36] = [
    RecordKind::SpawnPlayer,
    RecordKind::SpawnObject,
    RecordKind::SpawnMob,
    RecordKind::SpawnPainting,
    RecordKind::SpawnExpOrb,
    RecordKind::SpawnGlobalEntity,
    RecordKind::Animation,
    RecordKind::CollectItem,
    RecordKind::DestroyEntities,
    RecordKind::EntityAttach,
    RecordKind::EntityEffect,
    RecordKind::EntityRemoveEffect,
    RecordKind::EntityEquipment,
    RecordKind::EntityHeadLook,
    RecordKind::EntityMetadata,
    RecordKind::EntityMovement,
    RecordKind::EntityTeleport,
    RecordKind::EntityVelocity,
    RecordKind::EntityProperties,
    RecordKind::EntityStatus,
    RecordKind::UseBed,
    RecordKind::BlockBreakAnim,
    RecordKind::NotifyClient,
    RecordKind::SetExperience,
    RecordKind::PlayerAbilities,
    RecordKind::JoinGame,
    RecordKind::Respawn,
    RecordKind::Team,
    RecordKind::CloseWindow,
    RecordKind::WindowItems,
    RecordKind::SetSlot,
    RecordKind::ChunkData,
    RecordKind::MultiChunkData,
    RecordKind::BlockChange,
    RecordKind::MultiBlockChange,
    RecordKind::MapData,
];

// ---------------------------------------------------------------------------
// Configuration and report
// ---------------------------------------------------------------------------

/// Engine-facing squash options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquashConfig {
    /// Discard particle records instead of replaying them.
    pub drop_particles: bool,
    /// Discard transaction-confirm records instead of replaying them.
    pub drop_transaction_confirms: bool,
}

impl Default for SquashConfig {
    fn default() -> Self {
        Self {
            drop_particles: true,
            drop_transaction_confirms: true,
        }
    }
}

/// Summary of one squash pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquashReport {
    /// Records passed to [`Squasher::consume`].
    pub records_consumed: usize,
    /// Records in the flushed output.
    pub records_emitted: usize,
    /// Particle records discarded.
    pub particles_dropped: usize,
    /// Transaction-confirm records discarded.
    pub confirms_dropped: usize,
    /// Block changes outside any tracked chunk.
    pub orphan_block_changes: usize,
    /// Opaque records passed through without interpretation.
    pub opaque_passed: usize,
    /// Respawns seen.
    pub respawns: usize,
    /// Entities still tracked at flush.
    pub entities_tracked: usize,
    /// Chunk columns still tracked at flush.
    pub chunks_tracked: usize,
    /// Teams with pending output at flush.
    pub teams_tracked: usize,
}

impl SquashReport {
    /// Records dropped for any reason.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.particles_dropped + self.confirms_dropped + self.orphan_block_changes
    }
}

// ---------------------------------------------------------------------------
// Squasher
// ---------------------------------------------------------------------------

/// The squash engine for one recording.
///
/// Construct once, [`consume`](Self::consume) every record in input order,
/// then call [`finish`](Self::finish) or [`flush`](Self::flush) exactly once.
#[derive(Debug, Clone, Default)]
pub struct Squasher {
    config: SquashConfig,
    last_time: i64,
    unhandled: Vec<TimedRecord>,
    current_world: Vec<TimedRecord>,
    entities: EntityTracker,
    chunks: ChunkTracker,
    windows: WindowTracker,
    teams: TeamTracker,
    global: GlobalState,
    report: SquashReport,
}

impl Squasher {
    #[must_use]
    pub fn new(config: SquashConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Register every kind this engine requires decoded.
    pub fn declare_decoding(registry: &mut DecodeRegistry) {
        registry.require_all(DECODED_KINDS);
    }

    /// A registry holding exactly the kinds this engine requires decoded.
    #[must_use]
    pub fn registry() -> DecodeRegistry {
        let mut registry = DecodeRegistry::new();
        Self::declare_decoding(&mut registry);
        registry
    }

    #[must_use]
    pub const fn config(&self) -> &SquashConfig {
        &self.config
    }

    #[must_use]
    pub const fn entities(&self) -> &EntityTracker {
        &self.entities
    }

    #[must_use]
    pub const fn chunks(&self) -> &ChunkTracker {
        &self.chunks
    }

    #[must_use]
    pub const fn teams(&self) -> &TeamTracker {
        &self.teams
    }

    /// Fold one record into the running state.
    ///
    /// Always returns `true`: every record is absorbed and nothing reaches
    /// the output before flush.
    pub fn consume(&mut self, time: i64, record: Record) -> bool {
        self.last_time = time;
        self.report.records_consumed += 1;

        if let Record::Opaque(opaque) = &record {
            let kind = opaque.kind;
            let declared = DECODED_KINDS.contains(&kind);
            debug_assert!(!declared, "{kind} must arrive decoded");
            if declared {
                tracing::warn!(%kind, time, "opaque record of a decoded kind; passing through");
                self.report.opaque_passed += 1;
                self.unhandled.push(TimedRecord::new(time, record));
                return true;
            }
        }

        match record.kind().domain() {
            Domain::Entity => self.on_entity(time, record),
            Domain::Chunk => self.on_chunk(time, record),
            Domain::World => self.on_world(time, record),
            Domain::Window => self.on_window(time, record),
            Domain::Team => match record {
                Record::Team(data) => self.teams.on_team(data),
                other => self.pass_through(time, other),
            },
            Domain::Session => self.on_session(time, record),
            Domain::Other => self.pass_through(time, record),
        }
        true
    }

    fn pass_through(&mut self, time: i64, record: Record) {
        if record.is_opaque() {
            self.report.opaque_passed += 1;
        }
        self.unhandled.push(TimedRecord::new(time, record));
    }

    fn on_entity(&mut self, time: i64, record: Record) {
        match record.entity_ref() {
            EntityRef::None => self.pass_through(time, record),
            EntityRef::Multiple(ids) => {
                if let Record::DestroyEntities(_) = record {
                    self.entities.on_multi_destroy(&ids);
                    self.current_world.push(TimedRecord::new(time, record));
                } else {
                    self.entities
                        .on_multi_generic(&ids, TimedRecord::new(time, record));
                }
            }
            EntityRef::Single(id) => match record {
                Record::EntityMovement(movement) => self.entities.on_movement(time, &movement),
                Record::EntityTeleport(teleport) => self.entities.on_teleport(time, &teleport),
                Record::SpawnPlayer(_)
                | Record::SpawnObject(_)
                | Record::SpawnMob(_)
                | Record::SpawnPainting(_)
                | Record::SpawnExpOrb(_)
                | Record::SpawnGlobalEntity(_) => {
                    self.entities.on_spawn(id, TimedRecord::new(time, record));
                }
                other => self.entities.on_generic(id, TimedRecord::new(time, other)),
            },
        }
    }

    fn on_chunk(&mut self, time: i64, record: Record) {
        let block = |chunks: &mut ChunkTracker, report: &mut SquashReport, change: BlockChangeRecord| {
            if chunks.on_block_change(time, change) == BlockUpdate::Orphaned {
                report.orphan_block_changes += 1;
                tracing::trace!(time, ?change, "block change outside tracked chunks dropped");
            }
        };
        match record {
            Record::ChunkData(column) => self.chunks.on_column_update(time, column),
            Record::MultiChunkData(data) => {
                for column in data.columns {
                    self.chunks.on_column_update(time, column);
                }
            }
            Record::BlockChange(change) => block(&mut self.chunks, &mut self.report, change),
            Record::MultiBlockChange(data) => {
                for change in data.records {
                    block(&mut self.chunks, &mut self.report, change);
                }
            }
            other => self.pass_through(time, other),
        }
    }

    fn on_world(&mut self, time: i64, record: Record) {
        if record.kind() == RecordKind::SpawnParticle && self.config.drop_particles {
            self.report.particles_dropped += 1;
            return;
        }
        self.current_world.push(TimedRecord::new(time, record));
    }

    fn on_window(&mut self, time: i64, record: Record) {
        match record {
            Record::CloseWindow(_) => self.windows.on_close(TimedRecord::new(time, record)),
            Record::WindowItems(ref items) if items.window_id == 0 => {
                self.windows.on_main_inventory(TimedRecord::new(time, record));
            }
            Record::SetSlot(ref slot) if slot.is_main_inventory() => {
                let index = slot.slot;
                self.windows.on_main_slot(index, TimedRecord::new(time, record));
            }
            other if other.kind() == RecordKind::ConfirmTransaction
                && self.config.drop_transaction_confirms =>
            {
                self.report.confirms_dropped += 1;
            }
            other => self.windows.on_secondary(TimedRecord::new(time, other)),
        }
    }

    fn on_session(&mut self, time: i64, record: Record) {
        match record {
            Record::JoinGame(join) => self.global.on_join(time, join),
            Record::Respawn(respawn) => {
                self.global.on_respawn(time, respawn);
                self.reset_world();
            }
            Record::NotifyClient(NotifyClientData {
                notification: Notification::ChangeGameMode { game_mode },
            }) => self.global.on_game_mode(game_mode),
            Record::SetExperience(experience) => self.global.on_experience(experience),
            Record::PlayerAbilities(abilities) => self.global.on_abilities(abilities),
            Record::MapData(map) => self.global.on_map(map),
            other => self.pass_through(time, other),
        }
    }

    fn reset_world(&mut self) {
        self.report.respawns += 1;
        tracing::debug!(
            entities = self.entities.len(),
            chunks = self.chunks.len(),
            "respawn: discarding world state"
        );
        self.entities.clear();
        self.chunks.clear();
        self.current_world.clear();
        self.windows.clear_current();
    }

    /// Synthesize the squashed stream, stamping teams and maps with
    /// `end_time`.
    #[must_use]
    pub fn flush(self, end_time: i64) -> Vec<TimedRecord> {
        self.finish(end_time).0
    }

    /// Like [`flush`](Self::flush), also returning the pass report.
    #[must_use]
    pub fn finish(self, end_time: i64) -> (Vec<TimedRecord>, SquashReport) {
        let Self {
            last_time,
            unhandled,
            current_world,
            entities,
            chunks,
            windows,
            teams,
            mut global,
            mut report,
            ..
        } = self;

        report.entities_tracked = entities.len();
        report.chunks_tracked = chunks.len();
        report.teams_tracked = teams.len();

        let mut out = unhandled;
        out.extend(current_world);
        windows.synthesize(&mut out);
        global.synthesize_session(last_time, &mut out);
        entities.synthesize(&mut out);
        chunks.synthesize(&mut out);
        out.sort_by_key(|record| record.time);

        teams.synthesize(end_time, &mut out);
        global.synthesize_maps(end_time, &mut out);

        report.records_emitted = out.len();
        tracing::info!(
            consumed = report.records_consumed,
            emitted = report.records_emitted,
            dropped = report.dropped(),
            entities = report.entities_tracked,
            chunks = report.chunks_tracked,
            teams = report.teams_tracked,
            "squash complete"
        );
        (out, report)
    }
}

/// Run one complete squash pass over `records`.
#[must_use]
pub fn squash(
    records: impl IntoIterator<Item = TimedRecord>,
    end_time: i64,
    config: &SquashConfig,
) -> (Vec<TimedRecord>, SquashReport) {
    let mut squasher = Squasher::new(config.clone());
    for TimedRecord { time, record } in records {
        squasher.consume(time, record);
    }
    squasher.finish(end_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::*;

    fn at(time: i64, record: Record) -> TimedRecord {
        TimedRecord::new(time, record)
    }

    fn spawn(id: i32) -> Record {
        Record::SpawnMob(SpawnMobData {
            entity_id: id,
            mob_type: 50,
            location: Location::new(0.0, 64.0, 0.0, 0.0, 0.0),
            head_yaw: 0.0,
            velocity: [0.0; 3],
            metadata: vec![],
        })
    }

    fn step(id: i32, dx: f64) -> Record {
        Record::EntityMovement(EntityMovementData {
            entity_id: id,
            kind: MovementKind::Position,
            dx,
            dy: 0.0,
            dz: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: true,
        })
    }

    fn particle() -> Record {
        Record::SpawnParticle(SpawnParticleData {
            particle: 1,
            long_distance: false,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            offset: [0.0; 3],
            speed: 0.0,
            amount: 1,
        })
    }

    fn chat(message: &str) -> Record {
        Record::Chat(ChatData {
            message: message.to_string(),
            position: 0,
        })
    }

    fn respawn() -> Record {
        Record::Respawn(RespawnData {
            dimension: -1,
            difficulty: Difficulty::Easy,
            game_mode: GameMode::Survival,
            world_type: WorldType::Default,
        })
    }

    #[test]
    fn consume_always_absorbs() {
        let mut squasher = Squasher::default();
        assert!(squasher.consume(0, chat("hello")));
        assert!(squasher.consume(1, particle()));
        assert!(squasher.consume(2, spawn(1)));
    }

    #[test]
    fn destroyed_entity_leaves_only_the_destroy() {
        let records = vec![
            at(0, spawn(5)),
            at(10, step(5, 1.0)),
            at(20, step(5, 1.0)),
            at(30, Record::DestroyEntities(DestroyEntitiesData { entity_ids: vec![5] })),
        ];
        let (out, report) = squash(records, 40, &SquashConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time, 30);
        assert_eq!(out[0].kind(), RecordKind::DestroyEntities);
        assert_eq!(report.entities_tracked, 0);
    }

    #[test]
    fn particles_dropped_by_default_and_kept_on_request() {
        let (out, report) = squash(vec![at(0, particle())], 1, &SquashConfig::default());
        assert!(out.is_empty());
        assert_eq!(report.particles_dropped, 1);

        let keep = SquashConfig {
            drop_particles: false,
            ..SquashConfig::default()
        };
        let (out, _) = squash(vec![at(0, particle())], 1, &keep);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn transaction_confirms_dropped() {
        let confirm = Record::ConfirmTransaction(ConfirmTransactionData {
            window_id: 1,
            action_id: 3,
            accepted: true,
        });
        let (out, report) = squash(vec![at(0, confirm)], 1, &SquashConfig::default());
        assert!(out.is_empty());
        assert_eq!(report.confirms_dropped, 1);
    }

    #[test]
    fn respawn_discards_world_but_keeps_unhandled() {
        let records = vec![
            at(0, chat("before")),
            at(1, spawn(3)),
            at(
                2,
                Record::PlaySound(PlaySoundData {
                    sound: "step".into(),
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    volume: 1.0,
                    pitch: 1.0,
                }),
            ),
            at(5, respawn()),
        ];
        let (out, report) = squash(records, 10, &SquashConfig::default());
        let kinds: Vec<_> = out.iter().map(TimedRecord::kind).collect();
        assert_eq!(kinds, vec![RecordKind::Chat, RecordKind::Respawn]);
        assert_eq!(report.respawns, 1);
    }

    #[test]
    fn output_is_sorted_with_teams_and_maps_last() {
        let records = vec![
            at(
                0,
                Record::Team(TeamData {
                    name: "t".into(),
                    action: TeamAction::AddPlayers {
                        players: vec!["p".into()],
                    },
                }),
            ),
            at(
                1,
                Record::MapData(MapDataData {
                    map_id: 4,
                    scale: 0,
                    data: vec![],
                }),
            ),
            at(3, chat("late")),
            at(2, spawn(1)),
        ];
        let (out, _) = squash(records, 50, &SquashConfig::default());
        let times: Vec<_> = out.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![2, 3, 50, 50]);
        assert_eq!(out[2].kind(), RecordKind::Team);
        assert_eq!(out[3].kind(), RecordKind::MapData);
    }

    #[test]
    fn non_gamemode_notify_passes_through() {
        let rain = Record::NotifyClient(NotifyClientData {
            notification: Notification::StartRain,
        });
        let (out, _) = squash(vec![at(4, rain.clone())], 9, &SquashConfig::default());
        assert_eq!(out, vec![at(4, rain)]);
    }

    #[test]
    fn opaque_undeclared_kind_passes_through() {
        let opaque = Record::Opaque(OpaqueRecord {
            kind: RecordKind::PluginMessage,
            data: serde_json::json!({"channel": "MC|Brand"}),
        });
        let (out, report) = squash(vec![at(1, opaque)], 2, &SquashConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(report.opaque_passed, 1);
    }

    #[test]
    fn registry_declares_interpreted_kinds_only() {
        let registry = Squasher::registry();
        assert!(registry.requires(RecordKind::EntityMovement));
        assert!(registry.requires(RecordKind::MultiBlockChange));
        assert!(registry.requires(RecordKind::Team));
        assert!(registry.requires(RecordKind::MapData));
        assert!(!registry.requires(RecordKind::PlaySound));
        assert!(!registry.requires(RecordKind::Chat));
    }

    #[test]
    fn report_counts_consumed_and_emitted() {
        let records = vec![at(0, chat("a")), at(1, particle()), at(2, chat("b"))];
        let (out, report) = squash(records, 3, &SquashConfig::default());
        assert_eq!(report.records_consumed, 3);
        assert_eq!(report.records_emitted, out.len());
        assert_eq!(report.dropped(), 1);
    }
}
