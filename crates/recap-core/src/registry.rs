//! Decode allow-list.
//!
//! Decoding every payload of a long recording is wasted work when the
//! consumer only interprets a handful of kinds. A [`DecodeRegistry`] names
//! the kinds that must arrive as typed [`Record`](crate::Record) variants;
//! everything else is read as [`Record::Opaque`](crate::Record::Opaque).

use std::collections::BTreeSet;

use crate::record::RecordKind;

/// The set of record kinds a consumer requires decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeRegistry {
    kinds: BTreeSet<RecordKind>,
}

impl DecodeRegistry {
    /// An empty registry: nothing is decoded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that decodes every known kind.
    #[must_use]
    pub fn decode_all() -> Self {
        Self {
            kinds: RecordKind::ALL.into_iter().collect(),
        }
    }

    /// Require `kind` to be decoded.
    pub fn require(&mut self, kind: RecordKind) -> &mut Self {
        self.kinds.insert(kind);
        self
    }

    /// Require every kind in `kinds`.
    pub fn require_all(&mut self, kinds: impl IntoIterator<Item = RecordKind>) -> &mut Self {
        self.kinds.extend(kinds);
        self
    }

    #[must_use]
    pub fn requires(&self, kind: RecordKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Required kinds in catalog order.
    pub fn kinds(&self) -> impl Iterator<Item = RecordKind> + '_ {
        self.kinds.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
