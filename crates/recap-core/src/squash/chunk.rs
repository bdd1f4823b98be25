//! Chunk column and block change tracking.

use std::collections::BTreeMap;

use crate::coord::{
    SECTIONS_PER_CHUNK, block_index, chunk_key, chunk_key_x, chunk_key_z, chunk_of_block,
    section_of,
};
use crate::record::{BlockChangeRecord, ChunkColumn, Record, SectionPayload, TimedRecord};

/// Section-local block index → `(last write time, change)`.
type BlockChanges = BTreeMap<u16, (i64, BlockChangeRecord)>;

/// Running state for one loaded chunk column.
#[derive(Debug, Clone)]
pub struct ChunkState {
    first_appearance: i64,
    x: i32,
    z: i32,
    sections: [Option<SectionPayload>; SECTIONS_PER_CHUNK],
    biome: Option<Vec<u8>>,
    block_changes: [BlockChanges; SECTIONS_PER_CHUNK],
}

impl ChunkState {
    fn new(first_appearance: i64, x: i32, z: i32) -> Self {
        Self {
            first_appearance,
            x,
            z,
            sections: Default::default(),
            biome: None,
            block_changes: Default::default(),
        }
    }

    #[must_use]
    pub const fn first_appearance(&self) -> i64 {
        self.first_appearance
    }

    #[must_use]
    pub fn section(&self, index: usize) -> Option<&SectionPayload> {
        self.sections.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn biome(&self) -> Option<&[u8]> {
        self.biome.as_deref()
    }

    /// Number of pending block changes across all sections.
    #[must_use]
    pub fn block_change_count(&self) -> usize {
        self.block_changes.iter().map(BTreeMap::len).sum()
    }

    fn apply(&mut self, column: ChunkColumn) {
        for (index, section) in column.sections.into_iter().enumerate() {
            if let Some(payload) = section {
                // The new payload already reflects every earlier change.
                self.block_changes[index].clear();
                self.sections[index] = Some(payload);
            }
        }
        if column.biome.is_some() {
            self.biome = column.biome;
        }
    }
}

/// Outcome of a block change, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockUpdate {
    /// Stored as the newest change for its position.
    Stored,
    /// An equal or newer change already holds the position.
    Stale,
    /// No tracked chunk holds the position.
    Orphaned,
}

/// Tracks loaded chunk columns and unloads of columns never seen loaded.
#[derive(Debug, Clone, Default)]
pub struct ChunkTracker {
    chunks: BTreeMap<u64, ChunkState>,
    pending_unloads: BTreeMap<u64, i64>,
}

impl ChunkTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[must_use]
    pub fn get(&self, x: i32, z: i32) -> Option<&ChunkState> {
        self.chunks.get(&chunk_key(x, z))
    }

    /// Unloads of untracked columns, keyed by packed coordinate.
    #[must_use]
    pub const fn pending_unloads(&self) -> &BTreeMap<u64, i64> {
        &self.pending_unloads
    }

    /// Apply one column of a chunk data record.
    pub fn on_column_update(&mut self, time: i64, column: ChunkColumn) {
        let key = chunk_key(column.x, column.z);
        if column.is_unload() {
            if self.chunks.remove(&key).is_none() {
                self.pending_unloads.insert(key, time);
            }
            return;
        }
        self.pending_unloads.remove(&key);
        self.chunks
            .entry(key)
            .or_insert_with(|| ChunkState::new(time, column.x, column.z))
            .apply(column);
    }

    /// Apply one block change, keeping the newest change per position.
    pub fn on_block_change(&mut self, time: i64, change: BlockChangeRecord) -> BlockUpdate {
        let pos = change.position;
        let (cx, cz) = chunk_of_block(pos.x, pos.z);
        let Some(chunk) = self.chunks.get_mut(&chunk_key(cx, cz)) else {
            return BlockUpdate::Orphaned;
        };
        let Some(section) = section_of(pos.y) else {
            return BlockUpdate::Orphaned;
        };
        let changes = &mut chunk.block_changes[section];
        let index = block_index(pos.x, pos.y, pos.z);
        if changes.get(&index).is_some_and(|(stored, _)| time <= *stored) {
            return BlockUpdate::Stale;
        }
        changes.insert(index, (time, change));
        BlockUpdate::Stored
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.pending_unloads.clear();
    }

    /// Emit pending unloads, then each tracked column followed by its block
    /// changes.
    pub fn synthesize(self, out: &mut Vec<TimedRecord>) {
        for (key, time) in self.pending_unloads {
            out.push(TimedRecord::new(
                time,
                Record::ChunkData(ChunkColumn::unload(chunk_key_x(key), chunk_key_z(key))),
            ));
        }

        for chunk in self.chunks.into_values() {
            out.push(TimedRecord::new(
                chunk.first_appearance,
                Record::ChunkData(ChunkColumn {
                    x: chunk.x,
                    z: chunk.z,
                    sections: chunk.sections,
                    biome: chunk.biome,
                }),
            ));
            for changes in chunk.block_changes {
                for (time, change) in changes.into_values() {
                    out.push(TimedRecord::new(time, Record::BlockChange(change)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BlockPos;

    fn column(x: i32, z: i32, filled: &[usize]) -> ChunkColumn {
        let mut column = ChunkColumn::unload(x, z);
        for &index in filled {
            column.sections[index] = Some(vec![u8::try_from(index).unwrap_or(0); 4]);
        }
        column
    }

    fn change(x: i32, y: i32, z: i32, block: u32) -> BlockChangeRecord {
        BlockChangeRecord {
            position: BlockPos::new(x, y, z),
            block,
        }
    }

    #[test]
    fn load_then_unload_leaves_nothing() {
        let mut tracker = ChunkTracker::new();
        tracker.on_column_update(1, column(0, 0, &[0]));
        tracker.on_column_update(2, ChunkColumn::unload(0, 0));
        assert!(tracker.is_empty());
        assert!(tracker.pending_unloads().is_empty());

        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn unload_of_untracked_chunk_is_emitted_once() {
        let mut tracker = ChunkTracker::new();
        tracker.on_column_update(5, ChunkColumn::unload(3, -2));
        tracker.on_column_update(6, ChunkColumn::unload(3, -2));

        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time, 6);
        match &out[0].record {
            Record::ChunkData(c) => {
                assert!(c.is_unload());
                assert_eq!((c.x, c.z), (3, -2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn load_cancels_pending_unload() {
        let mut tracker = ChunkTracker::new();
        tracker.on_column_update(1, ChunkColumn::unload(1, 1));
        tracker.on_column_update(2, column(1, 1, &[3]));
        assert!(tracker.pending_unloads().is_empty());
        assert_eq!(tracker.get(1, 1).map(ChunkState::first_appearance), Some(2));
    }

    #[test]
    fn sections_merge_and_biome_sticks() {
        let mut tracker = ChunkTracker::new();
        let mut first = column(0, 0, &[0, 1]);
        first.biome = Some(vec![7; 4]);
        tracker.on_column_update(1, first);
        tracker.on_column_update(2, column(0, 0, &[1, 2]));

        let chunk = tracker.get(0, 0).expect("tracked");
        assert_eq!(chunk.first_appearance(), 1);
        assert!(chunk.section(0).is_some());
        assert!(chunk.section(2).is_some());
        assert!(chunk.section(3).is_none());
        assert_eq!(chunk.biome(), Some(&[7u8; 4][..]));
    }

    #[test]
    fn newer_block_change_wins_regardless_of_call_order() {
        let mut tracker = ChunkTracker::new();
        tracker.on_column_update(0, column(0, 0, &[0]));
        assert_eq!(tracker.on_block_change(5, change(1, 2, 3, 10)), BlockUpdate::Stored);
        assert_eq!(tracker.on_block_change(3, change(1, 2, 3, 20)), BlockUpdate::Stale);
        assert_eq!(tracker.on_block_change(5, change(1, 2, 3, 30)), BlockUpdate::Stale);

        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].time, 5);
        assert_eq!(out[1].record, Record::BlockChange(change(1, 2, 3, 10)));
    }

    #[test]
    fn block_change_in_untracked_chunk_is_dropped() {
        let mut tracker = ChunkTracker::new();
        tracker.on_column_update(0, column(0, 0, &[0]));
        assert_eq!(tracker.on_block_change(1, change(16, 0, 0, 1)), BlockUpdate::Orphaned);
        assert_eq!(tracker.on_block_change(1, change(0, 300, 0, 1)), BlockUpdate::Orphaned);
        assert_eq!(tracker.on_block_change(1, change(15, 0, 15, 1)), BlockUpdate::Stored);
    }

    #[test]
    fn block_changes_are_located_by_chunk_of_block() {
        let mut tracker = ChunkTracker::new();
        tracker.on_column_update(0, column(-1, 2, &[0]));
        assert_eq!(tracker.on_block_change(1, change(-1, 4, 40, 9)), BlockUpdate::Stored);
        assert_eq!(tracker.get(-1, 2).map(ChunkState::block_change_count), Some(1));
    }

    #[test]
    fn section_overwrite_discards_its_block_changes() {
        let mut tracker = ChunkTracker::new();
        tracker.on_column_update(0, column(0, 0, &[0, 1]));
        tracker.on_block_change(1, change(0, 3, 0, 1));
        tracker.on_block_change(1, change(0, 20, 0, 1));
        tracker.on_column_update(2, column(0, 0, &[0]));
        assert_eq!(tracker.get(0, 0).map(ChunkState::block_change_count), Some(1));
    }
}
