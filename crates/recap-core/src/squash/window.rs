//! Inventory window tracking.

use std::collections::BTreeMap;

use crate::record::TimedRecord;

/// Main inventory snapshot and slot changes, plus the queue of records for
/// whatever secondary window is currently open.
#[derive(Debug, Clone, Default)]
pub struct WindowTracker {
    main_inventory: Option<TimedRecord>,
    slot_changes: BTreeMap<i16, TimedRecord>,
    current_window: Vec<TimedRecord>,
    close_records: Vec<TimedRecord>,
}

impl WindowTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A full main-inventory snapshot. Earlier slot changes are superseded.
    pub fn on_main_inventory(&mut self, record: TimedRecord) {
        self.slot_changes.clear();
        self.main_inventory = Some(record);
    }

    /// A main-inventory slot change; only the latest per slot is kept.
    pub fn on_main_slot(&mut self, slot: i16, record: TimedRecord) {
        self.slot_changes.insert(slot, record);
    }

    /// A record concerning the open secondary window.
    pub fn on_secondary(&mut self, record: TimedRecord) {
        self.current_window.push(record);
    }

    /// A close-window record: kept, and ends the secondary window.
    pub fn on_close(&mut self, record: TimedRecord) {
        self.current_window.clear();
        self.close_records.push(record);
    }

    /// Discard the open window's queue.
    pub fn clear_current(&mut self) {
        self.current_window.clear();
    }

    #[must_use]
    pub fn slot_change_count(&self) -> usize {
        self.slot_changes.len()
    }

    #[must_use]
    pub fn secondary_len(&self) -> usize {
        self.current_window.len()
    }

    /// Emit the secondary queue, close records, the snapshot and then slot
    /// changes.
    ///
    /// Every retained slot change postdates the snapshot, so the snapshot
    /// goes first for records that share its timestamp.
    pub fn synthesize(self, out: &mut Vec<TimedRecord>) {
        out.extend(self.current_window);
        out.extend(self.close_records);
        out.extend(self.main_inventory);
        out.extend(self.slot_changes.into_values());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CloseWindowData, Record, SetSlotData, WindowItemsData};

    fn slot(slot: i16, time: i64) -> TimedRecord {
        TimedRecord::new(
            time,
            Record::SetSlot(SetSlotData {
                window_id: 0,
                slot,
                item: None,
            }),
        )
    }

    fn items(time: i64) -> TimedRecord {
        TimedRecord::new(
            time,
            Record::WindowItems(WindowItemsData {
                window_id: 0,
                items: vec![None; 45],
            }),
        )
    }

    fn close(time: i64) -> TimedRecord {
        TimedRecord::new(time, Record::CloseWindow(CloseWindowData { window_id: 2 }))
    }

    #[test]
    fn latest_slot_change_wins() {
        let mut tracker = WindowTracker::new();
        tracker.on_main_slot(36, slot(36, 1));
        tracker.on_main_slot(36, slot(36, 2));
        tracker.on_main_slot(37, slot(37, 3));
        assert_eq!(tracker.slot_change_count(), 2);

        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        let times: Vec<_> = out.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![2, 3]);
    }

    #[test]
    fn snapshot_supersedes_earlier_slot_changes() {
        let mut tracker = WindowTracker::new();
        tracker.on_main_slot(36, slot(36, 1));
        tracker.on_main_inventory(items(2));
        tracker.on_main_slot(40, slot(40, 2));

        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind(), crate::RecordKind::WindowItems);
        assert_eq!(out[1].kind(), crate::RecordKind::SetSlot);
    }

    #[test]
    fn close_clears_secondary_queue_but_is_kept() {
        let mut tracker = WindowTracker::new();
        tracker.on_secondary(items(1));
        tracker.on_close(close(2));
        tracker.on_secondary(items(3));
        tracker.on_close(close(4));
        assert_eq!(tracker.secondary_len(), 0);

        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.kind() == crate::RecordKind::CloseWindow));
    }
}
