//! Per-entity motion accumulation and pass-through queues.
//!
//! Movement is tracked in fixed point (1/32 block) so that replaying the
//! synthesized relative moves lands on exactly the same cell as replaying
//! every original move.

use std::collections::BTreeMap;

use crate::record::{
    EntityMovementData, EntityTeleportData, Location, MovementKind, Record, TimedRecord,
};

/// Fixed-point units per block.
pub const FIXED_POINT_SCALE: f64 = 32.0;

/// Smallest relative step a single movement record can carry.
pub const MOVE_MIN: i64 = i8::MIN as i64;

/// Largest relative step a single movement record can carry.
pub const MOVE_MAX: i64 = i8::MAX as i64;

/// Convert a block distance to fixed point.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_fixed(blocks: f64) -> i64 {
    (blocks * FIXED_POINT_SCALE).round() as i64
}

/// Convert a fixed-point distance back to blocks.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_fixed(units: i64) -> f64 {
    units as f64 / FIXED_POINT_SCALE
}

#[derive(Debug, Clone, PartialEq)]
struct Teleport {
    location: Location,
    on_ground: bool,
}

/// A queued pass-through record: owned by one entity, or shared between
/// every entity it names.
#[derive(Debug, Clone)]
enum Queued {
    Own(TimedRecord),
    Shared(usize),
}

#[derive(Debug, Clone)]
struct SharedRecord {
    record: TimedRecord,
    ids: Vec<i32>,
}

/// Running state for one entity id.
#[derive(Debug, Clone, Default)]
pub struct EntityState {
    last_timestamp: i64,
    teleport: Option<Teleport>,
    delta: [i64; 3],
    orientation: Option<(f32, f32)>,
    queue: Vec<Queued>,
}

impl EntityState {
    /// Accumulated relative movement, in fixed point.
    #[must_use]
    pub const fn delta(&self) -> [i64; 3] {
        self.delta
    }

    /// Last known absolute location, if a teleport was seen.
    #[must_use]
    pub fn absolute_location(&self) -> Option<Location> {
        self.teleport.as_ref().map(|t| t.location)
    }

    /// Orientation set by rotating movement since the last teleport.
    #[must_use]
    pub const fn orientation(&self) -> Option<(f32, f32)> {
        self.orientation
    }

    #[must_use]
    pub const fn last_timestamp(&self) -> i64 {
        self.last_timestamp
    }

    fn reset_motion(&mut self) {
        self.teleport = None;
        self.delta = [0; 3];
        self.orientation = None;
    }
}

/// Tracks every entity referenced since the last respawn.
#[derive(Debug, Clone, Default)]
pub struct EntityTracker {
    entities: BTreeMap<i32, EntityState>,
    shared: Vec<Option<SharedRecord>>,
}

impl EntityTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: i32) -> Option<&EntityState> {
        self.entities.get(&id)
    }

    fn entry(&mut self, id: i32) -> &mut EntityState {
        self.entities.entry(id).or_default()
    }

    /// Apply a relative movement and/or look update.
    pub fn on_movement(&mut self, time: i64, movement: &EntityMovementData) {
        let entity = self.entry(movement.entity_id);
        if movement.kind.carries_position() {
            entity.delta[0] += to_fixed(movement.dx);
            entity.delta[1] += to_fixed(movement.dy);
            entity.delta[2] += to_fixed(movement.dz);
        }
        if movement.kind.carries_rotation() {
            entity.orientation = Some((movement.yaw, movement.pitch));
        }
        entity.last_timestamp = time;
    }

    /// Record an absolute position. Discards motion accumulated so far.
    pub fn on_teleport(&mut self, time: i64, teleport: &EntityTeleportData) {
        let entity = self.entry(teleport.entity_id);
        entity.reset_motion();
        entity.teleport = Some(Teleport {
            location: teleport.location,
            on_ground: teleport.on_ground,
        });
        entity.last_timestamp = time;
    }

    /// Queue a spawn record. A spawn carries an absolute position and
    /// orientation of its own, so earlier motion no longer applies.
    pub fn on_spawn(&mut self, id: i32, record: TimedRecord) {
        let entity = self.entry(id);
        entity.reset_motion();
        entity.last_timestamp = record.time;
        entity.queue.push(Queued::Own(record));
    }

    /// Queue a single-entity record for verbatim replay.
    pub fn on_generic(&mut self, id: i32, record: TimedRecord) {
        let entity = self.entry(id);
        entity.last_timestamp = record.time;
        entity.queue.push(Queued::Own(record));
    }

    /// Forget every entity named by a destroy record.
    pub fn on_multi_destroy(&mut self, ids: &[i32]) {
        for id in ids {
            self.entities.remove(id);
        }
    }

    /// Queue a record that names several entities on each of them.
    ///
    /// The record is emitted at most once, and only if every entity it names
    /// is still tracked at synthesis.
    pub fn on_multi_generic(&mut self, ids: &[i32], record: TimedRecord) {
        let slot = self.shared.len();
        self.shared.push(Some(SharedRecord {
            record,
            ids: ids.to_vec(),
        }));
        for &id in ids {
            let entity = self.entry(id);
            if !matches!(entity.queue.last(), Some(Queued::Shared(s)) if *s == slot) {
                entity.queue.push(Queued::Shared(slot));
            }
        }
    }

    /// Drop all tracked entities.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.shared.clear();
    }

    /// Produce the minimal record list for every still-tracked entity.
    pub fn synthesize(self, out: &mut Vec<TimedRecord>) {
        let Self {
            entities,
            mut shared,
        } = self;

        for (&id, entity) in &entities {
            for queued in &entity.queue {
                match queued {
                    Queued::Own(record) => out.push(record.clone()),
                    Queued::Shared(slot) => {
                        let Some(shared) = shared.get_mut(*slot).and_then(Option::take) else {
                            continue;
                        };
                        if shared.ids.iter().all(|other| entities.contains_key(other)) {
                            out.push(shared.record);
                        }
                    }
                }
            }

            let time = entity.last_timestamp;
            if let Some(teleport) = &entity.teleport {
                out.push(TimedRecord::new(
                    time,
                    Record::EntityTeleport(EntityTeleportData {
                        entity_id: id,
                        location: teleport.location,
                        on_ground: teleport.on_ground,
                    }),
                ));
            }

            let mut delta = entity.delta;
            while delta != [0; 3] {
                let step = delta.map(|d| d.clamp(MOVE_MIN, MOVE_MAX));
                for (remaining, taken) in delta.iter_mut().zip(step) {
                    *remaining -= taken;
                }
                out.push(TimedRecord::new(
                    time,
                    Record::EntityMovement(EntityMovementData {
                        entity_id: id,
                        kind: MovementKind::Position,
                        dx: from_fixed(step[0]),
                        dy: from_fixed(step[1]),
                        dz: from_fixed(step[2]),
                        yaw: 0.0,
                        pitch: 0.0,
                        on_ground: false,
                    }),
                ));
            }

            if let Some((yaw, pitch)) = entity.orientation {
                out.push(TimedRecord::new(
                    time,
                    Record::EntityMovement(EntityMovementData {
                        entity_id: id,
                        kind: MovementKind::Rotation,
                        dx: 0.0,
                        dy: 0.0,
                        dz: 0.0,
                        yaw,
                        pitch,
                        on_ground: false,
                    }),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CollectItemData, EntityStatusData};

    fn movement(id: i32, kind: MovementKind, d: [f64; 3], look: (f32, f32)) -> EntityMovementData {
        EntityMovementData {
            entity_id: id,
            kind,
            dx: d[0],
            dy: d[1],
            dz: d[2],
            yaw: look.0,
            pitch: look.1,
            on_ground: true,
        }
    }

    fn teleport(id: i32, x: f64) -> EntityTeleportData {
        EntityTeleportData {
            entity_id: id,
            location: Location::new(x, 64.0, 0.0, 10.0, 5.0),
            on_ground: true,
        }
    }

    fn status(id: i32, time: i64) -> TimedRecord {
        TimedRecord::new(
            time,
            Record::EntityStatus(EntityStatusData {
                entity_id: id,
                status: 2,
            }),
        )
    }

    fn collect(a: i32, b: i32, time: i64) -> TimedRecord {
        TimedRecord::new(
            time,
            Record::CollectItem(CollectItemData {
                collected_entity_id: a,
                collector_entity_id: b,
            }),
        )
    }

    fn moves(out: &[TimedRecord]) -> Vec<&EntityMovementData> {
        out.iter()
            .filter_map(|r| match &r.record {
                Record::EntityMovement(m) if m.kind == MovementKind::Position => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn movement_accumulates_in_fixed_point() {
        let mut tracker = EntityTracker::new();
        tracker.on_movement(1, &movement(4, MovementKind::Position, [0.5, -1.0, 0.25], (0.0, 0.0)));
        tracker.on_movement(2, &movement(4, MovementKind::Position, [0.5, 0.0, 0.0], (0.0, 0.0)));
        let entity = tracker.get(4).expect("tracked");
        assert_eq!(entity.delta(), [32, -32, 8]);
        assert_eq!(entity.last_timestamp(), 2);
        assert_eq!(entity.orientation(), None);
    }

    #[test]
    fn rotation_only_movement_keeps_delta() {
        let mut tracker = EntityTracker::new();
        tracker.on_movement(1, &movement(4, MovementKind::Position, [1.0, 0.0, 0.0], (0.0, 0.0)));
        tracker.on_movement(2, &movement(4, MovementKind::Rotation, [9.0, 9.0, 9.0], (90.0, -10.0)));
        let entity = tracker.get(4).expect("tracked");
        assert_eq!(entity.delta(), [32, 0, 0]);
        assert_eq!(entity.orientation(), Some((90.0, -10.0)));
    }

    #[test]
    fn teleport_resets_motion() {
        let mut tracker = EntityTracker::new();
        tracker.on_movement(1, &movement(4, MovementKind::PositionRotation, [1.0, 1.0, 1.0], (1.0, 1.0)));
        tracker.on_teleport(2, &teleport(4, 100.0));
        let entity = tracker.get(4).expect("tracked");
        assert_eq!(entity.delta(), [0, 0, 0]);
        assert_eq!(entity.orientation(), None);
        assert_eq!(entity.absolute_location().map(|l| l.x), Some(100.0));
    }

    #[test]
    fn drains_each_axis_independently() {
        let mut tracker = EntityTracker::new();
        // 300 units on x, nothing on y, -5 on z.
        tracker.on_movement(7, &movement(1, MovementKind::Position, [300.0 / 32.0, 0.0, -5.0 / 32.0], (0.0, 0.0)));
        let mut out = Vec::new();
        tracker.synthesize(&mut out);

        let steps = moves(&out);
        assert_eq!(steps.len(), 3);
        let sum_x: i64 = steps.iter().map(|m| to_fixed(m.dx)).sum();
        let sum_z: i64 = steps.iter().map(|m| to_fixed(m.dz)).sum();
        assert_eq!(sum_x, 300);
        assert_eq!(sum_z, -5);
        for step in steps {
            for axis in [step.dx, step.dy, step.dz] {
                assert!((MOVE_MIN..=MOVE_MAX).contains(&to_fixed(axis)));
            }
        }
        assert!(out.iter().all(|r| r.time == 7));
    }

    #[test]
    fn synthesis_order_is_queue_teleport_moves_rotation() {
        let mut tracker = EntityTracker::new();
        tracker.on_generic(3, status(3, 1));
        tracker.on_teleport(2, &teleport(3, 0.0));
        tracker.on_movement(5, &movement(3, MovementKind::PositionRotation, [1.0, 0.0, 0.0], (45.0, 0.0)));

        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        let kinds: Vec<_> = out.iter().map(TimedRecord::kind).collect();
        assert_eq!(
            kinds,
            vec![
                crate::RecordKind::EntityStatus,
                crate::RecordKind::EntityTeleport,
                crate::RecordKind::EntityMovement,
                crate::RecordKind::EntityMovement,
            ]
        );
        assert_eq!(out[0].time, 1);
        assert!(out[1..].iter().all(|r| r.time == 5));
    }

    #[test]
    fn spawn_discards_earlier_motion() {
        let mut tracker = EntityTracker::new();
        tracker.on_teleport(1, &teleport(2, 50.0));
        tracker.on_movement(2, &movement(2, MovementKind::Position, [1.0, 0.0, 0.0], (0.0, 0.0)));
        tracker.on_spawn(2, status(2, 3));
        let entity = tracker.get(2).expect("tracked");
        assert_eq!(entity.delta(), [0; 3]);
        assert!(entity.absolute_location().is_none());
    }

    #[test]
    fn shared_record_emitted_once() {
        let mut tracker = EntityTracker::new();
        tracker.on_multi_generic(&[1, 2], collect(1, 2, 4));
        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time, 4);
    }

    #[test]
    fn shared_record_dropped_when_an_entity_is_destroyed() {
        let mut tracker = EntityTracker::new();
        tracker.on_multi_generic(&[1, 2], collect(1, 2, 4));
        tracker.on_generic(2, status(2, 5));
        tracker.on_multi_destroy(&[1]);
        assert!(tracker.get(1).is_none());

        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind(), crate::RecordKind::EntityStatus);
    }

    #[test]
    fn destroyed_entity_produces_nothing() {
        let mut tracker = EntityTracker::new();
        tracker.on_movement(10, &movement(5, MovementKind::Position, [1.0, 0.0, 0.0], (0.0, 0.0)));
        tracker.on_movement(20, &movement(5, MovementKind::Position, [1.0, 0.0, 0.0], (0.0, 0.0)));
        tracker.on_multi_destroy(&[5]);
        assert!(tracker.is_empty());
        let mut out = Vec::new();
        tracker.synthesize(&mut out);
        assert!(out.is_empty());
    }
}
