use std::collections::BTreeMap;

use proptest::prelude::*;
use recap_core::record::*;
use recap_core::squash::TeamTracker;
use recap_core::squash::entity::{MOVE_MAX, MOVE_MIN, to_fixed};
use recap_core::{ReplayView, SquashConfig, Squasher, TimedRecord, squash, verify_squash};

use generators::*;

fn squash_default(records: &[TimedRecord]) -> Vec<TimedRecord> {
    squash(records.iter().cloned(), last_time(records), &SquashConfig::default()).0
}

fn fixed_moves(out: &[TimedRecord], id: i32) -> Vec<[i64; 3]> {
    out.iter()
        .filter_map(|r| match &r.record {
            Record::EntityMovement(m) if m.entity_id == id && m.kind.carries_position() => Some(
                [m.dx, m.dy, m.dz].map(to_fixed),
            ),
            _ => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn squashed_stream_replays_to_same_state(recording in arb_recording()) {
        let squashed = squash_default(&recording);
        let expected = ReplayView::replay(&recording);
        let actual = ReplayView::replay(&squashed);
        prop_assert_eq!(&expected.entities, &actual.entities);
        prop_assert_eq!(expected.block_values(), actual.block_values());
        prop_assert_eq!(&expected.teams, &actual.teams);
        prop_assert_eq!(&expected.session, &actual.session);
        prop_assert_eq!(&expected.inventory, &actual.inventory);
        prop_assert!(verify_squash(&recording, &squashed));
        prop_assert_eq!(expected.digest(), actual.digest());
    }

    #[test]
    fn squash_is_idempotent_on_replayed_state(recording in arb_recording()) {
        let once = squash_default(&recording);
        let twice = squash_default(&once);
        prop_assert!(verify_squash(&once, &twice));
    }

    #[test]
    fn output_never_grows(recording in arb_recording()) {
        let squashed = squash_default(&recording);
        // Spawned entities may gain one rotation record on top of their
        // split moves, so compare against the input plus that slack.
        let entity_count = recording
            .iter()
            .filter_map(|r| match r.record.entity_ref() {
                EntityRef::Single(id) => Some(id),
                _ => None,
            })
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        prop_assert!(squashed.len() <= recording.len() + 4 * entity_count);
    }

    #[test]
    fn relative_moves_stay_in_range_and_sum(
        steps in prop::collection::vec(any::<[i8; 3]>(), 1..60)
    ) {
        let mut squasher = Squasher::new(SquashConfig::default());
        squasher.consume(0, spawn(7, 0.0, 0.0, 0.0));
        let mut expected = [0i64; 3];
        for (i, d) in steps.iter().enumerate() {
            for axis in 0..3 {
                expected[axis] += i64::from(d[axis]);
            }
            let time = i64::try_from(i).unwrap_or(i64::MAX) + 1;
            squasher.consume(time, movement(7, MovementKind::Position, *d, (0.0, 0.0)));
        }
        let out = squasher.flush(1_000);

        let moves = fixed_moves(&out, 7);
        let mut total = [0i64; 3];
        for step in &moves {
            for axis in 0..3 {
                prop_assert!((MOVE_MIN..=MOVE_MAX).contains(&step[axis]));
                total[axis] += step[axis];
            }
        }
        prop_assert_eq!(total, expected);
        if expected == [0; 3] {
            prop_assert!(moves.is_empty());
        }
    }

    #[test]
    fn block_merge_matches_linear_replay(
        changes in prop::collection::vec((0i64..50, 0i32..4, 0u32..16), 1..80)
    ) {
        let mut recording = vec![TimedRecord::new(0, Record::ChunkData(column(0, 0, 1, 1, false)))];
        recording.extend(
            changes
                .iter()
                .map(|&(time, x, block)| TimedRecord::new(time, block_change(x, 3, 0, block))),
        );
        let squashed = squash_default(&recording);

        let mut expected: BTreeMap<BlockPos, (i64, u32)> = BTreeMap::new();
        for &(time, x, block) in &changes {
            let pos = BlockPos::new(x, 3, 0);
            if expected.get(&pos).is_none_or(|(stored, _)| time > *stored) {
                expected.insert(pos, (time, block));
            }
        }
        let expected: BTreeMap<BlockPos, u32> =
            expected.into_iter().map(|(pos, (_, block))| (pos, block)).collect();

        prop_assert_eq!(ReplayView::replay(&squashed).block_values(), expected);
    }

    #[test]
    fn add_then_remove_on_created_team_leaves_nothing_pending(
        members in prop::collection::vec(0u8..10, 0..6),
        churn in prop::collection::vec(0u8..10, 1..6),
    ) {
        let names = |ids: &[u8]| ids.iter().map(|p| format!("p{p}")).collect::<Vec<_>>();
        let mut tracker = TeamTracker::new();
        tracker.on_team(TeamData {
            name: "red".into(),
            action: TeamAction::Create { info: info(1), players: names(&members) },
        });
        let before = tracker.get("red").map(|t| t.pending_add().clone());

        let fresh: Vec<u8> = churn.into_iter().filter(|p| !members.contains(p)).collect();
        tracker.on_team(TeamData {
            name: "red".into(),
            action: TeamAction::AddPlayers { players: names(&fresh) },
        });
        tracker.on_team(TeamData {
            name: "red".into(),
            action: TeamAction::RemovePlayers { players: names(&fresh) },
        });

        let team = tracker.get("red").expect("created team is tracked");
        prop_assert_eq!(Some(team.pending_add().clone()), before);
        prop_assert!(team.pending_remove().is_empty());
    }
}
