use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use recap_core::log::{parse_lines, write_log};
use recap_core::record::*;
use recap_core::{SquashConfig, Squasher, TimedRecord, squash};

#[derive(Clone, Copy, Debug)]
struct Tier {
    name: &'static str,
    entities: i32,
    records: usize,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "S",
        entities: 50,
        records: 10_000,
    },
    Tier {
        name: "M",
        entities: 500,
        records: 100_000,
    },
    Tier {
        name: "L",
        entities: 2_000,
        records: 500_000,
    },
];

#[derive(Clone, Copy, Debug)]
struct Prng(u64);

impl Prng {
    fn next_u64(&mut self) -> u64 {
        // 64-bit LCG constants from Numerical Recipes.
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 16
    }

    fn below(&mut self, upper: u64) -> i32 {
        (self.next_u64() % upper) as i32
    }

    fn step(&mut self) -> f64 {
        f64::from(self.below(64) - 32) / 32.0
    }
}

/// A recording dominated by movement, like a real session: mostly relative
/// moves, some block churn in a fixed set of loaded chunks.
fn recording(tier: Tier, seed: u64) -> Vec<TimedRecord> {
    let mut prng = Prng(seed);
    let mut out = Vec::with_capacity(tier.records);

    for x in -4..4 {
        for z in -4..4 {
            let mut column = ChunkColumn::unload(x, z);
            column.sections[0] = Some(vec![1; 64]);
            column.sections[4] = Some(vec![2; 64]);
            out.push(TimedRecord::new(0, Record::ChunkData(column)));
        }
    }
    for id in 0..tier.entities {
        out.push(TimedRecord::new(
            0,
            Record::SpawnMob(SpawnMobData {
                entity_id: id,
                mob_type: 54,
                location: Location::new(0.0, 64.0, 0.0, 0.0, 0.0),
                head_yaw: 0.0,
                velocity: [0.0; 3],
                metadata: vec![],
            }),
        ));
    }

    let mut time = 0;
    while out.len() < tier.records {
        time += i64::from(prng.below(3));
        let roll = prng.below(100);
        let record = if roll < 80 {
            Record::EntityMovement(EntityMovementData {
                entity_id: prng.below(tier.entities as u64),
                kind: MovementKind::Position,
                dx: prng.step(),
                dy: 0.0,
                dz: prng.step(),
                yaw: 0.0,
                pitch: 0.0,
                on_ground: true,
            })
        } else if roll < 95 {
            Record::BlockChange(BlockChangeRecord {
                position: BlockPos::new(prng.below(128) - 64, prng.below(16), prng.below(128) - 64),
                block: prng.below(16) as u32,
            })
        } else {
            Record::PlaySound(PlaySoundData {
                sound: "step.grass".to_string(),
                x: 0.0,
                y: 64.0,
                z: 0.0,
                volume: 1.0,
                pitch: 1.0,
            })
        };
        out.push(TimedRecord::new(time, record));
    }
    out
}

fn bench_squash(c: &mut Criterion) {
    let mut group = c.benchmark_group("squash.tiered");
    group.sample_size(20);

    for tier in TIERS {
        let records = recording(tier, 0x5EC0_u64 + tier.records as u64);
        let end = records.last().map_or(0, |r| r.time);
        group.throughput(Throughput::Elements(records.len() as u64));

        group.bench_with_input(BenchmarkId::new("squash", tier.name), &records, |b, records| {
            b.iter(|| {
                let (out, _) = squash(records.iter().cloned(), end, &SquashConfig::default());
                black_box(out.len())
            });
        });

        let text = write_log(&records).expect("bench log serializes");
        let registry = Squasher::registry();
        group.bench_with_input(BenchmarkId::new("parse", tier.name), &text, |b, text| {
            b.iter(|| black_box(parse_lines(text, &registry).map(|r| r.len())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_squash);
criterion_main!(benches);
