use criterion::{black_box, criterion_group, criterion_main, Criterion};
use input_shaper::kinematics::{MoveKinematics, MoveState, NeighborMove};
use input_shaper::params::{ShaperParams, ShaperType};
use input_shaper::segment::SegmentPool;

const STEP_RATE: f32 = 750_000.0;

fn idle_neighbor() -> NeighborMove {
    NeighborMove {
        state: MoveState::Completed,
        was_accel_only_move: false,
        kinematics: MoveKinematics {
            start_speed: 0.0,
            top_speed: 0.0,
            end_speed: 0.0,
            acceleration: 0.0,
            deceleration: 0.0,
            total_distance: 0.0,
            accel_distance: 0.0,
            decel_distance: 0.0,
            accel_clocks: 0.0,
            decel_clocks: 0.0,
            decel_start_distance: 0.0,
        },
    }
}

fn benchmark_plan_shaped_move(c: &mut Criterion) {
    let shaper = ShaperParams::synthesize(ShaperType::Zvd, 40.0, 0.1, 1.0, STEP_RATE, None);
    let prev = idle_neighbor();
    let next = idle_neighbor();

    c.bench_function("plan_zvd_move", |b| {
        b.iter(|| {
            let mut kin = MoveKinematics {
                start_speed: 0.0,
                top_speed: 80.0,
                end_speed: 0.0,
                acceleration: 2000.0,
                deceleration: 2000.0,
                total_distance: 60.0,
                accel_distance: 1.6,
                decel_distance: 1.6,
                accel_clocks: 30_000.0,
                decel_clocks: 30_000.0,
                decel_start_distance: 58.4,
            };
            let mut pool: SegmentPool<64> = SegmentPool::new();
            let (plan, chain) = input_shaper::plan(
                black_box(&mut kin),
                black_box(&shaper),
                true,
                &prev,
                &next,
                &mut pool,
                STEP_RATE,
            )
            .unwrap();
            black_box(&plan);
            chain.release(&mut pool);
        })
    });
}

fn benchmark_synthesize_zvdd(c: &mut Criterion) {
    c.bench_function("synthesize_zvdd", |b| {
        b.iter(|| {
            black_box(ShaperParams::synthesize(
                ShaperType::Zvdd,
                black_box(45.0),
                black_box(0.15),
                1.0,
                STEP_RATE,
                None,
            ))
        })
    });
}

criterion_group!(benches, benchmark_plan_shaped_move, benchmark_synthesize_zvdd);
criterion_main!(benches);
