use input_shaper::daa;
use input_shaper::kinematics::{MoveKinematics, MoveState, NeighborMove};
use input_shaper::params::{ShaperParams, ShaperType};

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

#[test]
fn respects_min_acceleration_floor() {
    // A move whose stretched acceleration would fall below the floor must
    // not be adjusted down past it.
    let params = ShaperParams::synthesize(ShaperType::Daa, 5.0, 0.0, 1900.0, STEP_RATE, None);
    let mut kin = MoveKinematics {
        start_speed: 0.0,
        top_speed: 100.0,
        end_speed: 0.0,
        acceleration: 3000.0,
        deceleration: 3000.0,
        total_distance: 20.0,
        accel_distance: 0.0,
        decel_distance: 0.0,
        accel_clocks: 0.0,
        decel_clocks: 0.0,
        decel_start_distance: 0.0,
    };
    let prev = idle_neighbor();
    let next = idle_neighbor();
    daa::adjust(&mut kin, &params, &prev, &next);
    assert_eq!(kin.acceleration, 3000.0);
    assert_eq!(kin.deceleration, 3000.0);
}

#[test]
fn executing_accel_only_neighbor_suppresses_accel_side_adjustment() {
    let params = ShaperParams::synthesize(ShaperType::Daa, 40.0, 0.0, 1.0, STEP_RATE, None);
    let mut kin = MoveKinematics {
        start_speed: 0.0,
        top_speed: 100.0,
        end_speed: 0.0,
        acceleration: 3000.0,
        deceleration: 3000.0,
        total_distance: 20.0,
        accel_distance: 0.0,
        decel_distance: 0.0,
        accel_clocks: 0.0,
        decel_clocks: 0.0,
        decel_start_distance: 0.0,
    };
    let mut prev = idle_neighbor();
    prev.state = MoveState::Executing;
    prev.was_accel_only_move = true;
    let next = idle_neighbor();
    daa::adjust(&mut kin, &params, &prev, &next);
    assert_eq!(kin.acceleration, 3000.0);
    assert!((kin.deceleration - 2000.0).abs() < 1.0);
}

#[test]
fn degenerates_to_accel_only_when_move_too_short_for_trapezoid_or_triangle() {
    // top == end so the decel side is already empty; the move too short
    // for either reconciliation pass forces the accel-only closed form.
    let params = ShaperParams::synthesize(ShaperType::Daa, 40.0, 0.0, 1.0, STEP_RATE, None);
    let mut kin = MoveKinematics {
        start_speed: 0.0,
        top_speed: 50.0,
        end_speed: 50.0,
        acceleration: 3000.0,
        deceleration: 3000.0,
        total_distance: 0.3,
        accel_distance: 0.0,
        decel_distance: 0.0,
        accel_clocks: 0.0,
        decel_clocks: 0.0,
        decel_start_distance: 0.0,
    };
    let prev = idle_neighbor();
    let next = idle_neighbor();
    daa::adjust(&mut kin, &params, &prev, &next);
    assert!((kin.accel_distance - 0.3).abs() < 1e-4);
    assert!((kin.decel_start_distance - 0.3).abs() < 1e-4);
    assert_eq!(kin.top_speed, kin.end_speed);
    assert!(kin.acceleration > 3000.0);
}
