//! Dynamic Acceleration Adjustment (spec component E).
//!
//! DAA never introduces impulses; it stretches the accel/decel phases in
//! time so they align with the ringing period, then the caller falls
//! through to the unshaped segment chain (spec.md §4.D step 1, §9).

use crate::kinematics::{MoveKinematics, NeighborMove};
use crate::params::ShaperParams;

/// Mutates `kin` in place per spec.md §4.E. `params.shaper_type` must be
/// `ShaperType::Daa`; the caller (the planner) is responsible for the
/// dispatch in spec.md §4.D step 1.
pub fn adjust(kin: &mut MoveKinematics, params: &ShaperParams, prev: &NeighborMove, next: &NeighborMove) {
    let ringing_period = params.ringing_period();
    if ringing_period <= 0.0 {
        return;
    }

    let prev_executing_accel_only = matches!(prev.state, crate::kinematics::MoveState::Executing) && prev.was_accel_only_move;
    let proposed_accel = if prev_executing_accel_only {
        None
    } else {
        propose_stretched_acceleration(kin.top_speed - kin.start_speed, kin.acceleration, ringing_period)
    };

    let next_provisional_decel_only = matches!(next.state, crate::kinematics::MoveState::Provisional) && next.is_deceleration_move();
    let proposed_decel = if next_provisional_decel_only {
        None
    } else {
        propose_stretched_acceleration(kin.top_speed - kin.end_speed, kin.deceleration, ringing_period)
    };

    if proposed_accel.is_none() && proposed_decel.is_none() {
        return;
    }

    let floor = params.min_acceleration;
    let effective_accel = proposed_accel.unwrap_or(kin.acceleration);
    let effective_decel = proposed_decel.unwrap_or(kin.deceleration);

    let accel_dist = trapezoid_phase_distance(kin.top_speed, kin.start_speed, effective_accel);
    let decel_dist = trapezoid_phase_distance(kin.top_speed, kin.end_speed, effective_decel);

    if accel_dist + decel_dist <= kin.total_distance && effective_accel >= floor && effective_decel >= floor {
        kin.acceleration = effective_accel;
        kin.deceleration = effective_decel;
        kin.accel_distance = accel_dist;
        kin.decel_start_distance = kin.total_distance - decel_dist;
        return;
    }

    if try_triangular_profile(kin, floor, ringing_period) {
        return;
    }

    if kin.start_speed < kin.end_speed {
        let a_prime = (kin.end_speed * kin.end_speed - kin.start_speed * kin.start_speed) / (2.0 * kin.total_distance);
        if a_prime >= floor {
            kin.acceleration = a_prime;
            kin.top_speed = kin.end_speed;
            kin.accel_distance = kin.total_distance;
            kin.decel_start_distance = kin.total_distance;
        }
    } else if kin.start_speed > kin.end_speed {
        let d_prime = (kin.start_speed * kin.start_speed - kin.end_speed * kin.end_speed) / (2.0 * kin.total_distance);
        if d_prime >= floor {
            kin.deceleration = d_prime;
            kin.top_speed = kin.start_speed;
            kin.accel_distance = 0.0;
            kin.decel_start_distance = 0.0;
        }
    }
    // start_speed == end_speed: no accel/decel-only degeneracy is meaningful, give up.
}

/// One side of spec.md §4.E's accel/decel proposal: stretch to `T` if the
/// phase is shorter than the ringing period, to `2T` if shorter than twice
/// it, otherwise leave unchanged.
fn propose_stretched_acceleration(delta_speed: f32, acceleration: f32, ringing_period: f32) -> Option<f32> {
    if acceleration <= 0.0 || delta_speed <= 0.0 {
        return None;
    }
    let phase_time = delta_speed / acceleration;
    if phase_time < ringing_period {
        Some(delta_speed / ringing_period)
    } else if phase_time < 2.0 * ringing_period {
        Some(delta_speed / (2.0 * ringing_period))
    } else {
        None
    }
}

fn trapezoid_phase_distance(top_speed: f32, boundary_speed: f32, acceleration: f32) -> f32 {
    if acceleration <= 0.0 {
        return 0.0;
    }
    (top_speed * top_speed - boundary_speed * boundary_speed) / (2.0 * acceleration)
}

/// The triangular (accelerate-decelerate, no cruise) fallback of
/// spec.md §4.E, with both phases pinned to duration `T`.
fn try_triangular_profile(kin: &mut MoveKinematics, floor: f32, ringing_period: f32) -> bool {
    let top_prime = kin.total_distance / ringing_period - (kin.start_speed + kin.end_speed) / 2.0;
    if !(top_prime > kin.start_speed && top_prime > kin.end_speed) {
        return false;
    }
    let a_prime = (top_prime - kin.start_speed) / ringing_period;
    let d_prime = (top_prime - kin.end_speed) / ringing_period;
    if a_prime < floor || d_prime < floor || a_prime > kin.acceleration || d_prime > kin.deceleration {
        return false;
    }

    kin.top_speed = top_prime;
    kin.acceleration = a_prime;
    kin.deceleration = d_prime;
    let accel_dist = trapezoid_phase_distance(top_prime, kin.start_speed, a_prime);
    let decel_dist = trapezoid_phase_distance(top_prime, kin.end_speed, d_prime);
    kin.accel_distance = accel_dist;
    kin.decel_start_distance = kin.total_distance - decel_dist;
    true
}
