//! The per-move input-shaping planner (spec component D).
//!
//! `plan` is the crate's single entry point: given one move's kinematic
//! record and its neighbours' observable state, it decides which of the
//! four accel/decel boundaries to shape, mutates the move's phase
//! distances/clocks to make room, and emits the segment chain the motion
//! executor will later step out. Runs to completion without yielding,
//! per spec.md §5.

use crate::daa;
use crate::kinematics::{MoveKinematics, NeighborMove};
use crate::params::{ShaperParams, ShaperType};
use crate::segment::{self, PoolExhausted, SegmentChain, SegmentPool};

/// Which of the four boundaries a move's plan shapes, plus how many
/// non-linear segments each phase ended up with (spec.md §3).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    pub shape_accel_start: bool,
    pub shape_accel_end: bool,
    pub shape_decel_start: bool,
    pub shape_decel_end: bool,
    pub accel_segments: usize,
    pub decel_segments: usize,
}

impl Plan {
    /// `true` if no boundary is shaped — the unshaped path was taken.
    pub fn is_unshaped(&self) -> bool {
        !(self.shape_accel_start || self.shape_accel_end || self.shape_decel_start || self.shape_decel_end)
    }
}

/// Plans one move's shaping and returns the decided [`Plan`] together with
/// its segment chain. `kin` is mutated in place: phase distances/clocks
/// when an impulse-path plan is accepted, or acceleration/deceleration and
/// distances when DAA adjusts the move (spec.md §4.D, §4.E).
#[allow(clippy::too_many_arguments)]
pub fn plan<const CAP: usize>(
    kin: &mut MoveKinematics,
    shaper: &ShaperParams,
    shaping_enabled: bool,
    prev: &NeighborMove,
    next: &NeighborMove,
    pool: &mut SegmentPool<CAP>,
    step_rate: f32,
) -> Result<(Plan, SegmentChain), PoolExhausted> {
    if !shaping_enabled || shaper.shaper_type == ShaperType::None {
        #[cfg(feature = "logging")]
        tracing::trace!("shaping disabled or type=none; emitting unshaped chain");
        let chain = build_unshaped_chain(kin, pool, step_rate)?;
        return Ok((Plan::default(), chain));
    }

    if shaper.shaper_type == ShaperType::Daa {
        daa::adjust(kin, shaper, prev, next);
        let chain = build_unshaped_chain(kin, pool, step_rate)?;
        return Ok((Plan::default(), chain));
    }

    let mut decided = propose_plan(kin, shaper, prev, next);
    verify_accel_feasibility(kin, shaper, &mut decided);
    verify_decel_feasibility(kin, shaper, &mut decided);

    #[cfg(feature = "logging")]
    tracing::debug!(?decided, "resolved input-shaping plan");

    let (chain, accel_segments, decel_segments) = build_shaped_chain(kin, shaper, &decided, pool, step_rate)?;
    decided.accel_segments = accel_segments;
    decided.decel_segments = decel_segments;
    Ok((decided, chain))
}

/// Step 2 of spec.md §4.D: propose all four shape flags from the move's
/// own clocks/distances and its neighbours' state, before feasibility is
/// checked.
fn propose_plan(kin: &MoveKinematics, shaper: &ShaperParams, prev: &NeighborMove, next: &NeighborMove) -> Plan {
    let total = shaper.total_shaping_clocks;

    let shape_accel_start = (kin.accel_clocks + shaper.clocks_lost_at_start >= total)
        && (!matches!(prev.state, crate::kinematics::MoveState::Frozen | crate::kinematics::MoveState::Executing)
            || !prev.was_accel_only_move);

    let shape_accel_end =
        (kin.accel_clocks + shaper.clocks_lost_at_end >= total) && (kin.decel_start_distance > kin.accel_distance);

    let shape_decel_start =
        (kin.decel_clocks + shaper.clocks_lost_at_start >= total) && (kin.decel_start_distance > kin.accel_distance);

    let shape_decel_end = (kin.decel_clocks + shaper.clocks_lost_at_end >= total)
        && (!matches!(next.state, crate::kinematics::MoveState::Provisional) || !next.is_deceleration_move());

    Plan { shape_accel_start, shape_accel_end, shape_decel_start, shape_decel_end, accel_segments: 0, decel_segments: 0 }
}

/// Integrating forward from `initial_speed`, impulse `0..n` in order, the
/// extra distance a shaped boundary covers relative to the unshaped pulse
/// (spec.md §4.D "Extra-distance closed forms"). `a_signed` is negative for
/// a deceleration phase, which flips the speed-update sign as required.
fn extra_start_distance(shaper: &ShaperParams, a_signed: f32, initial_speed: f32) -> f32 {
    let mut u = initial_speed;
    let mut extra = 0.0f32;
    for i in 0..shaper.num_extra_impulses {
        let c = shaper.coefficients[i];
        let dur = shaper.durations[i];
        extra += (1.0 - c) * (u + 0.5 * c * a_signed * dur) * dur;
        u += c * a_signed * dur;
    }
    extra
}

/// Mirror of [`extra_start_distance`], integrating backward from
/// `initial_speed`, impulse `n-1..0`.
fn extra_end_distance(shaper: &ShaperParams, a_signed: f32, initial_speed: f32) -> f32 {
    let mut v = initial_speed;
    let mut extra = 0.0f32;
    for i in (0..shaper.num_extra_impulses).rev() {
        let c = shaper.coefficients[i];
        let dur = shaper.durations[i];
        extra += c * (v - 0.5 * (1.0 - c) * a_signed * dur) * dur;
        v -= (1.0 - c) * a_signed * dur;
    }
    extra
}

/// Step 3 of spec.md §4.D. Mutates `kin.accel_distance`/`kin.accel_clocks`
/// on acceptance; clears both accel flags on rejection.
fn verify_accel_feasibility(kin: &mut MoveKinematics, shaper: &ShaperParams, plan: &mut Plan) {
    if !(plan.shape_accel_start || plan.shape_accel_end) {
        return;
    }
    if plan.shape_accel_start && plan.shape_accel_end && kin.accel_clocks < 2.0 * shaper.total_shaping_clocks {
        plan.shape_accel_start = false;
        plan.shape_accel_end = false;
        return;
    }

    let mut extra = 0.0;
    if plan.shape_accel_start {
        extra += extra_start_distance(shaper, kin.acceleration, kin.start_speed);
    }
    if plan.shape_accel_end {
        extra += extra_end_distance(shaper, kin.acceleration, kin.top_speed);
    }

    if kin.accel_distance + extra <= kin.decel_start_distance {
        kin.accel_distance += extra;
        if plan.shape_accel_start {
            kin.accel_clocks += shaper.clocks_lost_at_start;
        }
        if plan.shape_accel_end {
            kin.accel_clocks += shaper.clocks_lost_at_end;
        }
    } else {
        plan.shape_accel_start = false;
        plan.shape_accel_end = false;
    }
}

/// Step 4 of spec.md §4.D, symmetric to [`verify_accel_feasibility`]: the
/// free-space check compares against the same window, but acceptance
/// *shrinks* `decel_start_distance` rather than growing `accel_distance`.
fn verify_decel_feasibility(kin: &mut MoveKinematics, shaper: &ShaperParams, plan: &mut Plan) {
    if !(plan.shape_decel_start || plan.shape_decel_end) {
        return;
    }
    if plan.shape_decel_start && plan.shape_decel_end && kin.decel_clocks < 2.0 * shaper.total_shaping_clocks {
        plan.shape_decel_start = false;
        plan.shape_decel_end = false;
        return;
    }

    let mut extra = 0.0;
    if plan.shape_decel_start {
        extra += extra_start_distance(shaper, -kin.deceleration, kin.top_speed);
    }
    if plan.shape_decel_end {
        extra += extra_end_distance(shaper, -kin.deceleration, kin.end_speed);
    }

    if kin.accel_distance + extra <= kin.decel_start_distance {
        kin.decel_start_distance -= extra;
        if plan.shape_decel_start {
            kin.decel_clocks += shaper.clocks_lost_at_start;
        }
        if plan.shape_decel_end {
            kin.decel_clocks += shaper.clocks_lost_at_end;
        }
    } else {
        plan.shape_decel_start = false;
        plan.shape_decel_end = false;
    }
}

/// Builds the full chain for an unshaped move (disabled, `none`, or after
/// DAA has already rewritten `kin`'s acceleration/deceleration/distances).
fn build_unshaped_chain<const CAP: usize>(
    kin: &MoveKinematics,
    pool: &mut SegmentPool<CAP>,
    step_rate: f32,
) -> Result<SegmentChain, PoolExhausted> {
    let empty = ShaperParams::default();
    let mut chain = SegmentChain::new();
    segment::build_phase(
        &mut chain,
        pool,
        false,
        false,
        &empty,
        kin.acceleration,
        kin.start_speed,
        kin.top_speed,
        kin.accel_distance,
        kin.total_distance,
        kin.accel_clocks,
        step_rate,
        0.0,
    )?;
    segment::build_steady(
        &mut chain,
        pool,
        kin.decel_start_distance,
        kin.total_distance,
        kin.top_speed,
        kin.steady_clocks(step_rate),
        step_rate,
    )?;
    segment::build_phase(
        &mut chain,
        pool,
        false,
        false,
        &empty,
        -kin.deceleration,
        kin.top_speed,
        kin.end_speed,
        kin.total_distance - kin.decel_start_distance,
        kin.total_distance,
        kin.decel_clocks,
        step_rate,
        kin.decel_start_distance,
    )?;
    Ok(chain)
}

/// Builds the chain for the final, feasibility-checked [`Plan`], in chain
/// order: accel-start, accel-bridge, accel-end, steady, decel-start,
/// decel-bridge, decel-end (spec.md §4.C).
fn build_shaped_chain<const CAP: usize>(
    kin: &MoveKinematics,
    shaper: &ShaperParams,
    plan: &Plan,
    pool: &mut SegmentPool<CAP>,
    step_rate: f32,
) -> Result<(SegmentChain, usize, usize), PoolExhausted> {
    let mut chain = SegmentChain::new();

    let accel_result = segment::build_phase(
        &mut chain,
        pool,
        plan.shape_accel_start,
        plan.shape_accel_end,
        shaper,
        kin.acceleration,
        kin.start_speed,
        kin.top_speed,
        kin.accel_distance,
        kin.total_distance,
        kin.accel_clocks,
        step_rate,
        0.0,
    );
    let accel_segments = match accel_result {
        Ok(n) => n,
        Err(e) => {
            chain.release(pool);
            return Err(e);
        }
    };

    if let Err(e) = segment::build_steady(
        &mut chain,
        pool,
        kin.decel_start_distance,
        kin.total_distance,
        kin.top_speed,
        kin.steady_clocks(step_rate),
        step_rate,
    ) {
        chain.release(pool);
        return Err(e);
    }

    let decel_result = segment::build_phase(
        &mut chain,
        pool,
        plan.shape_decel_start,
        plan.shape_decel_end,
        shaper,
        -kin.deceleration,
        kin.top_speed,
        kin.end_speed,
        kin.total_distance - kin.decel_start_distance,
        kin.total_distance,
        kin.decel_clocks,
        step_rate,
        kin.decel_start_distance,
    );
    let decel_segments = match decel_result {
        Ok(n) => n,
        Err(e) => {
            chain.release(pool);
            return Err(e);
        }
    };

    Ok((chain, accel_segments, decel_segments))
}
