//! The queued-move kinematic record the planner reads and rewrites.
//!
//! Ownership of this data lives outside the crate (the look-ahead queue and
//! motion executor, spec.md §1 "out of scope"); the planner only borrows it
//! for the duration of `Planner::plan`.

/// Lifecycle state of a queued move, as observed by a neighbour's planner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveState {
    /// Still subject to look-ahead speed revision.
    Provisional,
    /// Speeds are final; not yet handed to the executor.
    Frozen,
    /// Currently being stepped out by the motion executor.
    Executing,
    /// Fully stepped out; kept around only as a neighbour reference.
    Completed,
}

/// The pre-prepared kinematic record of one queued move.
///
/// Fields mirror spec.md §3 "Move kinematics" exactly; this struct is the
/// mutable scratch space `Planner::plan` rewrites in place (`accel_distance`,
/// `decel_start_distance`, `accel_clocks`, `decel_clocks`) when it accepts a
/// shaping plan, and [`crate::daa`] rewrites (`acceleration`, `deceleration`,
/// `accel_distance`, `decel_start_distance`) when DAA is active.
#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveKinematics {
    pub start_speed: f32,
    pub top_speed: f32,
    pub end_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub total_distance: f32,

    pub accel_distance: f32,
    pub decel_distance: f32,
    pub accel_clocks: f32,
    pub decel_clocks: f32,
    pub decel_start_distance: f32,
}

impl MoveKinematics {
    /// Clocks spent at cruise speed, derived rather than stored: the
    /// remainder of the move once accel/decel phases are accounted for.
    pub fn steady_clocks(&self, step_rate: f32) -> f32 {
        let steady_distance = self.decel_start_distance - self.accel_distance;
        if self.top_speed > 0.0 && steady_distance > 0.0 {
            steady_distance * step_rate / self.top_speed
        } else {
            0.0
        }
    }

    /// `true` if this move is decelerating for its entire distance (no
    /// accel or cruise phase).
    pub fn is_deceleration_move(&self) -> bool {
        self.accel_distance <= 0.0 && self.decel_start_distance <= 0.0
    }
}

/// A neighbour move's observable state, as read (without locking) by the
/// planner under the monotonicity assumption of spec.md §5: once a move
/// leaves `Provisional` its state can only advance.
#[derive(Debug, Copy, Clone)]
pub struct NeighborMove {
    pub state: MoveState,
    /// `true` if this move consists entirely of an acceleration phase
    /// (no cruise, no deceleration) — set once by look-ahead.
    pub was_accel_only_move: bool,
    pub kinematics: MoveKinematics,
}

impl NeighborMove {
    pub fn is_deceleration_move(&self) -> bool {
        self.kinematics.is_deceleration_move()
    }
}
