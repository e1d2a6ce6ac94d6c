//! # Input Shaper
//!
//! A deterministic input-shaping motion planner, usable on both host and MCU
//! (`no_std`-friendly). Given one queued move's kinematic record, it decides
//! which of the move's acceleration/deceleration boundaries to pass through a
//! resonance-cancelling impulse train (ZVD, ZVDD, EI2, EI3, custom) or, for
//! builds where timer resolution rules that out, through Dynamic
//! Acceleration Adjustment — and emits the segment chain the motion executor
//! steps out.
//!
//! Crate layout mirrors the stages a move passes through:
//! - [`params`] — synthesizes [`params::ShaperParams`] from a shaper type and
//!   frequency/damping pair.
//! - [`configurator`] — validates configuration commands and applies them.
//! - [`kinematics`] — the move record the planner reads and rewrites.
//! - [`daa`] — the Dynamic Acceleration Adjustment fallback.
//! - [`segment`] — the pooled segment arena and phase builders.
//! - [`planner`] — ties the above together into `plan`.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
pub mod configurator;
pub mod daa;
pub mod error;
pub mod kinematics;
mod mathutils;
pub mod params;
pub mod planner;
pub mod segment;

#[cfg(feature = "alloc")]
pub use configurator::{Configurator, MoveUpdateSink};
pub use error::ConfigError;
pub use kinematics::{MoveKinematics, MoveState, NeighborMove};
pub use params::{CustomImpulses, ShaperParams, ShaperType};
pub use planner::{plan, Plan};
pub use segment::{SegmentChain, SegmentData, SegmentPool};
