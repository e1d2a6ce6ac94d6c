//! Error types for the input-shaping configurator.

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "alloc")]
use alloc::string::String;

/// Errors raised while applying a configuration command (spec.md §6/§7).
///
/// Planner-time infeasibility is deliberately *not* represented here: an
/// infeasible plan collapses to the unshaped move rather than erroring.
#[cfg(feature = "alloc")]
#[derive(thiserror::Error, Debug, PartialEq, Clone)]
pub enum ConfigError {
    /// `P` named a type outside `{none, zvd, zvdd, ei2, ei3, daa, custom}`.
    #[error("Unsupported input shaper type '{0}'")]
    UnsupportedType(String),

    /// `custom` shaper given a `T` array whose length doesn't match `H`.
    #[error("Too few durations given")]
    ArityMismatch,

    /// `F` or `S` outside their valid range (`L` is clamped instead, never rejected).
    #[error("{field} value {value} is out of range {low}..={high}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        low: f32,
        high: f32,
    },

    /// `H` was not strictly increasing, or contained a value outside `(0, 1]`.
    #[error("Custom amplitudes must be strictly increasing values in (0, 1]")]
    InvalidAmplitudes,
}

#[cfg(not(feature = "alloc"))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ConfigError {
    UnsupportedType,
    ArityMismatch,
    OutOfRange {
        field: &'static str,
        value: f32,
        low: f32,
        high: f32,
    },
    InvalidAmplitudes,
}
