//! `f32` transcendental functions usable identically on `std` and `no_std`
//! builds, mirroring the teacher crate's `libm`/`std` cfg split (see
//! `planner.rs`'s `acosf`/`sqrtf` aliases) but consolidated in one place
//! since several modules here need the same handful of functions.

#[cfg(feature = "std")]
pub fn sqrtf(x: f32) -> f32 {
    x.sqrt()
}
#[cfg(not(feature = "std"))]
pub fn sqrtf(x: f32) -> f32 {
    libm::sqrtf(x)
}

#[cfg(feature = "std")]
pub fn expf(x: f32) -> f32 {
    x.exp()
}
#[cfg(not(feature = "std"))]
pub fn expf(x: f32) -> f32 {
    libm::expf(x)
}
