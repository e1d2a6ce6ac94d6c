//! Pooled, singly-linked motion segments (spec component C: `SegmentBuilder`).
//!
//! A move owns its segment chain exclusively; segments are handed back to
//! the pool on move completion (spec.md §3, §9). The pool is a small arena
//! indexed by integer handles rather than a pointer graph, with one freelist
//! per segment kind so a burst of, say, non-linear allocations doesn't starve
//! linear ones sharing the same backing storage.

use heapless::Vec;

/// Default arena size: enough for two fully-shaped phases (`2*4+1` each)
/// plus a steady-speed segment, with headroom for a couple of in-flight
/// moves sharing the pool.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Index into a [`SegmentPool`]'s arena.
pub type SegmentHandle = usize;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SegmentKind {
    Linear,
    NonLinear,
}

/// One timed chunk of a shaped move (spec.md §3).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SegmentData {
    /// Constant-speed phase: distance grows as `t/c`.
    Linear { fraction_of_total_distance: f32, clocks: f32, c: f32 },
    /// Constant-acceleration phase: `t` solves `t² + 2·b·t − c·s = 0`.
    NonLinear { fraction_of_total_distance: f32, clocks: f32, b: f32, c: f32 },
}

impl SegmentData {
    fn kind(&self) -> SegmentKind {
        match self {
            SegmentData::Linear { .. } => SegmentKind::Linear,
            SegmentData::NonLinear { .. } => SegmentKind::NonLinear,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct Slot {
    data: SegmentData,
    next: Option<SegmentHandle>,
}

/// Error raised when the arena and both freelists are exhausted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PoolExhausted;

/// Fixed-capacity arena of [`SegmentData`] plus one freelist per kind.
///
/// Non-blocking and single-threaded per spec.md §5: only the planner thread
/// allocates from or releases to this pool.
pub struct SegmentPool<const CAP: usize = DEFAULT_POOL_CAPACITY> {
    slots: Vec<Option<Slot>, CAP>,
    free_linear: Vec<SegmentHandle, CAP>,
    free_non_linear: Vec<SegmentHandle, CAP>,
}

impl<const CAP: usize> Default for SegmentPool<CAP> {
    fn default() -> Self {
        SegmentPool { slots: Vec::new(), free_linear: Vec::new(), free_non_linear: Vec::new() }
    }
}

impl<const CAP: usize> SegmentPool<CAP> {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, data: SegmentData) -> Result<SegmentHandle, PoolExhausted> {
        let freelist = match data.kind() {
            SegmentKind::Linear => &mut self.free_linear,
            SegmentKind::NonLinear => &mut self.free_non_linear,
        };
        if let Some(handle) = freelist.pop() {
            self.slots[handle] = Some(Slot { data, next: None });
            return Ok(handle);
        }
        let handle = self.slots.len();
        self.slots.push(Some(Slot { data, next: None })).map_err(|_| PoolExhausted)?;
        Ok(handle)
    }

    /// Releases an entire chain back to the pool, one segment at a time.
    pub fn release_chain(&mut self, head: Option<SegmentHandle>) {
        let mut cursor = head;
        while let Some(handle) = cursor {
            let next = self.slots[handle].and_then(|s| s.next);
            let kind = self.slots[handle].map(|s| s.data.kind());
            self.slots[handle] = None;
            match kind {
                Some(SegmentKind::Linear) => {
                    let _ = self.free_linear.push(handle);
                }
                Some(SegmentKind::NonLinear) => {
                    let _ = self.free_non_linear.push(handle);
                }
                None => {}
            }
            cursor = next;
        }
    }

    pub fn get(&self, handle: SegmentHandle) -> Option<&SegmentData> {
        self.slots.get(handle).and_then(|s| s.as_ref()).map(|s| &s.data)
    }

    fn next_of(&self, handle: SegmentHandle) -> Option<SegmentHandle> {
        self.slots.get(handle).and_then(|s| s.as_ref()).and_then(|s| s.next)
    }
}

/// A head-owned, singly-linked chain of segments within one [`SegmentPool`].
#[derive(Debug, Default)]
pub struct SegmentChain {
    head: Option<SegmentHandle>,
    tail: Option<SegmentHandle>,
}

impl SegmentChain {
    pub fn new() -> Self {
        SegmentChain { head: None, tail: None }
    }

    pub fn head(&self) -> Option<SegmentHandle> {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends a new linear segment to the tail of the chain.
    pub fn push_linear<const CAP: usize>(
        &mut self,
        pool: &mut SegmentPool<CAP>,
        fraction_of_total_distance: f32,
        clocks: f32,
        c: f32,
    ) -> Result<(), PoolExhausted> {
        self.push(pool, SegmentData::Linear { fraction_of_total_distance, clocks, c })
    }

    /// Appends a new non-linear segment to the tail of the chain.
    pub fn push_non_linear<const CAP: usize>(
        &mut self,
        pool: &mut SegmentPool<CAP>,
        fraction_of_total_distance: f32,
        clocks: f32,
        b: f32,
        c: f32,
    ) -> Result<(), PoolExhausted> {
        self.push(pool, SegmentData::NonLinear { fraction_of_total_distance, clocks, b, c })
    }

    fn push<const CAP: usize>(
        &mut self,
        pool: &mut SegmentPool<CAP>,
        data: SegmentData,
    ) -> Result<(), PoolExhausted> {
        let handle = pool.allocate(data)?;
        match self.tail {
            Some(tail) => {
                if let Some(slot) = pool.slots.get_mut(tail).and_then(|s| s.as_mut()) {
                    slot.next = Some(handle);
                }
            }
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        Ok(())
    }

    /// Overwrites the tail segment's `fraction_of_total_distance` with a
    /// known-exact value, anchoring the phase's end to its true boundary
    /// distance rather than whatever the forward/backward velocity
    /// integration accumulated (see `build_phase`). No-op on an empty chain.
    fn set_tail_fraction<const CAP: usize>(&mut self, pool: &mut SegmentPool<CAP>, fraction: f32) {
        if let Some(tail) = self.tail {
            if let Some(slot) = pool.slots.get_mut(tail).and_then(|s| s.as_mut()) {
                match &mut slot.data {
                    SegmentData::Linear { fraction_of_total_distance, .. } => *fraction_of_total_distance = fraction,
                    SegmentData::NonLinear { fraction_of_total_distance, .. } => *fraction_of_total_distance = fraction,
                }
            }
        }
    }

    /// Total distance fraction and clocks across the whole chain, used by
    /// the conservation properties in spec.md §8.
    pub fn totals<const CAP: usize>(&self, pool: &SegmentPool<CAP>) -> (f32, f32) {
        let mut last_fraction = 0.0f32;
        let mut clocks = 0.0f32;
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            if let Some(data) = pool.get(handle) {
                let (fraction, seg_clocks) = match data {
                    SegmentData::Linear { fraction_of_total_distance, clocks, .. } => {
                        (*fraction_of_total_distance, *clocks)
                    }
                    SegmentData::NonLinear { fraction_of_total_distance, clocks, .. } => {
                        (*fraction_of_total_distance, *clocks)
                    }
                };
                last_fraction = fraction;
                clocks += seg_clocks;
            }
            cursor = pool.next_of(handle);
        }
        (last_fraction, clocks)
    }

    /// Releases this chain's segments back to `pool`, consuming the chain.
    pub fn release<const CAP: usize>(self, pool: &mut SegmentPool<CAP>) {
        pool.release_chain(self.head);
    }
}

/// `(b, c)` for one constant-acceleration sub-segment (spec.md §4.C).
fn sub_segment_bc(speed: f32, a: f32, total_distance: f32, step_rate: f32) -> (f32, f32) {
    if a.abs() < 1e-9 {
        (0.0, 0.0)
    } else {
        (speed * step_rate / a, 2.0 * step_rate * step_rate * total_distance / a)
    }
}

/// Total clocks the `shape_end` sub-segments will consume, found by
/// integrating backward from the speed the phase ends at. Used only to size
/// the constant-acceleration bridge that precedes them — the distance those
/// sub-segments cover is not needed here since `build_phase` anchors the
/// phase's final emitted fraction to the known exact boundary distance
/// rather than accumulating it through this backward integration.
fn shaped_end_clocks(params: &crate::params::ShaperParams, a_signed: f32, end_of_phase_speed: f32, step_rate: f32) -> f32 {
    let mut v = end_of_phase_speed;
    let mut clocks = 0.0f32;
    for i in (0..params.num_extra_impulses).rev() {
        let a_i = a_signed * (1.0 - params.coefficients[i]);
        let tau = params.durations[i];
        v -= a_i * tau;
        clocks += tau * step_rate;
    }
    clocks
}

/// Builds one accel- or decel-phase's worth of segments and appends them to
/// `chain`, in the order of spec.md §4.C: shaped-start segments (forward),
/// an optional constant-acceleration bridge, then shaped-end segments
/// (forward, impulses consumed last-to-first).
///
/// `a_signed` is the phase's nominal acceleration, negated for deceleration
/// (spec.md §4.C, "For deceleration the acceleration is negated").
/// `end_of_phase_speed` is the speed the phase would reach at its boundary
/// if unshaped (`top_speed` for an accel phase, `end_speed` for a decel
/// phase) — it anchors the backward integration of the end-shaping segments.
#[allow(clippy::too_many_arguments)]
pub fn build_phase<const CAP: usize>(
    chain: &mut SegmentChain,
    pool: &mut SegmentPool<CAP>,
    shape_start: bool,
    shape_end: bool,
    params: &crate::params::ShaperParams,
    a_signed: f32,
    start_speed: f32,
    end_of_phase_speed: f32,
    phase_distance: f32,
    total_distance: f32,
    phase_clocks: f32,
    step_rate: f32,
    distance_offset: f32,
) -> Result<usize, PoolExhausted> {
    let n = params.num_extra_impulses;
    let mut speed = start_speed;
    let mut distance = distance_offset;
    let mut shaped_clocks_start = 0.0f32;
    let mut segments_emitted = 0usize;

    if shape_start {
        for i in 0..n {
            let a_i = a_signed * params.coefficients[i];
            let tau = params.durations[i];
            distance += speed * tau + 0.5 * a_i * tau * tau;
            let (b, c) = sub_segment_bc(speed, a_i, total_distance, step_rate);
            chain.push_non_linear(pool, distance / total_distance, tau * step_rate, b, c)?;
            segments_emitted += 1;
            speed += a_i * tau;
            shaped_clocks_start += tau * step_rate;
        }
    }

    let clocks_end = if shape_end {
        shaped_end_clocks(params, a_signed, end_of_phase_speed, step_rate)
    } else {
        0.0
    };

    let remaining_clocks = (phase_clocks - shaped_clocks_start - clocks_end).max(0.0);
    if remaining_clocks > 0.0 {
        let tau_bridge = remaining_clocks / step_rate;
        let seg_distance = speed * tau_bridge + 0.5 * a_signed * tau_bridge * tau_bridge;
        let (b, c) = sub_segment_bc(speed, a_signed, total_distance, step_rate);
        distance += seg_distance;
        chain.push_non_linear(pool, distance / total_distance, remaining_clocks, b, c)?;
        segments_emitted += 1;
        speed += a_signed * tau_bridge;
    }

    if shape_end {
        for i in (0..n).rev() {
            let a_i = a_signed * (1.0 - params.coefficients[i]);
            let tau = params.durations[i];
            distance += speed * tau + 0.5 * a_i * tau * tau;
            let (b, c) = sub_segment_bc(speed, a_i, total_distance, step_rate);
            chain.push_non_linear(pool, distance / total_distance, tau * step_rate, b, c)?;
            segments_emitted += 1;
            speed += a_i * tau;
        }
    }

    // Anchor the phase's final emitted fraction to the true boundary
    // distance (`distance_offset + phase_distance`) rather than whatever the
    // forward/backward velocity integration above accumulated: the two can
    // drift apart by a few step-clocks' worth of distance whenever the
    // caller's `phase_clocks` and `phase_distance` aren't bit-exact, which
    // would otherwise violate the distance-conservation property (spec.md
    // §8) by more than its 1e-6 tolerance.
    if segments_emitted > 0 && total_distance > 0.0 {
        chain.set_tail_fraction(pool, (distance_offset + phase_distance) / total_distance);
    }

    Ok(segments_emitted)
}

/// Appends the steady-speed segment bridging the accel and decel phases
/// (spec.md §4.C). No-op if there is no cruise time.
pub fn build_steady<const CAP: usize>(
    chain: &mut SegmentChain,
    pool: &mut SegmentPool<CAP>,
    decel_start_distance: f32,
    total_distance: f32,
    top_speed: f32,
    steady_clocks: f32,
    step_rate: f32,
) -> Result<(), PoolExhausted> {
    if steady_clocks <= 0.0 || top_speed <= 0.0 {
        return Ok(());
    }
    let c = total_distance * step_rate / top_speed;
    chain.push_linear(pool, decel_start_distance / total_distance, steady_clocks, c)
}
