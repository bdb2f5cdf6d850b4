//! Stats snapshot shared between the render loop and the HUD timer
//!
//! Plain overwrite semantics: the render loop writes once per frame, the HUD
//! reads whatever was written last. Everything runs on one thread, so a
//! `Cell` is enough.

use std::cell::Cell;
use std::rc::Rc;

/// Latest-known counters exposed to the overlay
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatsSnapshot {
    pub packets: usize,
    /// Synthetic value, not a measurement
    pub bandwidth: f32,
    pub nodes: usize,
}

/// Shared latest-write-wins snapshot
pub type SharedStats = Rc<Cell<StatsSnapshot>>;

/// Decorative bandwidth figure oscillating between 50 and 150
#[inline]
pub fn synthetic_bandwidth(time: f64) -> f32 {
    (time.sin() * 50.0 + 100.0) as f32
}
