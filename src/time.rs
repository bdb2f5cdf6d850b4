//! Wall clock for overlay lifetimes and loop rate reporting
//!
//! The simulation never reads this; it advances by `time_step` per frame.

/// Monotonic seconds since the clock was first read
pub fn now_seconds() -> f64 {
    platform::now_millis() / 1000.0
}

#[cfg(target_arch = "wasm32")]
mod platform {
    pub fn now_millis() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod platform {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();

    pub fn now_millis() -> f64 {
        EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
    }
}

/// Events per wall-clock second since the last `take`
#[derive(Debug)]
pub struct RateMeter {
    since: f64,
    count: u64,
}

impl RateMeter {
    pub fn new() -> Self {
        Self {
            since: now_seconds(),
            count: 0,
        }
    }

    #[inline]
    pub fn tick(&mut self) {
        self.count += 1;
    }

    /// Rate over the window that just ended; starts a new window
    pub fn take(&mut self) -> f64 {
        let now = now_seconds();
        let elapsed = now - self.since;
        let rate = if elapsed > 0.0 {
            self.count as f64 / elapsed
        } else {
            0.0
        };
        self.since = now;
        self.count = 0;
        rate
    }
}

impl Default for RateMeter {
    fn default() -> Self {
        Self::new()
    }
}
