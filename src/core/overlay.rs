//! Floating-text overlay working set
//!
//! Entries are kept in insertion order. Two paths remove them: eviction of the
//! oldest entry when a spawn would exceed the cap, and expiry after the TTL.
//! Both go through `remove`, which only succeeds once per id.

use std::collections::VecDeque;

use rand::Rng;
use tracing::trace;

use crate::config::OverlayConfig;

/// Identifier of a floating-text entry, unique per set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextId(pub u64);

/// One floating glyph string in the page background
#[derive(Clone, Debug)]
pub struct FloatingText {
    pub id: TextId,
    pub spawned_at: f64,
    /// Horizontal offset in logical pixels
    pub left: f32,
    /// Animation delay in seconds
    pub delay: f32,
    pub text: String,
}

/// Result of a spawn: the new entry and the entry evicted to make room
#[derive(Clone, Debug)]
pub struct Spawned {
    pub entry: FloatingText,
    pub evicted: Option<TextId>,
}

/// Bounded, insertion-ordered set of live floating-text entries
#[derive(Debug)]
pub struct FloatingTextSet {
    live: VecDeque<FloatingText>,
    cap: usize,
    ttl: f64,
    max_delay: f32,
    next_id: u64,
}

impl FloatingTextSet {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            live: VecDeque::with_capacity(config.cap),
            cap: config.cap,
            ttl: config.ttl_secs,
            max_delay: config.max_delay_secs,
            next_id: 0,
        }
    }

    /// Add a new entry at time `now` across a surface `width` wide.
    /// When at cap, the oldest live entry is evicted first.
    /// Returns `None` only for a zero cap.
    pub fn spawn<R: Rng>(&mut self, now: f64, width: f32, rng: &mut R) -> Option<Spawned> {
        if self.cap == 0 {
            return None;
        }

        let evicted = if self.live.len() >= self.cap {
            self.live.pop_front().map(|old| old.id)
        } else {
            None
        };
        if let Some(id) = evicted {
            trace!(id = id.0, "floating text evicted");
        }

        let id = TextId(self.next_id);
        self.next_id += 1;

        let entry = FloatingText {
            id,
            spawned_at: now,
            left: rng.gen::<f32>() * width.max(0.0),
            delay: rng.gen::<f32>() * self.max_delay,
            text: binary_label(rng),
        };
        self.live.push_back(entry.clone());

        Some(Spawned { entry, evicted })
    }

    /// Remove an entry. Returns false if it is no longer tracked.
    pub fn remove(&mut self, id: TextId) -> bool {
        match self.live.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.live.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remove every entry whose TTL has elapsed at `now`
    pub fn expire(&mut self, now: f64) -> Vec<TextId> {
        let ttl = self.ttl;
        let mut expired = Vec::new();
        // insertion order is spawn order, so expired entries sit at the front
        while let Some(front) = self.live.front() {
            if now - front.spawned_at < ttl {
                break;
            }
            if let Some(old) = self.live.pop_front() {
                expired.push(old.id);
            }
        }
        expired
    }

    /// Drop every entry, returning their ids
    pub fn clear(&mut self) -> Vec<TextId> {
        self.live.drain(..).map(|e| e.id).collect()
    }

    pub fn contains(&self, id: TextId) -> bool {
        self.live.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn ttl(&self) -> f64 {
        self.ttl
    }
}

/// Eight random binary digits
fn binary_label<R: Rng>(rng: &mut R) -> String {
    format!("{:08b}", rng.gen::<u8>())
}
