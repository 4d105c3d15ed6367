//! Frame timer.
//!
//! Advanced exactly once per frame by the render loop. Elapsed time only moves
//! forward; there is no pause state.

use instant::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Timer {
    previous: Instant,
    elapsed: Duration,
    delta: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            previous: start,
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
        }
    }

    /// Advance the timer to the current instant and return the total elapsed time.
    pub fn update(&mut self) -> Duration {
        self.update_at(Instant::now())
    }

    /// Advance the timer to `now`. Instants earlier than the last update count as zero delta.
    pub fn update_at(&mut self, now: Instant) -> Duration {
        self.delta = if now > self.previous {
            now.duration_since(self.previous)
        } else {
            Duration::ZERO
        };
        if now > self.previous {
            self.previous = now;
        }
        self.elapsed += self.delta;
        self.elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
