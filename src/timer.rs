//! Scoped timing for proof phases, reported through `tracing`

use std::time::Instant;

pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        #[cfg(feature = "profile")]
        tracing::debug!(phase = name, "start");

        Timer {
            name,
            start: Instant::now(),
        }
    }

    pub fn stop(&self) {
        let elapsed = self.start.elapsed();
        tracing::trace!(phase = self.name, ?elapsed, "done");
        #[cfg(feature = "profile")]
        tracing::info!(phase = self.name, ?elapsed, "timing");
    }
}
