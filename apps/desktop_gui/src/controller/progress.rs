//! Simulated upload progress. Multipart uploads give no transfer callbacks,
//! so the modal animates on a timer: creep toward a ceiling while the
//! request is in flight, then jump to "Finalizing..." and "Upload complete!"
//! once the response lands.

use std::time::{Duration, Instant};

/// Minimum time between simulated creep increments.
pub const SIMULATED_TICK_INTERVAL: Duration = Duration::from_millis(300);
/// The creep never passes this; the remainder is reserved for the response.
pub const SIMULATED_CEILING: f32 = 70.0;
/// Each creep tick advances by a random step drawn from this range.
pub const SIMULATED_STEP_RANGE: std::ops::Range<f32> = 5.0..15.0;

const FINALIZE_HOLD: Duration = Duration::from_millis(300);
const COMPLETE_HOLD: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Preparing,
    Uploading,
    Finalizing,
    Complete,
}

#[derive(Debug)]
pub struct UploadProgress {
    phase: Phase,
    percent: f32,
    phase_entered: Instant,
    last_tick: Instant,
}

impl UploadProgress {
    pub fn begin(now: Instant) -> Self {
        Self {
            phase: Phase::Preparing,
            percent: 0.0,
            phase_entered: now,
            last_tick: now,
        }
    }

    /// The request has been handed to the worker.
    pub fn mark_transfer_started(&mut self, now: Instant) {
        self.phase = Phase::Uploading;
        self.percent = 10.0;
        self.phase_entered = now;
        self.last_tick = now;
    }

    /// Advance the creep animation. `step` is the caller-drawn random
    /// increment, applied only once per tick interval.
    pub fn tick(&mut self, now: Instant, step: f32) {
        if self.phase != Phase::Uploading {
            return;
        }
        if now.duration_since(self.last_tick) < SIMULATED_TICK_INTERVAL {
            return;
        }
        self.last_tick = now;
        self.percent = (self.percent + step).min(SIMULATED_CEILING);
    }

    /// The backend answered; hold at 90% briefly before completing.
    pub fn mark_response_received(&mut self, now: Instant) {
        self.phase = Phase::Finalizing;
        self.percent = 90.0;
        self.phase_entered = now;
    }

    /// Drive the finalize/complete holds. Returns true once the modal
    /// should close.
    pub fn poll_completion(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Finalizing => {
                if now.duration_since(self.phase_entered) >= FINALIZE_HOLD {
                    self.phase = Phase::Complete;
                    self.percent = 100.0;
                    self.phase_entered = now;
                }
                false
            }
            Phase::Complete => now.duration_since(self.phase_entered) >= COMPLETE_HOLD,
            Phase::Preparing | Phase::Uploading => false,
        }
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn fraction(&self) -> f32 {
        self.percent / 100.0
    }

    pub fn status_text(&self) -> &'static str {
        match self.phase {
            Phase::Preparing => "Preparing upload...",
            Phase::Uploading if self.percent <= 10.0 => "Uploading files...",
            Phase::Uploading => "Processing documents...",
            Phase::Finalizing => "Finalizing...",
            Phase::Complete => "Upload complete!",
        }
    }
}
