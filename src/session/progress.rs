//! Simulated progress for a processing run.
//!
//! Early pipeline stages (ingest, transcription) advance faster than the
//! later ones (extraction, generation), so each step draws a jitter in
//! `[0, 8)` on top of a floor of 5 below the midpoint and 2 above it.

use std::collections::VecDeque;
use std::sync::Mutex;

pub const MAX_PROGRESS: f64 = 100.0;

const JITTER_SPAN: f64 = 8.0;
const MIDPOINT: f64 = 50.0;
const EARLY_FLOOR: f64 = 5.0;
const LATE_FLOOR: f64 = 2.0;

const STAGE_LABELS: [&str; 4] = [
    "Analyzing",
    "Transcribing",
    "Extracting key points",
    "Generating action items",
];

/// Source of uniform samples in `[0, 1)` for progress jitter.
pub trait ProgressRandom: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Thread-local RNG backed source used outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl ProgressRandom for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::random::<f64>()
    }
}

/// Replays a fixed sequence of samples, then repeats the last one.
///
/// Useful wherever a run has to be reproducible.
#[derive(Debug)]
pub struct ScriptedRandom {
    samples: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        let samples: VecDeque<f64> = samples.into_iter().map(|s| s.clamp(0.0, 1.0)).collect();
        let fallback = samples.back().copied().unwrap_or(0.0);
        Self {
            samples: Mutex::new(samples),
            fallback,
        }
    }

    /// Always returns the same sample.
    pub fn constant(sample: f64) -> Self {
        Self::new([sample])
    }
}

impl ProgressRandom for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        match self.samples.lock() {
            Ok(mut samples) => {
                if samples.len() > 1 {
                    samples.pop_front().unwrap_or(self.fallback)
                } else {
                    self.fallback
                }
            }
            Err(_) => self.fallback,
        }
    }
}

/// Progress after one tick, given the current value and a sample in `[0, 1)`.
pub fn next_progress(current: f64, sample: f64) -> f64 {
    let floor = if current < MIDPOINT {
        EARLY_FLOOR
    } else {
        LATE_FLOOR
    };
    let sample = if sample.is_finite() {
        sample.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let delta = sample * JITTER_SPAN + floor;
    (current + delta).min(MAX_PROGRESS)
}

/// Human-readable sub-phase for a progress value, by quartile.
pub fn stage_label(progress: f64) -> &'static str {
    let quartile = (progress.max(0.0) / 25.0).floor() as usize;
    STAGE_LABELS[quartile.min(STAGE_LABELS.len() - 1)]
}
