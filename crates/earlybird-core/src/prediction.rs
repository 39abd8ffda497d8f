//! Wake-time prediction from accumulated stage history.
//!
//! The predictor looks at the sleeper's position within the 90-minute cycle
//! and proposes a wake instant just before a cycle boundary, preferring to
//! catch light sleep. Below a minimum number of observations it reports
//! insufficient data instead of guessing.

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::stage::{minutes_between, SleepStage, CYCLE_MINUTES};

/// Inputs for one prediction pass.
#[derive(Debug, Clone)]
pub struct PredictionContext {
    /// Instant the prediction is made at.
    pub now: DateTime<Utc>,
    /// When monitoring began.
    pub started_at: DateTime<Utc>,
    /// Most recent observed stage.
    pub current_stage: SleepStage,
    /// Number of history entries accumulated so far.
    pub observation_count: usize,
}

impl PredictionContext {
    /// Fractional minutes since monitoring began, floored at zero.
    pub fn elapsed_minutes(&self) -> f64 {
        minutes_between(self.started_at, self.now)
    }
}

/// Outcome of a prediction pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WakePrediction {
    /// Not enough history yet to say anything useful.
    InsufficientData,
    /// A proposed wake instant near a cycle boundary.
    #[serde(rename = "prediction_available")]
    Available {
        /// 1-indexed sleep cycle the sleeper is currently in.
        current_cycle: i64,
        /// Proposed wake instant.
        optimal_wake_at: DateTime<Utc>,
        /// Stage the prediction was made in.
        stage: SleepStage,
        /// Confidence percentage (70-95).
        confidence: u8,
    },
}

impl WakePrediction {
    pub fn is_available(&self) -> bool {
        matches!(self, WakePrediction::Available { .. })
    }
}

/// Predictor proposing wake instants near cycle boundaries.
#[derive(Debug, Clone)]
pub struct WakePredictor {
    /// Minimum history entries before predictions are offered.
    pub min_observations: usize,
    /// Cycle minute past which a light sleeper should be woken right away.
    pub wake_window_minute: f64,
    /// Cycle minute past which the current boundary is too close to target.
    pub rollover_minute: f64,
    /// Minutes before a cycle boundary to aim the wake call at.
    pub boundary_margin_minutes: i64,
}

impl Default for WakePredictor {
    fn default() -> Self {
        Self {
            min_observations: 5,
            wake_window_minute: 75.0,
            rollover_minute: 70.0,
            boundary_margin_minutes: 5,
        }
    }
}

impl WakePredictor {
    /// Wake-right-away window in minutes from now (min, max).
    const WAKE_SOON_MINUTES: (i64, i64) = (5, 15);

    /// Random jitter applied to every proposed instant, +/- minutes.
    const JITTER_MINUTES: i64 = 5;

    /// Reported confidence band in percent (min, max).
    const CONFIDENCE_PCT: (u8, u8) = (70, 95);

    /// Create a predictor with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose a wake instant for the given session state.
    ///
    /// Returns [`WakePrediction::InsufficientData`] until enough history has
    /// accumulated. The proposal lands `boundary_margin_minutes` before a
    /// cycle boundary, except in light sleep late in a cycle, where the
    /// sleeper should be woken within minutes.
    pub fn predict(&self, ctx: &PredictionContext, rng: &mut Mcg128Xsl64) -> WakePrediction {
        if ctx.observation_count < self.min_observations {
            return WakePrediction::InsufficientData;
        }

        let elapsed = ctx.elapsed_minutes();
        let cycle_len = CYCLE_MINUTES as f64;
        let current_cycle = (elapsed / cycle_len).floor() as i64 + 1;
        let cycle_minute = elapsed % cycle_len;

        let target = if ctx.current_stage == SleepStage::Light
            && cycle_minute > self.wake_window_minute
        {
            // Light sleep near the boundary: wake within minutes.
            let (near, far) = Self::WAKE_SOON_MINUTES;
            ctx.now + Duration::minutes(rng.gen_range(near..=far))
        } else if cycle_minute > self.rollover_minute {
            // Too close to this boundary to aim at it; take the next one.
            ctx.started_at
                + Duration::minutes(
                    (current_cycle + 1) * CYCLE_MINUTES - self.boundary_margin_minutes,
                )
        } else {
            ctx.started_at
                + Duration::minutes(current_cycle * CYCLE_MINUTES - self.boundary_margin_minutes)
        };

        let jitter = rng.gen_range(-Self::JITTER_MINUTES..=Self::JITTER_MINUTES);
        let (lo, hi) = Self::CONFIDENCE_PCT;

        WakePrediction::Available {
            current_cycle,
            optimal_wake_at: target + Duration::minutes(jitter),
            stage: ctx.current_stage,
            confidence: rng.gen_range(lo..=hi),
        }
    }
}
