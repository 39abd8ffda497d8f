//! Session summary: stage distribution and quality grading.

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prediction::WakePrediction;
use crate::stage::{SleepStage, StageObservation};

/// Share of observations spent in each stage, in percent.
///
/// All zeros for an empty history; sums to ~100 otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageBreakdown {
    pub awake: f64,
    pub light: f64,
    pub deep: f64,
    pub rem: f64,
}

impl StageBreakdown {
    /// Percentage distribution over an observation history.
    pub fn from_observations(history: &[StageObservation]) -> Self {
        if history.is_empty() {
            return Self::default();
        }

        let mut awake = 0usize;
        let mut light = 0usize;
        let mut deep = 0usize;
        let mut rem = 0usize;
        for obs in history {
            match obs.stage {
                SleepStage::Awake => awake += 1,
                SleepStage::Light => light += 1,
                SleepStage::Deep => deep += 1,
                SleepStage::Rem => rem += 1,
            }
        }

        let total = history.len() as f64;
        Self {
            awake: awake as f64 / total * 100.0,
            light: light as f64 / total * 100.0,
            deep: deep as f64 / total * 100.0,
            rem: rem as f64 / total * 100.0,
        }
    }

    /// Share for one stage.
    pub fn share(&self, stage: SleepStage) -> f64 {
        match stage {
            SleepStage::Awake => self.awake,
            SleepStage::Light => self.light,
            SleepStage::Deep => self.deep,
            SleepStage::Rem => self.rem,
        }
    }

    /// Deep plus REM share, the restorative part of the night.
    pub fn restorative(&self) -> f64 {
        self.deep + self.rem
    }

    pub fn total(&self) -> f64 {
        self.awake + self.light + self.deep + self.rem
    }
}

/// Quality grade for a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepQuality {
    /// Restorative share above 40%
    Excellent,
    /// Restorative share above 30%
    Good,
    /// Restorative share above 20%
    Fair,
    /// Restorative share of 20% or less
    Poor,
    /// Session too short to grade
    InsufficientData,
}

impl SleepQuality {
    /// Sessions shorter than this many minutes are not graded.
    pub const MIN_GRADED_MINUTES: f64 = 10.0;

    /// Grade from total duration and restorative (deep + REM) share.
    pub fn grade(total_minutes: f64, restorative_pct: f64) -> Self {
        if total_minutes < Self::MIN_GRADED_MINUTES {
            SleepQuality::InsufficientData
        } else if restorative_pct > 40.0 {
            SleepQuality::Excellent
        } else if restorative_pct > 30.0 {
            SleepQuality::Good
        } else if restorative_pct > 20.0 {
            SleepQuality::Fair
        } else {
            SleepQuality::Poor
        }
    }

    /// Display score band for the grade.
    pub fn score_range(&self) -> std::ops::RangeInclusive<u8> {
        match self {
            SleepQuality::Excellent => 90..=100,
            SleepQuality::Good => 75..=89,
            SleepQuality::Fair => 60..=74,
            SleepQuality::Poor => 30..=59,
            SleepQuality::InsufficientData => 0..=0,
        }
    }

    /// Draw a display score from the grade's band.
    pub fn sample_score(&self, rng: &mut Mcg128Xsl64) -> u8 {
        rng.gen_range(self.score_range())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SleepQuality::Excellent => "excellent",
            SleepQuality::Good => "good",
            SleepQuality::Fair => "fair",
            SleepQuality::Poor => "poor",
            SleepQuality::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for SleepQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final report produced when a session stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    /// Total monitored minutes (fractional).
    pub total_minutes: f64,
    /// Distribution over the full history.
    pub stage_percentages: StageBreakdown,
    pub quality: SleepQuality,
    /// Display score drawn from the quality band.
    pub quality_score: u8,
    /// Prediction state as of the stop instant.
    pub final_prediction: WakePrediction,
    /// Complete observation history, oldest first.
    pub history: Vec<StageObservation>,
}
