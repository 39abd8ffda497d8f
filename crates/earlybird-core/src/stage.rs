//! Sleep stage domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of one full sleep cycle in minutes.
pub const CYCLE_MINUTES: i64 = 90;

/// A sleep stage as reported by the simulated sensor pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStage {
    Awake,
    Light,
    Deep,
    Rem,
}

impl SleepStage {
    /// All stages, in schedule order. Used for uniform draws.
    pub const ALL: [SleepStage; 4] = [
        SleepStage::Awake,
        SleepStage::Light,
        SleepStage::Deep,
        SleepStage::Rem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SleepStage::Awake => "awake",
            SleepStage::Light => "light",
            SleepStage::Deep => "deep",
            SleepStage::Rem => "rem",
        }
    }

    /// Deep and REM sleep count toward the restorative share of a night.
    pub fn is_restorative(&self) -> bool {
        matches!(self, SleepStage::Deep | SleepStage::Rem)
    }
}

impl std::fmt::Display for SleepStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a session's observation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageObservation {
    /// When the observation was logged.
    pub at: DateTime<Utc>,
    /// Stage observed at that instant.
    pub stage: SleepStage,
}

/// Fractional minutes from `from` to `to`, floored at zero.
pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    ((to - from).num_milliseconds() as f64 / 60_000.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base() -> DateTime<Utc> {
        chrono::DateTime::parse_from_rfc3339("2026-03-01T22:30:00+00:00")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn restorative_stages() {
        assert!(!SleepStage::Awake.is_restorative());
        assert!(!SleepStage::Light.is_restorative());
        assert!(SleepStage::Deep.is_restorative());
        assert!(SleepStage::Rem.is_restorative());
    }

    #[test]
    fn stages_serialize_snake_case() {
        let json = serde_json::to_string(&SleepStage::Rem).unwrap();
        assert_eq!(json, "\"rem\"");
        let parsed: SleepStage = serde_json::from_str("\"deep\"").unwrap();
        assert_eq!(parsed, SleepStage::Deep);
    }

    #[test]
    fn minutes_between_is_fractional() {
        let start = base();
        let m = minutes_between(start, start + Duration::seconds(90));
        assert!((m - 1.5).abs() < 1e-9);
    }

    #[test]
    fn minutes_between_floors_at_zero() {
        let start = base();
        assert_eq!(minutes_between(start, start - Duration::minutes(5)), 0.0);
    }
}
