//! Pre-sleep cycle planning.
//!
//! Computes target wake times a whole number of 90-minute cycles ahead, the
//! way the setup flow presents them before monitoring starts. Display times
//! are 12-hour wall-clock strings with minutes floored to a 5-minute
//! boundary.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::CYCLE_MINUTES;

/// Configuration for cycle planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Cycles suggested when the user does not pick a count (1-6).
    #[serde(default = "default_cycles")]
    pub default_cycles: u32,

    /// Time zone for display (offset in hours from UTC)
    #[serde(default)]
    pub timezone_offset_hours: i32,
}

fn default_cycles() -> u32 {
    5
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_cycles: default_cycles(),
            timezone_offset_hours: 0,
        }
    }
}

/// A planned wake time a whole number of cycles ahead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakePlan {
    /// Number of full sleep cycles.
    pub cycles: u32,
    /// Total minutes of sleep the plan allows.
    pub total_minutes: i64,
    /// Target wake instant.
    pub wake_at: DateTime<Utc>,
    /// 12-hour wall-clock display, minutes floored to 5.
    pub formatted: String,
}

/// Planner for whole-cycle wake times.
pub struct CyclePlanner {
    config: PlannerConfig,
}

impl CyclePlanner {
    pub const MIN_CYCLES: u32 = 1;
    pub const MAX_CYCLES: u32 = 6;

    /// Create a planner with default config.
    pub fn new() -> Self {
        Self {
            config: PlannerConfig::default(),
        }
    }

    /// Create a planner with custom config.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Wake plan a given number of cycles after `now`.
    ///
    /// Counts outside `MIN_CYCLES..=MAX_CYCLES` are clamped.
    pub fn wake_after(&self, now: DateTime<Utc>, cycles: u32) -> WakePlan {
        let cycles = cycles.clamp(Self::MIN_CYCLES, Self::MAX_CYCLES);
        let total_minutes = cycles as i64 * CYCLE_MINUTES;
        let wake_at = now + Duration::minutes(total_minutes);
        WakePlan {
            cycles,
            total_minutes,
            wake_at,
            formatted: self.format_wall_clock(wake_at),
        }
    }

    /// Plans for every allowed cycle count, shortest first.
    pub fn plan_table(&self, now: DateTime<Utc>) -> Vec<WakePlan> {
        (Self::MIN_CYCLES..=Self::MAX_CYCLES)
            .map(|cycles| self.wake_after(now, cycles))
            .collect()
    }

    /// 12-hour display with minutes floored to a 5-minute boundary.
    pub fn format_wall_clock(&self, at: DateTime<Utc>) -> String {
        let offset = chrono::FixedOffset::east_opt(self.config.timezone_offset_hours * 3600)
            .unwrap_or(chrono::FixedOffset::east_opt(0).unwrap());
        let local = at.with_timezone(&offset);

        let (is_pm, hour) = local.hour12();
        let minute = local.minute() / 5 * 5;
        format!("{}:{:02} {}", hour, minute, if is_pm { "PM" } else { "AM" })
    }
}

impl Default for CyclePlanner {
    fn default() -> Self {
        Self::new()
    }
}
