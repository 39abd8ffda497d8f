//! Sleep stage simulation.
//!
//! Observed stages follow a fixed early-night schedule, pass through a
//! weighted mix in the back half of the first cycle, then settle into a
//! repeating 90-minute cycle profile. A small noise probability models
//! sensor misreads by replacing the scheduled stage with a uniform draw
//! over all stages.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::stage::{SleepStage, CYCLE_MINUTES};

/// Configuration for stage simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Probability that a reading ignores the schedule (0.0-1.0)
    #[serde(default = "default_noise_probability")]
    pub noise_probability: f64,

    /// Random seed for reproducibility (None = random)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_noise_probability() -> f64 {
    StageSimulator::DEFAULT_NOISE_PROBABILITY
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            noise_probability: StageSimulator::DEFAULT_NOISE_PROBABILITY,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Fix the random seed for a reproducible stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the PCG stream this config describes.
    pub fn build_rng(&self) -> Mcg128Xsl64 {
        match self.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if `noise_probability` lies outside `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.noise_probability) {
            return Err(ConfigError::InvalidValue {
                key: "noise_probability".to_string(),
                message: format!("must be within 0.0-1.0, got {}", self.noise_probability),
            });
        }
        Ok(())
    }
}

/// Simulator mapping elapsed session time to an observed sleep stage.
pub struct StageSimulator {
    config: SimulationConfig,
}

impl StageSimulator {
    /// Default chance that a reading ignores the schedule.
    pub const DEFAULT_NOISE_PROBABILITY: f64 = 0.1;

    /// Stage mix for minutes 45-90 of the first cycle.
    const MIXED_WEIGHTS: [(SleepStage, f64); 3] = [
        (SleepStage::Light, 0.3),
        (SleepStage::Deep, 0.2),
        (SleepStage::Rem, 0.5),
    ];

    /// Create a simulator with default config.
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
        }
    }

    /// Create a simulator with custom config.
    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Stage the schedule calls for, before noise.
    ///
    /// Deterministic everywhere except minutes 45-90 of the first cycle,
    /// where the stage is drawn from a weighted mix.
    pub fn scheduled_stage(&self, elapsed_minutes: f64, rng: &mut Mcg128Xsl64) -> SleepStage {
        let cycle_len = CYCLE_MINUTES as f64;
        if elapsed_minutes < 5.0 {
            SleepStage::Awake
        } else if elapsed_minutes < 25.0 {
            SleepStage::Light
        } else if elapsed_minutes < 45.0 {
            SleepStage::Deep
        } else if elapsed_minutes < cycle_len {
            Self::mixed_stage(rng)
        } else {
            Self::cycle_stage(elapsed_minutes % cycle_len)
        }
    }

    /// One simulated sensor reading at the given elapsed time.
    pub fn observe(&self, elapsed_minutes: f64, rng: &mut Mcg128Xsl64) -> SleepStage {
        let scheduled = self.scheduled_stage(elapsed_minutes, rng);
        if rng.gen::<f64>() < self.config.noise_probability {
            // Misread: uniform over all stages, may coincide with the schedule.
            return SleepStage::ALL[rng.gen_range(0..SleepStage::ALL.len())];
        }
        scheduled
    }

    /// Weighted draw for the late first cycle.
    fn mixed_stage(rng: &mut Mcg128Xsl64) -> SleepStage {
        let roll = rng.gen::<f64>();
        let mut cumulative = 0.0;
        for (stage, weight) in Self::MIXED_WEIGHTS {
            cumulative += weight;
            if roll < cumulative {
                return stage;
            }
        }
        SleepStage::Rem
    }

    /// Stage profile within a settled 90-minute cycle.
    fn cycle_stage(cycle_minute: f64) -> SleepStage {
        if cycle_minute < 10.0 {
            SleepStage::Light
        } else if cycle_minute < 30.0 {
            SleepStage::Deep
        } else if cycle_minute < 45.0 {
            SleepStage::Rem
        } else {
            SleepStage::Light
        }
    }
}

impl Default for StageSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn make_rng() -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(7)
    }

    /// Simulator with noise disabled, so the schedule shows through exactly.
    fn quiet_simulator() -> StageSimulator {
        StageSimulator::with_config(SimulationConfig {
            noise_probability: 0.0,
            seed: Some(7),
        })
    }

    #[test]
    fn early_night_windows_are_exact() {
        let sim = quiet_simulator();
        let mut rng = make_rng();

        assert_eq!(sim.observe(0.0, &mut rng), SleepStage::Awake);
        assert_eq!(sim.observe(4.99, &mut rng), SleepStage::Awake);
        assert_eq!(sim.observe(5.0, &mut rng), SleepStage::Light);
        assert_eq!(sim.observe(24.99, &mut rng), SleepStage::Light);
        assert_eq!(sim.observe(25.0, &mut rng), SleepStage::Deep);
        assert_eq!(sim.observe(44.99, &mut rng), SleepStage::Deep);
    }

    #[test]
    fn settled_cycle_profile_is_exact() {
        let sim = quiet_simulator();
        let mut rng = make_rng();

        // cycle_minute: 0, 9.9, 10, 29.9, 30, 44.9, 45, 89.9
        assert_eq!(sim.observe(90.0, &mut rng), SleepStage::Light);
        assert_eq!(sim.observe(99.9, &mut rng), SleepStage::Light);
        assert_eq!(sim.observe(100.0, &mut rng), SleepStage::Deep);
        assert_eq!(sim.observe(119.9, &mut rng), SleepStage::Deep);
        assert_eq!(sim.observe(120.0, &mut rng), SleepStage::Rem);
        assert_eq!(sim.observe(134.9, &mut rng), SleepStage::Rem);
        assert_eq!(sim.observe(135.0, &mut rng), SleepStage::Light);
        assert_eq!(sim.observe(179.9, &mut rng), SleepStage::Light);
    }

    #[test]
    fn settled_cycles_repeat_every_90_minutes() {
        let sim = quiet_simulator();
        let mut rng = make_rng();

        for offset in [0.0, 5.0, 15.0, 35.0, 60.0, 89.0] {
            let first = sim.observe(90.0 + offset, &mut rng);
            let second = sim.observe(180.0 + offset, &mut rng);
            let third = sim.observe(270.0 + offset, &mut rng);
            assert_eq!(first, second);
            assert_eq!(second, third);
        }
    }

    #[test]
    fn mixed_window_never_yields_awake() {
        let sim = quiet_simulator();
        let mut rng = make_rng();

        for _ in 0..500 {
            let stage = sim.observe(60.0, &mut rng);
            assert_ne!(stage, SleepStage::Awake);
        }
    }

    #[test]
    fn mixed_window_matches_weights() {
        let sim = quiet_simulator();
        let mut rng = make_rng();

        let mut light = 0usize;
        let mut deep = 0usize;
        let mut rem = 0usize;
        let draws = 10_000;
        for _ in 0..draws {
            match sim.observe(60.0, &mut rng) {
                SleepStage::Light => light += 1,
                SleepStage::Deep => deep += 1,
                SleepStage::Rem => rem += 1,
                SleepStage::Awake => panic!("awake in mixed window"),
            }
        }

        let n = draws as f64;
        assert!((light as f64 / n - 0.3).abs() < 0.03);
        assert!((deep as f64 / n - 0.2).abs() < 0.03);
        assert!((rem as f64 / n - 0.5).abs() < 0.03);
    }

    #[test]
    fn noise_rate_matches_configuration() {
        // In a deterministic window a misread only shows when the uniform
        // draw picks one of the other three stages: 0.1 * 3/4 = 0.075.
        let config = SimulationConfig::default().with_seed(11);
        let mut rng = config.build_rng();
        let sim = StageSimulator::with_config(config);

        let draws = 10_000;
        let mut disagreements = 0usize;
        for _ in 0..draws {
            if sim.observe(2.0, &mut rng) != SleepStage::Awake {
                disagreements += 1;
            }
        }

        let rate = disagreements as f64 / draws as f64;
        assert!((rate - 0.075).abs() < 0.02, "disagreement rate {rate}");
    }

    #[test]
    fn same_seed_reproduces_the_stream() {
        let sim = StageSimulator::new();
        let mut a = Mcg128Xsl64::seed_from_u64(42);
        let mut b = Mcg128Xsl64::seed_from_u64(42);

        for i in 0..200 {
            let elapsed = i as f64 * 2.5;
            assert_eq!(sim.observe(elapsed, &mut a), sim.observe(elapsed, &mut b));
        }
    }

    #[test]
    fn validate_rejects_out_of_range_probability() {
        let config = SimulationConfig {
            noise_probability: 1.5,
            seed: None,
        };
        assert!(config.validate().is_err());
        assert!(SimulationConfig::default().validate().is_ok());
    }
}
