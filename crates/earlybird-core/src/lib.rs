//! # EarlyBird Core Library
//!
//! This library provides the core business logic for the EarlyBird sleep
//! monitor. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any GUI being a thin layer
//! over the same core library.
//!
//! ## Architecture
//!
//! - **Session Tracker**: A wall-clock-based session state machine that
//!   requires the caller to periodically invoke `poll()` for new readings
//! - **Stage Simulation**: Deterministic stage schedule with seeded sensor
//!   noise standing in for real EEG hardware
//! - **Wake Prediction**: Cycle-position heuristics that pick a light-sleep
//!   wake-up time once enough history has accumulated
//! - **Planning**: Bedtime arithmetic for choosing a wake-up time before
//!   any monitoring starts
//!
//! ## Key Components
//!
//! - [`SessionTracker`]: Core monitoring state machine
//! - [`StageSimulator`]: Sleep stage schedule and noise model
//! - [`WakePredictor`]: Optimal wake-up time heuristics
//! - [`CyclePlanner`]: Cycle-count based wake-up planning
//! - [`Config`]: Application configuration management

pub mod config;
pub mod error;
pub mod planner;
pub mod prediction;
pub mod simulation;
pub mod stage;
pub mod summary;
pub mod tracker;

pub use config::{data_dir, Config, MonitorConfig};
pub use error::{ConfigError, CoreError, Result};
pub use planner::{CyclePlanner, PlannerConfig, WakePlan};
pub use prediction::{PredictionContext, WakePrediction, WakePredictor};
pub use simulation::{SimulationConfig, StageSimulator};
pub use stage::{minutes_between, SleepStage, StageObservation, CYCLE_MINUTES};
pub use summary::{SessionReport, SleepQuality, StageBreakdown};
pub use tracker::{PollSnapshot, SessionStarted, SessionTracker, SleepSession};
