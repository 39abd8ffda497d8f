//! Session lifecycle: start, poll, stop.
//!
//! `SessionTracker` is a wall-clock driven state machine. It does not use
//! internal threads - the caller polls it periodically. Every command has an
//! explicit-instant `*_at` form; the plain forms read `Utc::now()`, so tests
//! and replay drivers can supply their own clock.
//!
//! ## Lifecycle
//!
//! ```text
//! (no session) -> start -> poll* -> stop -> (stopped; start begins anew)
//! ```

use chrono::{DateTime, Utc};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::prediction::{PredictionContext, WakePrediction, WakePredictor};
use crate::simulation::{SimulationConfig, StageSimulator};
use crate::stage::{minutes_between, SleepStage, StageObservation};
use crate::summary::{SessionReport, SleepQuality, StageBreakdown};

/// One monitored sleep session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Set by the first stop; later stops re-read the frozen state.
    pub stopped_at: Option<DateTime<Utc>>,
    /// Stage of the most recent observation, `Awake` before the first poll.
    pub current_stage: SleepStage,
    /// Append-only observation log, oldest first. Never truncated.
    pub history: Vec<StageObservation>,
}

impl SleepSession {
    fn begin(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: now,
            stopped_at: None,
            current_stage: SleepStage::Awake,
            history: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.stopped_at.is_none()
    }
}

/// Confirmation returned by `start`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionStarted {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
}

/// State returned by each `poll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSnapshot {
    /// Instant the observation was logged at.
    pub at: DateTime<Utc>,
    /// Stage observed by this poll.
    pub stage: SleepStage,
    /// Fractional minutes since the session started.
    pub elapsed_minutes: f64,
    /// Copy of the most recent history entries (at most `RECENT_HISTORY`).
    pub recent_history: Vec<StageObservation>,
    pub prediction: WakePrediction,
}

/// Wall-clock driven monitor for a single sleep session.
///
/// Owns the stage simulator, the wake predictor, and one seedable random
/// stream shared by both. Restarting keeps the stream running, so a seeded
/// tracker replays identically from construction.
pub struct SessionTracker {
    simulator: StageSimulator,
    predictor: WakePredictor,
    rng: Mcg128Xsl64,
    session: Option<SleepSession>,
}

impl SessionTracker {
    /// Number of trailing history entries a poll exposes.
    pub const RECENT_HISTORY: usize = 10;

    /// Create a tracker with default config.
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Create a tracker with custom simulation config.
    pub fn with_config(config: SimulationConfig) -> Self {
        let rng = config.build_rng();
        Self {
            simulator: StageSimulator::with_config(config),
            predictor: WakePredictor::new(),
            rng,
            session: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<&SleepSession> {
        self.session.as_ref()
    }

    /// Whether a session has been started and not yet stopped.
    pub fn is_active(&self) -> bool {
        self.session.as_ref().map(|s| s.is_active()).unwrap_or(false)
    }

    /// Stage of the most recent observation, `Awake` with no session.
    pub fn current_stage(&self) -> SleepStage {
        self.session
            .as_ref()
            .map(|s| s.current_stage)
            .unwrap_or(SleepStage::Awake)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh session at the wall clock.
    pub fn start(&mut self) -> SessionStarted {
        self.start_at(Utc::now())
    }

    /// Begin a fresh session at an explicit instant.
    ///
    /// Any previous session is discarded: new identity, empty history,
    /// stage reset to `Awake`. The random stream continues uninterrupted.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> SessionStarted {
        let session = SleepSession::begin(now);
        let started = SessionStarted {
            session_id: session.id,
            started_at: session.started_at,
        };
        self.session = Some(session);
        started
    }

    /// Observe the current stage at the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotStarted`] without an active session.
    pub fn poll(&mut self) -> Result<PollSnapshot> {
        self.poll_at(Utc::now())
    }

    /// Observe the current stage at an explicit instant.
    ///
    /// Appends exactly one history entry and refreshes the prediction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotStarted`] without an active session; a
    /// stopped session no longer accepts polls.
    pub fn poll_at(&mut self, now: DateTime<Utc>) -> Result<PollSnapshot> {
        let session = match self.session.as_mut() {
            Some(s) if s.is_active() => s,
            _ => return Err(CoreError::NotStarted),
        };

        // Pin the log order if the wall clock was adjusted backwards.
        let at = match session.history.last() {
            Some(prev) if prev.at > now => prev.at,
            _ => now,
        };
        let elapsed_minutes = minutes_between(session.started_at, at);

        let stage = self.simulator.observe(elapsed_minutes, &mut self.rng);
        session.history.push(StageObservation { at, stage });
        session.current_stage = stage;

        let ctx = PredictionContext {
            now: at,
            started_at: session.started_at,
            current_stage: stage,
            observation_count: session.history.len(),
        };
        let prediction = self.predictor.predict(&ctx, &mut self.rng);

        let skip = session.history.len().saturating_sub(Self::RECENT_HISTORY);
        let recent_history = session.history[skip..].to_vec();

        Ok(PollSnapshot {
            at,
            stage,
            elapsed_minutes,
            recent_history,
            prediction,
        })
    }

    /// End the session at the wall clock and summarize it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotStarted`] if no session was ever started.
    pub fn stop(&mut self) -> Result<SessionReport> {
        self.stop_at(Utc::now())
    }

    /// End the session at an explicit instant and summarize it.
    ///
    /// The first stop freezes the end instant; a repeated stop re-reads the
    /// frozen state, leaving the history and totals unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotStarted`] if no session was ever started.
    pub fn stop_at(&mut self, now: DateTime<Utc>) -> Result<SessionReport> {
        let session = self.session.as_mut().ok_or(CoreError::NotStarted)?;

        let stopped_at = *session.stopped_at.get_or_insert(now);
        let total_minutes = minutes_between(session.started_at, stopped_at);

        let stage_percentages = StageBreakdown::from_observations(&session.history);
        let quality = SleepQuality::grade(total_minutes, stage_percentages.restorative());
        let quality_score = quality.sample_score(&mut self.rng);

        let ctx = PredictionContext {
            now: stopped_at,
            started_at: session.started_at,
            current_stage: session.current_stage,
            observation_count: session.history.len(),
        };
        let final_prediction = self.predictor.predict(&ctx, &mut self.rng);

        Ok(SessionReport {
            session_id: session.id,
            started_at: session.started_at,
            stopped_at,
            total_minutes,
            stage_percentages,
            quality,
            quality_score,
            final_prediction,
            history: session.history.clone(),
        })
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}
