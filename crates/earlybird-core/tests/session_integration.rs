//! Integration tests for the monitoring session lifecycle.
//!
//! Tests the full workflow from start through polling to the final report,
//! including prediction availability, quality grading, and misuse of the
//! lifecycle operations.

use chrono::{DateTime, Duration, Utc};
use earlybird_core::{
    CoreError, SessionTracker, SimulationConfig, SleepQuality, SleepStage, WakePrediction,
};

fn base() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-01T23:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn quiet_tracker(seed: u64) -> SessionTracker {
    SessionTracker::with_config(SimulationConfig {
        noise_probability: 0.0,
        seed: Some(seed),
    })
}

#[test]
fn test_full_monitoring_workflow() {
    let base = base();
    let mut tracker = quiet_tracker(42);

    let started = tracker.start_at(base);
    assert_eq!(started.started_at, base);
    assert!(tracker.is_active());

    // Falling asleep: readings across the early windows
    let snap = tracker.poll_at(base + Duration::minutes(3)).unwrap();
    assert_eq!(snap.stage, SleepStage::Awake);

    let snap = tracker.poll_at(base + Duration::minutes(20)).unwrap();
    assert_eq!(snap.stage, SleepStage::Light);

    // 95 minutes in sits 5 minutes past the second cycle boundary
    let snap = tracker.poll_at(base + Duration::minutes(95)).unwrap();
    assert_eq!(snap.stage, SleepStage::Light);
    assert_eq!(snap.recent_history.len(), 3);

    // Three readings is not enough history for a prediction
    assert!(!snap.prediction.is_available());

    let report = tracker.stop_at(base + Duration::minutes(120)).unwrap();
    assert_eq!(report.total_minutes, 120.0);
    assert_eq!(report.history.len(), 3);
    assert!(matches!(
        report.final_prediction,
        WakePrediction::InsufficientData
    ));

    // No deep or REM readings were logged, so the night grades poorly
    assert_eq!(report.quality, SleepQuality::Poor);
    assert!((30..=59).contains(&report.quality_score));
    assert!(!tracker.is_active());
}

#[test]
fn test_prediction_appears_with_enough_history() {
    let base = base();
    let mut tracker = quiet_tracker(7);
    tracker.start_at(base);

    for i in 1..=4 {
        let snap = tracker.poll_at(base + Duration::minutes(10 * i)).unwrap();
        assert!(!snap.prediction.is_available());
    }

    // Fifth reading at 50 minutes: mid-cycle, so the target is the end of
    // the first cycle minus the boundary margin, give or take the jitter
    let snap = tracker.poll_at(base + Duration::minutes(50)).unwrap();
    match snap.prediction {
        WakePrediction::Available {
            current_cycle,
            optimal_wake_at,
            confidence,
            ..
        } => {
            assert_eq!(current_cycle, 1);
            let offset = (optimal_wake_at - base).num_minutes();
            assert!((80..=90).contains(&offset), "wake offset was {offset}");
            assert!((70..=95).contains(&confidence));
        }
        WakePrediction::InsufficientData => panic!("expected a prediction after five readings"),
    }
}

#[test]
fn test_report_serializes_for_the_wire() {
    let base = base();
    let mut tracker = quiet_tracker(3);
    tracker.start_at(base);
    for i in 1..=6 {
        tracker.poll_at(base + Duration::minutes(8 * i)).unwrap();
    }
    let report = tracker.stop_at(base + Duration::minutes(60)).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["session_id"].is_string());
    assert_eq!(json["total_minutes"], 60.0);
    assert!(json["stage_percentages"]["light"].is_number());
    assert_eq!(json["history"].as_array().unwrap().len(), 6);
    assert!(json["quality"].is_string());
}

#[test]
fn test_lifecycle_misuse_is_rejected() {
    let mut tracker = SessionTracker::new();
    assert!(matches!(tracker.poll(), Err(CoreError::NotStarted)));
    assert!(matches!(tracker.stop(), Err(CoreError::NotStarted)));

    tracker.start();
    assert!(tracker.poll().is_ok());
    let report = tracker.stop().unwrap();
    assert_eq!(report.quality, SleepQuality::InsufficientData);

    // Polling is over once the report is handed out, but stopping again
    // just replays the same end instant
    assert!(matches!(tracker.poll(), Err(CoreError::NotStarted)));
    let again = tracker.stop().unwrap();
    assert_eq!(again.stopped_at, report.stopped_at);
}
