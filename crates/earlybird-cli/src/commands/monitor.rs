use chrono::{Duration, Utc};
use clap::Subcommand;
use earlybird_core::{Config, PollSnapshot, SessionReport, SessionTracker, WakePrediction};

#[derive(Subcommand)]
pub enum MonitorAction {
    /// Run a live monitoring session against the wall clock
    Run {
        /// How long to monitor, in minutes
        #[arg(long, default_value = "2")]
        minutes: u64,
        /// Seconds between readings (defaults to the configured cadence)
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Fixed random seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Simulate a whole night on a synthetic clock
    Simulate {
        /// Length of the simulated night, in minutes
        #[arg(long, default_value = "480")]
        minutes: u64,
        /// Minutes between simulated readings
        #[arg(long, default_value = "5")]
        step_minutes: u64,
        /// Fixed random seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn make_tracker(config: &Config, seed: Option<u64>) -> SessionTracker {
    let mut sim = config.monitor.simulation();
    if seed.is_some() {
        sim.seed = seed;
    }
    SessionTracker::with_config(sim)
}

fn print_snapshot(snapshot: &PollSnapshot, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }
    let line = format!("[{:>6.1} min] {}", snapshot.elapsed_minutes, snapshot.stage);
    match &snapshot.prediction {
        WakePrediction::Available {
            optimal_wake_at,
            confidence,
            ..
        } => println!(
            "{line}  wake {} ({confidence}% confidence)",
            optimal_wake_at.format("%H:%M UTC")
        ),
        WakePrediction::InsufficientData => println!("{line}"),
    }
    Ok(())
}

fn print_report(report: &SessionReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("session {}", report.session_id);
    println!("  duration: {:.1} min", report.total_minutes);
    println!(
        "  stages: awake {:.1}%  light {:.1}%  deep {:.1}%  rem {:.1}%",
        report.stage_percentages.awake,
        report.stage_percentages.light,
        report.stage_percentages.deep,
        report.stage_percentages.rem
    );
    println!(
        "  quality: {} (score {})",
        report.quality, report.quality_score
    );
    if let WakePrediction::Available {
        optimal_wake_at,
        confidence,
        ..
    } = &report.final_prediction
    {
        println!(
            "  suggested wake-up: {} ({confidence}% confidence)",
            optimal_wake_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    Ok(())
}

pub fn run(action: MonitorAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        MonitorAction::Run {
            minutes,
            interval_secs,
            seed,
            json,
        } => {
            let interval = interval_secs.unwrap_or(config.monitor.poll_interval_secs);
            let mut tracker = make_tracker(&config, seed);

            let started = tracker.start();
            if !json {
                println!(
                    "monitoring started at {}",
                    started.started_at.format("%H:%M:%S UTC")
                );
            }

            let deadline = started.started_at + Duration::minutes(minutes as i64);
            while Utc::now() < deadline {
                std::thread::sleep(std::time::Duration::from_secs(interval));
                let snapshot = tracker.poll()?;
                print_snapshot(&snapshot, json)?;
            }

            let report = tracker.stop()?;
            print_report(&report, json)?;
        }
        MonitorAction::Simulate {
            minutes,
            step_minutes,
            seed,
            json,
        } => {
            let step = step_minutes.max(1);
            let mut tracker = make_tracker(&config, seed);

            let started = tracker.start_at(Utc::now());
            let mut elapsed = step;
            while elapsed <= minutes {
                let at = started.started_at + Duration::minutes(elapsed as i64);
                let snapshot = tracker.poll_at(at)?;
                print_snapshot(&snapshot, json)?;
                elapsed += step;
            }

            let report = tracker.stop_at(started.started_at + Duration::minutes(minutes as i64))?;
            print_report(&report, json)?;
        }
    }
    Ok(())
}
