use chrono::Utc;
use clap::Subcommand;
use earlybird_core::{Config, CyclePlanner};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Suggest a wake-up time a number of sleep cycles from now
    Wake {
        /// Sleep cycles to plan for (defaults to the configured count)
        #[arg(long)]
        cycles: Option<u32>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print wake-up times for every supported cycle count
    Table {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let planner = CyclePlanner::with_config(config.planner.clone());
    let now = Utc::now();

    match action {
        PlanAction::Wake { cycles, json } => {
            let cycles = cycles.unwrap_or(config.planner.default_cycles);
            let plan = planner.wake_after(now, cycles);
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!(
                    "{} cycles ({} min asleep): wake up around {}",
                    plan.cycles, plan.total_minutes, plan.formatted
                );
            }
        }
        PlanAction::Table { json } => {
            let table = planner.plan_table(now);
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                for plan in &table {
                    println!(
                        "{} cycles ({:>3} min): {}",
                        plan.cycles, plan.total_minutes, plan.formatted
                    );
                }
            }
        }
    }
    Ok(())
}
