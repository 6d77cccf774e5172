use chrono::Utc;
use clap::Subcommand;
use contraction_core::stats::format_duration_secs;

use super::{local_hms, open_tracker, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Averages over recorded contractions
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how the recent history measures against the 5-1-1 rule
    Rule,
}

pub fn run(action: StatsAction) -> CliResult {
    let (tracker, _notifier, _config) = open_tracker()?;
    let now = Utc::now();

    match action {
        StatsAction::Summary { json } => {
            let summary = tracker.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Contractions:      {}", summary.total_contractions);
                println!(
                    "Average duration:  {}",
                    format_duration_secs(summary.average_duration as i64)
                );
                if summary.average_interval > 0.0 {
                    println!(
                        "Average interval:  {}",
                        format_duration_secs(summary.average_interval as i64)
                    );
                } else {
                    println!("Average interval:  -");
                }
                match &summary.last_contraction {
                    Some(last) => println!("Last contraction:  {}", local_hms(last.start_time())),
                    None => println!("Last contraction:  -"),
                }
            }
        }
        StatsAction::Rule => {
            let report = tracker.rule_report(now);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
