use std::thread;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use contraction_core::stats::{format_duration_secs, needs_tick, time_since_last};
use contraction_core::{ContractionTracker, Database};
use serde::Serialize;

use super::{open_tracker, print_events, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start timing a contraction
    Start,
    /// Stop timing; contractions under one second are discarded
    Stop,
    /// Print the current tracking state as JSON
    Status {
        /// Reprint once a second while idle; stops once a contraction is
        /// being timed
        #[arg(long)]
        watch: bool,
        /// Stop watching after this many updates
        #[arg(long, requires = "watch")]
        count: Option<u64>,
    },
}

#[derive(Serialize)]
struct Status {
    is_tracking: bool,
    current_id: Option<String>,
    elapsed_secs: Option<i64>,
    time_since_last_secs: i64,
    time_since_last: String,
    total_contractions: usize,
    meets_rule: bool,
}

pub fn run(action: TimerAction) -> CliResult {
    let (mut tracker, mut notifier, _config) = open_tracker()?;
    let now = Utc::now();

    match action {
        TimerAction::Start => match tracker.start(now) {
            Some(event) => print_events(&[event])?,
            None => eprintln!("a contraction is already being timed; stop it first"),
        },
        TimerAction::Stop => {
            let events = tracker.stop(now, &mut notifier);
            if events.is_empty() {
                eprintln!("no contraction is being timed");
            }
            print_events(&events)?;
        }
        TimerAction::Status { watch, count } => {
            print_status(&tracker)?;
            if watch {
                let mut printed = 1;
                while needs_tick(tracker.is_tracking()) && count.map_or(true, |n| printed < n) {
                    thread::sleep(Duration::from_secs(1));
                    // Another invocation may have started a contraction meanwhile.
                    tracker = open_tracker()?.0;
                    print_status(&tracker)?;
                    printed += 1;
                }
            }
        }
    }
    Ok(())
}

fn print_status(tracker: &ContractionTracker<Database>) -> CliResult {
    let now = Utc::now();
    let summary = tracker.summary();
    let since = time_since_last(&summary, tracker.current(), now);
    let status = Status {
        is_tracking: tracker.is_tracking(),
        current_id: tracker.current().map(|c| c.id().to_string()),
        elapsed_secs: tracker.elapsed_secs(now),
        time_since_last_secs: since,
        time_since_last: format_duration_secs(since),
        total_contractions: summary.total_contractions,
        meets_rule: tracker.meets_rule(now),
    };
    println!("{}", serde_json::to_string(&status)?);
    Ok(())
}
