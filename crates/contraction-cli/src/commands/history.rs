use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use contraction_core::export;
use contraction_core::stats::format_duration_secs;
use contraction_core::ContractionEdit;

use super::{local_hms, open_tracker, parse_time, print_events, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded contractions, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a contraction by hand
    Add {
        /// Start time (RFC 3339 or HH:MM[:SS] today)
        #[arg(long)]
        start: String,
        /// End time (RFC 3339 or HH:MM[:SS] today)
        #[arg(long)]
        end: Option<String>,
    },
    /// Change the times of a recorded contraction
    Edit {
        /// Contraction ID
        id: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: Option<String>,
    },
    /// Delete a recorded contraction
    Delete {
        /// Contraction ID
        id: String,
    },
    /// Delete every contraction and reset alerts
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
    /// Export as CSV for your care provider
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(action: HistoryAction) -> CliResult {
    let (mut tracker, mut notifier, _config) = open_tracker()?;
    let now = Utc::now();

    match action {
        HistoryAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(tracker.contractions())?);
            } else if tracker.contractions().is_empty() {
                println!("No contractions recorded yet.");
            } else {
                println!("{:<36}  {:>8}  {:>8}  {}", "ID", "START", "END", "DURATION");
                for c in tracker.contractions() {
                    println!(
                        "{:<36}  {:>8}  {:>8}  {}",
                        c.id(),
                        local_hms(c.start_time()),
                        c.end_time().map(local_hms).unwrap_or_else(|| "-".into()),
                        c.duration()
                            .map(format_duration_secs)
                            .unwrap_or_else(|| "-".into()),
                    );
                }
            }
        }
        HistoryAction::Add { start, end } => {
            let start_time = parse_time(&start)?;
            let end_time = end.as_deref().map(parse_time).transpose()?;
            let events = tracker.add(start_time, end_time, now, &mut notifier);
            print_events(&events)?;
        }
        HistoryAction::Edit { id, start, end } => {
            let edit = ContractionEdit {
                start_time: parse_time(&start)?,
                end_time: end.as_deref().map(parse_time).transpose()?,
            };
            let events = tracker.edit(&id, edit, now, &mut notifier);
            if events.is_empty() {
                eprintln!("no contraction with id {id}");
            }
            print_events(&events)?;
        }
        HistoryAction::Delete { id } => {
            let events = tracker.delete(&id, now, &mut notifier);
            if events.is_empty() {
                eprintln!("no contraction with id {id}");
            }
            print_events(&events)?;
        }
        HistoryAction::Clear { yes } => {
            if !yes {
                return Err("refusing to clear all contractions without --yes".into());
            }
            let event = tracker.clear_all(now);
            print_events(&[event])?;
        }
        HistoryAction::Export { output } => match output {
            Some(path) => {
                let file = File::create(&path)?;
                export::to_csv(tracker.contractions(), BufWriter::new(file))?;
                eprintln!("exported {} contractions to {}", tracker.contractions().len(), path.display());
            }
            None => export::to_csv(tracker.contractions(), std::io::stdout().lock())?,
        },
    }
    Ok(())
}
