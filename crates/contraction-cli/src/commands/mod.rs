pub mod config;
pub mod history;
pub mod notifications;
pub mod stats;
pub mod timer;

use std::io::{BufRead, IsTerminal, Write};

use chrono::{DateTime, Local, NaiveTime, Utc};
use contraction_core::notify::{
    NotificationPermission, Notifier, SystemNotification,
};
use contraction_core::{
    Config, ContractionTracker, CoreError, Database, Event, TrackerConfig, ValidationError,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the database and configuration and hydrate a tracker.
///
/// Any alert raised by hydration is rendered before returning.
pub fn open_tracker() -> Result<(ContractionTracker<Database>, TerminalNotifier, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let tracker_config = TrackerConfig {
        persist_session: true,
        ..TrackerConfig::from(&config)
    };
    let mut tracker = ContractionTracker::new(db, tracker_config);
    let mut notifier = TerminalNotifier::new(config.notifications.permission);
    let events = tracker.hydrate(Utc::now(), &mut notifier);
    render_alerts(&events);
    Ok((tracker, notifier, config))
}

/// Print events as JSON on stdout; provider alerts also go to stderr.
pub fn print_events(events: &[Event]) -> CliResult {
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    render_alerts(events);
    Ok(())
}

fn render_alerts(events: &[Event]) {
    for event in events {
        if let Event::ProviderAlert { title, body, .. } = event {
            eprintln!("!! {title}");
            eprintln!("   {body}");
        }
    }
}

/// Parse RFC 3339, or `HH:MM[:SS]` as a local time today.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = || ValidationError::InvalidTimestamp {
        input: input.to_string(),
    };
    if let Ok(t) = DateTime::parse_from_rfc3339(input) {
        return Ok(t.with_timezone(&Utc));
    }
    let time = NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| invalid())?;
    Local::now()
        .date_naive()
        .and_time(time)
        .and_local_timezone(Local)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(invalid)
}

/// Local wall-clock rendering for tables.
pub fn local_hms(t: DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Terminal stand-in for the OS notification API.
///
/// The permission decision is remembered in `notifications.permission`;
/// notifications ring the bell and print a banner on stderr.
pub struct TerminalNotifier {
    permission: NotificationPermission,
}

impl TerminalNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self { permission }
    }
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn request_permission(&mut self) -> NotificationPermission {
        eprint!("Allow provider alerts to ring the terminal bell? [y/N] ");
        let _ = std::io::stderr().flush();

        let mut answer = String::new();
        let stdin = std::io::stdin();
        let read = stdin.lock().read_line(&mut answer);
        self.permission = match read {
            Ok(0) | Err(_) => {
                // No answer available; leave the decision open.
                return self.permission;
            }
            Ok(_) if matches!(answer.trim(), "y" | "Y" | "yes") => NotificationPermission::Granted,
            Ok(_) => NotificationPermission::Denied,
        };
        self.permission
    }

    fn show(&mut self, notification: &SystemNotification) -> Result<(), CoreError> {
        let mut err = std::io::stderr();
        if err.is_terminal() {
            write!(err, "\x07")?;
        }
        writeln!(err, "[{}] {}", notification.title, notification.body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let t = parse_time("2024-03-01T08:00:00+02:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-03-01T06:00:00+00:00");
    }

    #[test]
    fn parses_clock_times() {
        assert!(parse_time("08:15").is_ok());
        assert!(parse_time("08:15:30").is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_time("soon"),
            Err(ValidationError::InvalidTimestamp { .. })
        ));
    }
}
