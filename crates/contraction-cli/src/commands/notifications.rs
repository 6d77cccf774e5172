use clap::Subcommand;
use contraction_core::notify::{NotificationPermission, Notifier};
use contraction_core::Config;

use super::{open_tracker, CliResult};

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// Show the current permission
    Status,
    /// Ask for permission if it has not been decided yet
    Request,
    /// Refuse notifications; alerts are then shown in the terminal only
    Deny,
}

pub fn run(action: NotificationsAction) -> CliResult {
    match action {
        NotificationsAction::Status => {
            let config = Config::load()?;
            println!("{}", config.notifications.permission);
        }
        NotificationsAction::Request => {
            let (tracker, mut notifier, mut config) = open_tracker()?;
            let permission = tracker.request_notification_permission(&mut notifier);
            if permission != config.notifications.permission {
                config.notifications.permission = permission;
                config.save()?;
            }
            println!("{}", notifier.permission());
        }
        NotificationsAction::Deny => {
            let mut config = Config::load()?;
            config.notifications.permission = NotificationPermission::Denied;
            config.save()?;
            println!("{}", NotificationPermission::Denied);
        }
    }
    Ok(())
}
