//! Notify command

use std::time::Duration;

use clap::Args;
use huddle_core::{HuddleConfig, NotificationCollection, Severity};

#[derive(Debug, Args)]
pub struct NotifyArgs {
    /// Message to show
    pub body: String,

    /// info, success, warning or error
    #[arg(long, default_value = "info")]
    pub severity: String,

    /// Lifetime in milliseconds (defaults to the configured ttl)
    #[arg(long)]
    pub ttl_ms: Option<u64>,
}

/// Print one line per phase change until the notification is gone
pub async fn execute(
    args: NotifyArgs,
    config: &HuddleConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let notes = NotificationCollection::new(config.notifications.clone())?;
    let mut view = notes.subscribe();

    let ttl = args
        .ttl_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.notifications.ttl());
    let handle = notes.notify_with_ttl(args.body, Severity::parse(&args.severity), ttl);
    let id = handle.id();

    let mut last = None;
    loop {
        let current = view
            .borrow_and_update()
            .iter()
            .find(|n| n.id == id)
            .cloned();
        let Some(notification) = current else {
            println!("{} removed", id);
            return Ok(());
        };
        if last != Some(notification.phase) {
            println!(
                "{} [{}] {} ({:?})",
                id, notification.severity, notification.body, notification.phase
            );
            last = Some(notification.phase);
        }
        view.changed().await?;
    }
}
