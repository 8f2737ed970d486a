//! Notifications command - read and manage the signed-in user's inbox

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{get_context, signed_in_user};
use crate::output;
use peersfx_core::domain::NotificationType;
use peersfx_core::ports::realtime::{NEW_NOTIFICATION, USER_NOTIFICATIONS};
use peersfx_core::services::notifications::notification_age;
use peersfx_core::services::ReadFilter;
use peersfx_core::Notification;

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// List notifications, newest first
    List {
        /// all, unread or read
        #[arg(long, default_value = "all")]
        filter: ReadFilter,
        /// Only this type (info, success, warning, error)
        #[arg(long = "type")]
        notification_type: Option<NotificationType>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark one notification as read
    Read { id: String },
    /// Mark one notification as unread
    Unread { id: String },
    /// Delete a notification
    Delete { id: String },
    /// Mark every notification as read
    ReadAll,
    /// Push a live notification to yourself through the realtime channel
    Send {
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        #[arg(long = "type", default_value = "info")]
        notification_type: NotificationType,
    },
}

fn print_notifications(notifications: &[Notification]) {
    let now = Utc::now();
    let mut table = output::create_table();
    table.set_header(vec!["", "ID", "Type", "Title", "Message", "When"]);
    for n in notifications {
        let marker = if n.is_read { String::new() } else { "●".blue().to_string() };
        let kind = match n.notification_type {
            NotificationType::Success => n.notification_type.to_string().green(),
            NotificationType::Warning => n.notification_type.to_string().yellow(),
            NotificationType::Error => n.notification_type.to_string().red(),
            NotificationType::Info => n.notification_type.to_string().cyan(),
        };
        table.add_row(vec![
            marker,
            n.id.clone(),
            kind.to_string(),
            n.title.clone(),
            n.message.clone(),
            notification_age(n.created_at, now),
        ]);
    }
    println!("{}", table);
}

pub async fn run(command: NotificationCommands, offline: bool) -> Result<()> {
    let ctx = get_context(offline).await?;
    let user = signed_in_user(&ctx).await?;
    let mut center = ctx.notification_center();
    center.load(&user.id).await;

    match command {
        NotificationCommands::List {
            filter,
            notification_type,
            json,
        } => {
            let view = center.view(filter, notification_type);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }
            if view.is_empty() {
                println!("No notifications.");
                return Ok(());
            }
            print_notifications(&view);
            println!("{} unread", center.unread_count());
        }
        NotificationCommands::Read { id } => {
            center.mark_read(&id).await?;
            output::success(&format!("Marked {} as read", id));
        }
        NotificationCommands::Unread { id } => {
            center.mark_unread(&id).await?;
            output::success(&format!("Marked {} as unread", id));
        }
        NotificationCommands::Delete { id } => {
            center.delete(&id).await?;
        }
        NotificationCommands::ReadAll => {
            let marked = center.mark_all_read().await;
            println!("{} notifications marked as read", marked);
        }
        NotificationCommands::Send {
            title,
            message,
            notification_type,
        } => {
            center.subscribe().await;
            ctx.realtime
                .publish(
                    USER_NOTIFICATIONS,
                    NEW_NOTIFICATION,
                    json!({
                        "userId": user.id,
                        "title": title,
                        "message": message,
                        "type": notification_type,
                    }),
                )
                .await?;
            if let Some(Some(notification)) = center.next_event(&user).await {
                print_notifications(&[notification]);
            }
        }
    }

    Ok(())
}
