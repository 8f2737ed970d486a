//! Admin command - the operator console
//!
//! Actions apply to this session's copy of the admin datasets. Platform
//! settings are the exception: `settings set` writes them to settings.json.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;

use super::get_context;
use crate::output;
use peersfx_core::domain::{format_money, AlertStatus, Severity};
use peersfx_core::services::admin::{report_file_name, OrderAction, OrderBook, UserAction};
use peersfx_core::OrderStatus;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Dashboard totals
    Overview {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List users
    Users {
        /// Search email or display name
        #[arg(short, long, default_value = "")]
        search: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply an action to a user (suspend, activate, verify, approve-kyc, reject-kyc)
    User { id: String, action: UserAction },
    /// List orders
    Orders {
        /// Search id, email or currency
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only this status
        #[arg(long)]
        status: Option<OrderStatus>,
        /// Write the listed orders to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply an action to an order (cancel, resolve-dispute, escalate-dispute)
    Order { id: String, action: OrderAction },
    /// Compliance alerts, newest first
    Alerts {
        /// Hide resolved and false-positive alerts
        #[arg(long)]
        open: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move an alert to a new status
    Alert { id: String, status: AlertStatus },
    /// Run the compliance rules against an order
    Screen { order_id: String },
    /// Export the compliance report as CSV
    Report {
        /// Directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Roles and their permissions
    Roles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a custom role
    RoleCreate {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma-separated permission ids
        #[arg(long, value_delimiter = ',')]
        permissions: Vec<String>,
    },
    /// Delete a custom role
    RoleDelete { id: String },
    /// Platform settings
    Settings {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a platform setting
    Set { key: String, value: String },
    /// Volume and activity summaries
    Analytics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Critical => severity.to_string().red().bold().to_string(),
        Severity::High => severity.to_string().red().to_string(),
        Severity::Medium => severity.to_string().yellow().to_string(),
        Severity::Low => severity.to_string(),
    }
}

pub async fn run(command: AdminCommands, offline: bool) -> Result<()> {
    let mut ctx = get_context(offline).await?;
    let mut console = ctx.admin_console();

    match command {
        AdminCommands::Overview { json } => {
            let overview = console.overview();
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
                return Ok(());
            }
            let mut table = output::create_table();
            table.add_row(vec!["Users", &overview.users.total.to_string()]);
            table.add_row(vec!["Verified", &overview.users.verified.to_string()]);
            table.add_row(vec!["Pending KYC", &overview.users.pending_kyc.to_string()]);
            table.add_row(vec!["Active orders", &overview.orders.active.to_string()]);
            table.add_row(vec!["Disputed orders", &overview.orders.disputed.to_string()]);
            table.add_row(vec!["Open alerts", &overview.open_alerts.to_string()]);
            println!("{}", table);
        }
        AdminCommands::Users { search, json } => {
            let users = console.users.search(&search);
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Email", "KYC", "Verified", "Active", "Orders", "Volume"]);
            for u in users {
                table.add_row(vec![
                    u.id.clone(),
                    u.display_name.clone(),
                    u.email.clone(),
                    u.kyc_status.to_string(),
                    if u.is_verified { "yes" } else { "no" }.to_string(),
                    if u.is_active { "yes" } else { "no" }.to_string(),
                    u.total_orders.to_string(),
                    format_money(u.total_volume),
                ]);
            }
            println!("{}", table);
        }
        AdminCommands::User { id, action } => {
            let user = console.users.apply(&id, action)?;
            output::success(&format!(
                "{}: {} (kyc {}, {})",
                action,
                user.email,
                user.kyc_status,
                if user.is_active { "active" } else { "suspended" }
            ));
        }
        AdminCommands::Orders {
            search,
            status,
            export,
            json,
        } => {
            let orders = console.orders.search(&search, status);
            if let Some(path) = export {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("Failed to create {:?}", path))?;
                OrderBook::export_csv(&orders, file)?;
                output::success(&format!("Exported {} orders to {}", orders.len(), path.display()));
                return Ok(());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&orders)?);
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "User", "Type", "Pair", "Amount", "Total", "Status", "Payment"]);
            for o in orders {
                table.add_row(vec![
                    o.id.clone(),
                    o.user_email.clone().unwrap_or_default(),
                    o.order_type.to_string(),
                    format!("{} → {}", o.from_currency, o.to_currency),
                    format_money(o.amount),
                    format_money(o.total_amount),
                    o.status.to_string(),
                    o.payment_method.clone().unwrap_or_default(),
                ]);
            }
            println!("{}", table);
        }
        AdminCommands::Order { id, action } => {
            let order = console.orders.apply(&id, action)?;
            output::success(&format!("{}: {} is now {}", action, order.id, order.status));
        }
        AdminCommands::Alerts { open, json } => {
            let alerts = if open {
                console.compliance.open_alerts()
            } else {
                console.compliance.alerts()
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&alerts)?);
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Severity", "Type", "Title", "User", "Status", "Raised"]);
            for a in alerts {
                table.add_row(vec![
                    a.id.clone(),
                    severity_label(a.severity),
                    a.alert_type.as_str().to_string(),
                    a.title.clone(),
                    a.user_id.clone().unwrap_or_default(),
                    a.status.to_string(),
                    a.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                ]);
            }
            println!("{}", table);
        }
        AdminCommands::Alert { id, status } => {
            let alert = console.compliance.set_status(&id, status)?;
            output::success(&format!("Alert {} is now {}", alert.id, alert.status));
        }
        AdminCommands::Screen { order_id } => {
            let raised = console.screen_order(&order_id)?;
            if raised.is_empty() {
                output::success(&format!("Order {} passed every check", order_id));
            }
            for alert in raised {
                println!(
                    "{} {}: {}",
                    severity_label(alert.severity),
                    alert.title.bold(),
                    alert.description
                );
            }
        }
        AdminCommands::Report { dir } => {
            let path = dir.join(report_file_name("Compliance", Utc::now()));
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {:?}", path))?;
            console.compliance.export_csv(file)?;
            output::success(&format!("Report written to {}", path.display()));
        }
        AdminCommands::Roles { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(console.roles.roles())?);
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "Users", "Permissions", "System"]);
            for r in console.roles.roles() {
                table.add_row(vec![
                    r.id.clone(),
                    r.name.clone(),
                    r.user_count.to_string(),
                    r.permissions.join(", "),
                    if r.is_system { "yes" } else { "" }.to_string(),
                ]);
            }
            println!("{}", table);

            println!();
            for (category, permissions) in console.roles.permissions_by_category() {
                println!("{}", category.bold());
                for p in permissions {
                    println!("  {:<20} {}", p.id, p.description.dimmed());
                }
            }
        }
        AdminCommands::RoleCreate {
            name,
            description,
            permissions,
        } => {
            let role = console.roles.create_role(&name, &description, permissions)?;
            output::success(&format!("Created role {} ({})", role.name, role.id));
        }
        AdminCommands::RoleDelete { id } => {
            let role = console.roles.delete_role(&id)?;
            output::success(&format!("Deleted role {}", role.name));
        }
        AdminCommands::Settings { json } => {
            let settings = console.settings.settings();
            if json {
                println!("{}", serde_json::to_string_pretty(settings)?);
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["Key", "Value", "Type", "Description"]);
            for s in settings {
                table.add_row(vec![
                    s.key.clone(),
                    s.value.clone(),
                    s.kind.as_str().to_string(),
                    s.description.clone(),
                ]);
            }
            println!("{}", table);
        }
        AdminCommands::Set { key, value } => {
            console.settings.update(&key, &value)?;
            if console.settings.has_changes() {
                ctx.config.platform = console.settings.save();
                ctx.config.save(&ctx.data_dir)?;
                output::success(&format!("{} = {}", key, value));
            } else {
                output::info(&format!("{} already {}", key, value));
            }
        }
        AdminCommands::Analytics { json } => {
            let summary = console.analytics();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }
            println!("{}", "Volume by currency".bold());
            let mut volume = output::create_table();
            volume.set_header(vec!["Currency", "Volume", "Orders"]);
            for v in &summary.volume_by_currency {
                volume.add_row(vec![v.currency.clone(), format_money(v.volume), v.orders.to_string()]);
            }
            println!("{}", volume);

            println!("{}", "Orders by status".bold());
            for (status, count) in &summary.orders_by_status {
                println!("  {:<10} {}", status.to_string(), count);
            }

            println!("{}", "Top traders".bold());
            for (rank, u) in summary.top_users.iter().enumerate() {
                println!("  {}. {} {}", rank + 1, u.user_name, format_money(u.volume));
            }
        }
    }

    Ok(())
}
