//! Market command - browse and match marketplace orders

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;

use super::{get_context, get_logger, log_event, signed_in_user};
use crate::output;
use peersfx_core::domain::currency::normalize_code;
use peersfx_core::domain::format_money;
use peersfx_core::services::marketplace::time_ago;
use peersfx_core::services::{LoadOutcome, MarketFilter, SortKey};
use peersfx_core::{LogEvent, Order, OrderType};

#[derive(Subcommand)]
pub enum MarketCommands {
    /// List active orders
    List {
        /// Search by user name or currency
        #[arg(short, long)]
        search: Option<String>,
        /// Only buy or sell orders
        #[arg(long = "type")]
        order_type: Option<OrderType>,
        /// Only orders with this currency on either side
        #[arg(long)]
        currency: Option<String>,
        /// Sort by newest, rate or amount
        #[arg(long, default_value = "newest")]
        sort: SortKey,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Match an active order
    Match {
        /// Order ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start a conversation with an order's owner
    Contact {
        /// Order ID
        id: String,
    },
}

fn print_orders(orders: &[Order]) {
    let now = Utc::now();
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Trader", "Type", "Pair", "Amount", "Rate", "Total", "Posted"]);

    for order in orders {
        let kind = match order.order_type {
            OrderType::Buy => "buy".green().to_string(),
            OrderType::Sell => "sell".red().to_string(),
        };
        let trader = match order.user_rating {
            Some(rating) => format!("{} ({})", order.user_name, rating),
            None => order.user_name.clone(),
        };
        table.add_row(vec![
            order.id.clone(),
            trader,
            kind,
            format!("{} → {}", order.from_currency, order.to_currency),
            order.amount.to_string(),
            order.rate.to_string(),
            format_money(order.total_amount),
            time_ago(order.created_at, now),
        ]);
    }
    println!("{}", table);
}

pub async fn run(command: MarketCommands, offline: bool) -> Result<()> {
    let ctx = get_context(offline).await?;
    let mut market = ctx.marketplace();
    let outcome = market.load().await;

    match command {
        MarketCommands::List {
            search,
            order_type,
            currency,
            sort,
            json,
        } => {
            let mut filter = MarketFilter::default().sort_by(sort);
            if let Some(term) = search {
                filter = filter.search(term);
            }
            if let Some(kind) = order_type {
                filter = filter.order_type(kind);
            }
            if let Some(code) = currency {
                filter = filter.currency(normalize_code(&code));
            }
            let orders = market.view(&filter);

            if json {
                println!("{}", serde_json::to_string_pretty(&orders)?);
                return Ok(());
            }
            if orders.is_empty() {
                println!("No orders found.");
                if let LoadOutcome::Loaded(0) = outcome {
                    println!("Run 'pfx demo on' to load sample orders.");
                }
                return Ok(());
            }
            print_orders(&orders);
            println!("{} of {} orders", orders.len(), market.orders().len());
        }
        MarketCommands::Match { id, json } => {
            let user = signed_in_user(&ctx).await?;
            let order = market.match_order(&id, &user).await?;
            log_event(&get_logger(), LogEvent::new("order_matched").with_component("marketplace"));
            if json {
                println!("{}", serde_json::to_string_pretty(&order)?);
            } else {
                output::success(&format!("Matched order {}", order.id));
            }
        }
        MarketCommands::Contact { id } => {
            market
                .contact(&id)
                .map_err(|e| anyhow!("Cannot contact owner of {}: {}", id, e))?;
        }
    }

    Ok(())
}
