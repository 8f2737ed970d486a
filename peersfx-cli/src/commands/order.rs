//! Order command - quote and post exchange orders

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use super::{get_context, get_logger, log_event, signed_in_user};
use crate::output;
use peersfx_core::domain::currency::{normalize_code, quoted_pairs, CURRENCIES};
use peersfx_core::services::OrderForm;
use peersfx_core::{LogEvent, OperationResult, OrderType};

#[derive(Args)]
pub struct OrderArgs {
    /// Currency you give
    #[arg(long)]
    from: String,
    /// Currency you receive
    #[arg(long)]
    to: String,
    /// Amount in the `from` currency
    #[arg(long)]
    amount: String,
    /// Custom rate instead of the market rate
    #[arg(long)]
    rate: Option<String>,
}

impl OrderArgs {
    fn form(&self, order_type: OrderType) -> OrderForm {
        let form = OrderForm::new(
            order_type,
            &normalize_code(&self.from),
            &normalize_code(&self.to),
            &self.amount,
        );
        match &self.rate {
            Some(rate) => form.with_custom_rate(rate),
            None => form,
        }
    }
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Show the rate and total for an order without posting it
    Quote {
        #[command(flatten)]
        args: OrderArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Post an order to the marketplace
    Create {
        /// buy or sell
        #[arg(long = "type", default_value = "sell")]
        order_type: OrderType,
        #[command(flatten)]
        args: OrderArgs,
        /// Notes shown to other traders
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List supported currencies and quoted market rates
    Currencies,
}

pub async fn run(command: OrderCommands, offline: bool) -> Result<()> {
    match command {
        OrderCommands::Quote { args, json } => {
            let form = args.form(OrderType::Sell);
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "from": form.from_currency,
                        "to": form.to_currency,
                        "rate": form.effective_rate(),
                        "total": form.total_display(),
                        "marketRate": form.use_market_rate,
                    })
                );
                return Ok(());
            }
            let source = if form.use_market_rate { "market" } else { "custom" };
            println!(
                "{} {} → {} {} ({} rate {})",
                args.amount,
                form.from_currency,
                form.total_display().bold(),
                form.to_currency,
                source,
                form.effective_rate()
            );
        }
        OrderCommands::Create {
            order_type,
            args,
            notes,
            json,
        } => {
            let ctx = get_context(offline).await?;
            let user = signed_in_user(&ctx).await?;
            let mut form = args.form(order_type);
            if let Some(notes) = notes {
                form = form.with_notes(&notes);
            }

            let result = ctx.order_form().submit(&form, Some(&user)).await;
            if result.is_ok() {
                log_event(&get_logger(), LogEvent::new("order_created").with_component("order_form"));
            }
            if json {
                let failed = result.is_err();
                println!("{}", serde_json::to_string_pretty(&OperationResult::from(result))?);
                if failed {
                    bail!("Order was not created");
                }
                return Ok(());
            }
            let order = result?;
            output::success(&format!("Posted order {}", order.id));
        }
        OrderCommands::Currencies => {
            let mut table = output::create_table();
            table.set_header(vec!["Code", "Name", "Symbol"]);
            for c in CURRENCIES {
                table.add_row(vec![c.code, c.name, c.symbol]);
            }
            println!("{}", table);

            let mut rates = output::create_table();
            rates.set_header(vec!["Pair", "Rate"]);
            for (from, to, rate) in quoted_pairs() {
                rates.add_row(vec![format!("{} → {}", from, to), rate.to_string()]);
            }
            println!("{}", rates);
        }
    }

    Ok(())
}
