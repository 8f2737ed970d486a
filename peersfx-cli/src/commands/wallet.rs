//! Wallet command - balances and their total in one currency

use anyhow::{bail, Result};
use colored::Colorize;

use crate::output;
use peersfx_core::adapters::demo;
use peersfx_core::domain::currency::{is_valid_code, normalize_code};
use peersfx_core::domain::format_money;
use peersfx_core::domain::wallet::summarize;

pub fn run(currency: &str, json: bool) -> Result<()> {
    let currency = normalize_code(currency);
    if !is_valid_code(&currency) {
        bail!("Invalid currency code: {}", currency);
    }

    let balances = demo::wallet_balances();
    let summary = summarize(&balances, &currency);

    if json {
        println!(
            "{}",
            serde_json::json!({ "balances": balances, "summary": summary })
        );
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Currency", "Balance"]);
    for b in &balances {
        table.add_row(vec![b.currency.clone(), format!("{}{}", b.symbol, format_money(b.balance))]);
    }
    println!("{}", table);
    println!(
        "Total: {} {}",
        format_money(summary.total).bold(),
        summary.currency
    );
    if !summary.unconverted.is_empty() {
        output::warning(&format!(
            "No rate into {} for {}; not included",
            summary.currency,
            summary.unconverted.join(", ")
        ));
    }
    Ok(())
}
