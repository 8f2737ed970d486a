//! KYC command - walk through identity verification

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use super::{get_context, get_logger, log_event, signed_in_user};
use crate::output;
use peersfx_core::domain::{DocumentSlot, DocumentType, PersonalInfo};
use peersfx_core::ports::{ProgressFn, UploadFile};
use peersfx_core::services::KycWizard;
use peersfx_core::{AuthUser, LogEvent};

#[derive(Args)]
pub struct KycArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    date_of_birth: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    country: String,
    #[arg(long, default_value = "")]
    postal_code: String,
    /// passport, drivers_license or national_id
    #[arg(long)]
    document_type: DocumentType,
    /// Image of the document front
    #[arg(long)]
    front: PathBuf,
    /// Image of the document back (driver's license only)
    #[arg(long)]
    back: Option<PathBuf>,
    /// Selfie holding the document
    #[arg(long)]
    selfie: PathBuf,
    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl KycArgs {
    fn personal_info(&self) -> PersonalInfo {
        PersonalInfo {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth.clone(),
            phone_number: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            postal_code: self.postal_code.clone(),
        }
    }
}

fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}


fn progress_bar(label: &str, quiet: bool) -> Result<(ProgressBar, ProgressFn)> {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(100)
    };
    bar.set_style(ProgressStyle::with_template("{msg:>8} [{bar:30}] {pos:>3}%")?.progress_chars("=> "));
    bar.set_message(label.to_string());
    let handle = bar.clone();
    let on_progress: ProgressFn = Arc::new(move |pct: u8| handle.set_position(u64::from(pct)));
    Ok((bar, on_progress))
}

async fn upload(
    wizard: &mut KycWizard,
    slot: DocumentSlot,
    path: &Path,
    user: &AuthUser,
    max_bytes: u64,
    quiet: bool,
) -> Result<()> {
    let file = UploadFile::read(path, mime_type(path), max_bytes)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let size = file.size();
    let (bar, on_progress) = progress_bar(slot.as_str(), quiet)?;
    let result = wizard.upload(slot, file, Some(user), Some(on_progress)).await;
    bar.finish_and_clear();
    result?;
    if !quiet {
        println!("  {} {} ({})", "✓".green(), slot.label(), output::format_size(size));
    }
    Ok(())
}

pub async fn run(args: KycArgs, offline: bool) -> Result<()> {
    let ctx = get_context(offline).await?;
    let user = signed_in_user(&ctx).await?;
    let mut wizard = ctx.kyc_wizard();
    let max_bytes = ctx.config.kyc.max_document_bytes;

    wizard.set_personal_info(args.personal_info());
    wizard.submit_personal()?;
    wizard.set_document_type(args.document_type);

    upload(&mut wizard, DocumentSlot::Front, &args.front, &user, max_bytes, args.json).await?;
    if let Some(back) = &args.back {
        upload(&mut wizard, DocumentSlot::Back, back, &user, max_bytes, args.json).await?;
    }
    upload(&mut wizard, DocumentSlot::Selfie, &args.selfie, &user, max_bytes, args.json).await?;
    wizard.submit_documents()?;

    if !args.yes && !args.json {
        println!();
        println!("{}", "Review".bold());
        println!("  Name: {} {}", args.first_name, args.last_name);
        println!("  Document: {}", args.document_type);
        let proceed = Confirm::new()
            .with_prompt("Submit for verification?")
            .default(true)
            .interact()?;
        if !proceed {
            bail!("Verification not submitted");
        }
    }

    let logger = get_logger();
    let record = match wizard.submit(Some(&user)).await {
        Ok(record) => {
            log_event(&logger, LogEvent::new("kyc_submitted").with_component("kyc"));
            record
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("kyc_submit_failed")
                    .with_component("kyc")
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        output::success(&format!("Verification {} submitted ({})", record.id, record.status));
    }
    Ok(())
}
