//! KYC wizard - identity verification in four steps
//!
//! personal -> document -> review -> complete, with explicit back moves
//! from document and review. Any other move is a validation error and
//! leaves the wizard where it was.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ids::kyc_id;
use crate::domain::result::{Error, Result};
use crate::domain::{
    AuthUser, DocumentSlot, DocumentType, DocumentsUploaded, KycRecord, KycStatus, KycStep,
    PersonalInfo, Toast, UploadedDocument,
};
use crate::ports::data_store::KYC_VERIFICATIONS;
use crate::ports::realtime::{KYC_SUBMISSIONS, NEW_SUBMISSION};
use crate::ports::{
    Collection, DataStore, ObjectStorage, ProgressFn, RealtimeBus, ToastSink, UploadFile,
    UploadOptions,
};

/// Storage prefix for identity documents
pub const DOCUMENT_PREFIX: &str = "kyc-documents";

pub fn document_path(user_id: &str, slot: DocumentSlot, millis: i64) -> String {
    format!("{}/{}/{}-{}", DOCUMENT_PREFIX, user_id, slot.as_str(), millis)
}

pub struct KycWizard {
    store: Arc<dyn DataStore>,
    storage: Arc<dyn ObjectStorage>,
    realtime: Arc<dyn RealtimeBus>,
    toasts: Arc<dyn ToastSink>,
    max_document_bytes: u64,

    step: KycStep,
    personal_info: PersonalInfo,
    document_type: Option<DocumentType>,
    front: Option<UploadedDocument>,
    back: Option<UploadedDocument>,
    selfie: Option<UploadedDocument>,
}

impl KycWizard {
    pub fn new(
        store: Arc<dyn DataStore>,
        storage: Arc<dyn ObjectStorage>,
        realtime: Arc<dyn RealtimeBus>,
        toasts: Arc<dyn ToastSink>,
        max_document_bytes: u64,
    ) -> Self {
        Self {
            store,
            storage,
            realtime,
            toasts,
            max_document_bytes,
            step: KycStep::Personal,
            personal_info: PersonalInfo::default(),
            document_type: None,
            front: None,
            back: None,
            selfie: None,
        }
    }

    pub fn step(&self) -> KycStep {
        self.step
    }

    pub fn progress(&self) -> u8 {
        self.step.progress()
    }

    pub fn personal_info(&self) -> &PersonalInfo {
        &self.personal_info
    }

    pub fn document_type(&self) -> Option<DocumentType> {
        self.document_type
    }

    pub fn document(&self, slot: DocumentSlot) -> Option<&UploadedDocument> {
        match slot {
            DocumentSlot::Front => self.front.as_ref(),
            DocumentSlot::Back => self.back.as_ref(),
            DocumentSlot::Selfie => self.selfie.as_ref(),
        }
    }

    pub fn documents_uploaded(&self) -> DocumentsUploaded {
        DocumentsUploaded {
            front: self.front.is_some(),
            back: self.back.is_some(),
            selfie: self.selfie.is_some(),
        }
    }

    pub fn set_personal_info(&mut self, info: PersonalInfo) {
        self.personal_info = info;
    }

    pub fn set_document_type(&mut self, document_type: DocumentType) {
        self.document_type = Some(document_type);
    }

    fn reject(&self, title: &str, description: &str) -> Error {
        self.toasts.show(Toast::error(title, description));
        Error::validation(description)
    }

    fn expect_step(&self, expected: KycStep, action: &str) -> Result<()> {
        if self.step != expected {
            return Err(self.reject(
                "Invalid Step",
                &format!("Cannot {} from the {} step", action, self.step),
            ));
        }
        Ok(())
    }

    /// personal -> document once every required field is filled
    pub fn submit_personal(&mut self) -> Result<()> {
        self.expect_step(KycStep::Personal, "submit personal details")?;
        let missing = self.personal_info.missing_fields();
        if !missing.is_empty() {
            warn!(missing = ?missing, "personal details incomplete");
            return Err(self.reject("Missing Information", "Please fill in all required fields"));
        }
        self.step = KycStep::Document;
        Ok(())
    }

    /// document -> personal, review -> document
    pub fn back(&mut self) -> Result<()> {
        self.step = match self.step {
            KycStep::Document => KycStep::Personal,
            KycStep::Review => KycStep::Document,
            other => {
                return Err(self.reject(
                    "Invalid Step",
                    &format!("Cannot go back from the {} step", other),
                ))
            }
        };
        Ok(())
    }

    /// Upload one document image into `slot`
    ///
    /// Type and size are checked before storage is contacted. On failure
    /// the slot keeps whatever it held before.
    pub async fn upload(
        &mut self,
        slot: DocumentSlot,
        file: UploadFile,
        user: Option<&AuthUser>,
        on_progress: Option<ProgressFn>,
    ) -> Result<UploadedDocument> {
        self.expect_step(KycStep::Document, "upload documents")?;
        let Some(user) = user else {
            self.toasts.show(Toast::error(
                "Authentication Required",
                "Please log in to upload documents",
            ));
            return Err(Error::Auth("Please log in to upload documents".to_string()));
        };
        if !file.is_image() {
            return Err(self.reject(
                "Invalid File Type",
                "Please upload an image file (JPG, PNG, etc.)",
            ));
        }
        if file.size() > self.max_document_bytes {
            let limit_mb = self.max_document_bytes / (1024 * 1024);
            return Err(self.reject(
                "File Too Large",
                &format!("Please upload an image smaller than {}MB", limit_mb),
            ));
        }

        let path = document_path(&user.id, slot, Utc::now().timestamp_millis());
        let options = UploadOptions {
            upsert: true,
            on_progress,
        };
        let uploaded = match self.storage.upload(&file, &path, options).await {
            Ok(result) => UploadedDocument {
                file_name: file.name.clone(),
                public_url: result.public_url,
            },
            Err(e) => {
                error!(error = %e, slot = slot.as_str(), "Upload error");
                self.toasts.show(Toast::error(
                    "Upload Failed",
                    "Failed to upload document. Please try again.",
                ));
                return Err(e);
            }
        };

        let target = match slot {
            DocumentSlot::Front => &mut self.front,
            DocumentSlot::Back => &mut self.back,
            DocumentSlot::Selfie => &mut self.selfie,
        };
        *target = Some(uploaded.clone());
        self.toasts.show(Toast::info(
            "Upload Successful",
            format!("{} document uploaded successfully", slot.label()),
        ));
        Ok(uploaded)
    }

    /// document -> review once the required images are in
    pub fn submit_documents(&mut self) -> Result<()> {
        self.expect_step(KycStep::Document, "submit documents")?;
        let document_type = match self.document_type {
            Some(t) if self.front.is_some() && self.selfie.is_some() => t,
            _ => {
                return Err(self.reject("Missing Documents", "Please upload all required documents"))
            }
        };
        if document_type.requires_back() && self.back.is_none() {
            return Err(self.reject(
                "Missing Document",
                "Please upload the back of your driver's license",
            ));
        }
        self.step = KycStep::Review;
        Ok(())
    }

    /// review -> complete: store the verification record and announce it
    ///
    /// A store failure keeps the wizard on review. A failed announcement
    /// is logged only.
    pub async fn submit(&mut self, user: Option<&AuthUser>) -> Result<KycRecord> {
        self.expect_step(KycStep::Review, "submit verification")?;
        let Some(user) = user else {
            self.toasts.show(Toast::error(
                "Authentication Required",
                "Please log in to submit verification",
            ));
            return Err(Error::Auth("Please log in to submit verification".to_string()));
        };
        let Some(document_type) = self.document_type else {
            return Err(self.reject("Missing Documents", "Please select a document type"));
        };

        let record = KycRecord {
            id: kyc_id(),
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            status: KycStatus::Pending,
            personal_info: self.personal_info.clone(),
            document_type,
            documents_uploaded: self.documents_uploaded(),
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            notes: None,
        };

        let records: Collection<KycRecord> = Collection::new(self.store.as_ref(), KYC_VERIFICATIONS);
        let stored = match records.create(&record).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "KYC submission error");
                self.toasts.show(Toast::error(
                    "Submission Failed",
                    "Failed to submit verification. Please try again.",
                ));
                return Err(e);
            }
        };
        info!(kyc_id = %stored.id, "verification submitted");

        let payload = json!({
            "userId": stored.user_id,
            "userEmail": stored.user_email,
            "submittedAt": stored.submitted_at,
        });
        if let Err(e) = self
            .realtime
            .publish(KYC_SUBMISSIONS, NEW_SUBMISSION, payload)
            .await
        {
            warn!(error = %e, "Failed to announce KYC submission");
        }

        self.step = KycStep::Complete;
        self.toasts.show(Toast::info(
            "Verification Submitted!",
            "Your documents have been submitted for review. You'll receive an update within 24-48 hours.",
        ));
        Ok(stored)
    }
}
