//! KYC (identity verification) domain models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::KycStatus;

/// Default ceiling for a single document image
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Wizard step. Strictly linear apart from the two explicit back moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStep {
    Personal,
    Document,
    Review,
    Complete,
}

impl KycStep {
    /// Progress bar percentage
    pub fn progress(&self) -> u8 {
        match self {
            KycStep::Personal => 25,
            KycStep::Document => 50,
            KycStep::Review => 75,
            KycStep::Complete => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KycStep::Personal => "personal",
            KycStep::Document => "document",
            KycStep::Review => "review",
            KycStep::Complete => "complete",
        }
    }
}

impl fmt::Display for KycStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applicant details collected on the first step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub postal_code: String,
}

impl PersonalInfo {
    /// Names of required fields that are empty. Postal code is optional.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("dateOfBirth", &self.date_of_birth),
            ("phoneNumber", &self.phone_number),
            ("address", &self.address),
            ("city", &self.city),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    DriversLicense,
    NationalId,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Passport => "passport",
            DocumentType::DriversLicense => "drivers_license",
            DocumentType::NationalId => "national_id",
        }
    }

    /// Only a driver's license needs the back side
    pub fn requires_back(&self) -> bool {
        matches!(self, DocumentType::DriversLicense)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "passport" => Ok(DocumentType::Passport),
            "drivers_license" => Ok(DocumentType::DriversLicense),
            "national_id" => Ok(DocumentType::NationalId),
            other => Err(format!("unknown document type: {}", other)),
        }
    }
}

/// Which image a file upload fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSlot {
    Front,
    Back,
    Selfie,
}

impl DocumentSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSlot::Front => "front",
            DocumentSlot::Back => "back",
            DocumentSlot::Selfie => "selfie",
        }
    }

    /// "Front", "Back", "Selfie"
    pub fn label(&self) -> &'static str {
        match self {
            DocumentSlot::Front => "Front",
            DocumentSlot::Back => "Back",
            DocumentSlot::Selfie => "Selfie",
        }
    }
}

impl FromStr for DocumentSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "front" => Ok(DocumentSlot::Front),
            "back" => Ok(DocumentSlot::Back),
            "selfie" => Ok(DocumentSlot::Selfie),
            other => Err(format!("unknown document slot: {}", other)),
        }
    }
}

/// A document image that made it into object storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub file_name: String,
    pub public_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsUploaded {
    pub front: bool,
    pub back: bool,
    pub selfie: bool,
}

/// The verification record handed to the data store on final submit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycRecord {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub status: KycStatus,
    pub personal_info: PersonalInfo,
    pub document_type: DocumentType,
    pub documents_uploaded: DocumentsUploaded,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_ignores_postal_code() {
        let info = PersonalInfo {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            date_of_birth: "1815-12-10".into(),
            phone_number: "+44-20-0000".into(),
            address: "12 St James's Square".into(),
            city: "London".into(),
            country: "United Kingdom".into(),
            postal_code: String::new(),
        };
        assert!(info.missing_fields().is_empty());

        let empty = PersonalInfo::default();
        assert_eq!(empty.missing_fields().len(), 7);
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let info = PersonalInfo {
            first_name: "  ".into(),
            ..Default::default()
        };
        assert!(info.missing_fields().contains(&"firstName"));
    }

    #[test]
    fn test_document_type_serde() {
        let json = serde_json::to_value(DocumentType::DriversLicense).unwrap();
        assert_eq!(json, "drivers_license");
        assert!(DocumentType::DriversLicense.requires_back());
        assert!(!DocumentType::Passport.requires_back());
    }

    #[test]
    fn test_step_progress() {
        assert_eq!(KycStep::Personal.progress(), 25);
        assert_eq!(KycStep::Complete.progress(), 100);
    }
}
