//! Profile DTOs - Data Transfer Objects per il profilo utente

use crate::entities::Profile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Codici delle province e dei territori canadesi
pub const PROVINCE_CODES: [&str; 13] = [
    "AB", "BC", "MB", "NB", "NL", "NS", "NT", "NU", "ON", "PE", "QC", "SK", "YT",
];

pub fn validate_province(province: &str) -> Result<(), ValidationError> {
    if PROVINCE_CODES.contains(&province.to_ascii_uppercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("province")
            .with_message("Province must be a two-letter Canadian province or territory code".into()))
    }
}

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug)]
pub struct ProfileDTO {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub province: Option<String>,
    pub filing_status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileDTO {
    fn from(value: Profile) -> Self {
        Self {
            user_id: value.user_id,
            display_name: value.display_name,
            province: value.province,
            filing_status: value.filing_status,
            updated_at: value.updated_at,
        }
    }
}

/// DTO per creare o aggiornare il profilo (upsert)
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct UpsertProfileDTO {
    #[validate(length(min = 1, max = 100, message = "Display name must be between 1 and 100 characters"))]
    pub display_name: Option<String>,
    #[validate(custom(function = "validate_province"))]
    pub province: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Filing status must be between 1 and 50 characters"))]
    pub filing_status: Option<String>,
}
