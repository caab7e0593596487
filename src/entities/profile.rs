//! Profile entity - Profilo dell'utente (l'identità vive in Supabase Auth)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    // codice a due lettere (ON, QC, BC, ...)
    pub province: Option<String>,
    pub filing_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
