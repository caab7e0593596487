//! Query DTOs - Data Transfer Objects per query di ricerca

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DTO per query parameters di paginazione messaggi
#[derive(Serialize, Deserialize, Debug)]
pub struct MessagesQuery {
    #[serde(default)]
    pub before: Option<DateTime<Utc>>,
}
