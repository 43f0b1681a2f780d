use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Conference;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: i64,
    pub external_id: Option<i64>,
    pub abbreviation: String,
    pub name: String,
    pub full_name: String,
    pub city: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Parsed conference. Rows outside the East/West check constraint read as `None`.
    pub fn conference(&self) -> Option<Conference> {
        self.conference.as_deref().and_then(|c| c.parse().ok())
    }
}
