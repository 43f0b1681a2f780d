use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Conference;

/// Full write shape of a team. Updates overwrite every column with these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TeamRecord {
    pub external_id: Option<i64>,

    #[validate(length(min = 1, max = 10, message = "Abbreviation must be between 1 and 10 characters"))]
    pub abbreviation: String,

    #[validate(length(max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 150, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(max = 100))]
    pub city: Option<String>,

    pub conference: Option<Conference>,

    #[validate(length(max = 50))]
    pub division: Option<String>,
}

/// Filters accepted by `TeamRepository::list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamFilter {
    pub division: Option<String>,
    pub conference: Option<Conference>,
}

impl TeamFilter {
    pub fn is_empty(&self) -> bool {
        self.division.is_none() && self.conference.is_none()
    }
}
