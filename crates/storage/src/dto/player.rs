use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const MIN_DRAFT_YEAR: i32 = 1900;

/// Full write shape of a player. Updates overwrite every column with these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_draft_year"))]
pub struct PlayerRecord {
    pub external_id: Option<i64>,

    #[validate(length(max = 100))]
    pub first_name: String,

    #[validate(length(max = 100))]
    pub last_name: String,

    #[validate(length(max = 10))]
    pub position: Option<String>,

    #[validate(length(max = 10))]
    pub height: Option<String>,

    #[validate(length(max = 10))]
    pub weight: Option<String>,

    #[validate(length(max = 10))]
    pub jersey_number: Option<String>,

    #[validate(length(max = 100))]
    pub college: Option<String>,

    #[validate(length(max = 100))]
    pub country: Option<String>,

    pub draft_year: Option<i32>,
    pub draft_round: Option<i32>,
    pub draft_number: Option<i32>,

    pub team_id: Option<i64>,
}

/// Filters accepted by `PlayerRepository::list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerFilter {
    /// Matches first or last name, case-insensitive substring
    pub search: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// External ids of the teams players must belong to
    #[serde(default)]
    pub team_ids: Vec<i64>,
    /// External ids of the players themselves
    #[serde(default)]
    pub player_ids: Vec<i64>,
}

impl PlayerFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.team_ids.is_empty()
            && self.player_ids.is_empty()
    }
}

pub fn draft_year_in_range(year: i32, current_year: i32) -> bool {
    (MIN_DRAFT_YEAR..=current_year + 1).contains(&year)
}

fn validate_draft_year(record: &PlayerRecord) -> Result<(), ValidationError> {
    match record.draft_year {
        Some(year) if !draft_year_in_range(year, Utc::now().year()) => {
            let mut error = ValidationError::new("draft_year_out_of_range");
            error.message = Some(
                format!(
                    "Draft year must be between {} and next year, got {}",
                    MIN_DRAFT_YEAR, year
                )
                .into(),
            );
            Err(error)
        }
        _ => Ok(()),
    }
}
