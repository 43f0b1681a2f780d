use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque pagination token, forwarded verbatim to fetch the next page.
/// BallDontLie sends it as a number; strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCursor")]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCursor {
    Number(i64),
    Text(String),
}

impl From<RawCursor> for Cursor {
    fn from(raw: RawCursor) -> Self {
        match raw {
            RawCursor::Number(n) => Self(n.to_string()),
            RawCursor::Text(s) => Self(s),
        }
    }
}

/// Response body. Items stay raw so one bad record cannot sink its page.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub data: Option<Vec<serde_json::Value>>,
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PageMeta {
    pub next_cursor: Option<Cursor>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExternalTeam {
    pub id: i64,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub city: Option<String>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExternalPlayer {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub jersey_number: Option<String>,
    pub college: Option<String>,
    pub country: Option<String>,
    pub draft_year: Option<i32>,
    pub draft_round: Option<i32>,
    pub draft_number: Option<i32>,
    pub team: Option<TeamRef>,
}

impl ExternalPlayer {
    /// External id of the player's team, if the source sent a usable one
    pub fn team_external_id(&self) -> Option<i64> {
        self.team.as_ref().and_then(|t| t.id).filter(|id| *id != 0)
    }

    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

/// A `data` item that did not match the expected record shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{entity} {} does not match the expected shape: {reason}",
    .id.map_or_else(|| "without id".to_string(), |id| id.to_string())
)]
pub struct InvalidRecord {
    pub entity: &'static str,
    pub id: Option<i64>,
    pub reason: String,
}

/// One item from a page: the decoded record or why it could not be decoded
pub type Decoded<T> = std::result::Result<T, InvalidRecord>;

pub(crate) fn decode_items<T: DeserializeOwned>(
    entity: &'static str,
    items: Vec<serde_json::Value>,
) -> Vec<Decoded<T>> {
    items
        .into_iter()
        .map(|item| {
            let id = item.get("id").and_then(serde_json::Value::as_i64);
            serde_json::from_value(item).map_err(|e| InvalidRecord {
                entity,
                id,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// The nested team object on a player. Only the id matters for reconciliation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TeamRef {
    pub id: Option<i64>,
}
