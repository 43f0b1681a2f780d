//! Maps BallDontLie records onto the store's write records.
//!
//! Absent or blank optional fields stay `None`. Missing required fields fail
//! only the record being transformed.

use storage::dto::player::PlayerRecord;
use storage::dto::team::TeamRecord;
use storage::models::Conference;

use super::models::{ExternalPlayer, ExternalTeam};
use crate::{ImporterError, Result};

pub fn transform_team(team: &ExternalTeam) -> Result<TeamRecord> {
    let conference = present(&team.conference)
        .map(|c| c.parse::<Conference>())
        .transpose()
        .map_err(|e| ImporterError::TransformationError(format!("Team {}: {}", team.id, e)))?;

    Ok(TeamRecord {
        external_id: Some(team.id),
        abbreviation: required(&team.abbreviation, "team", team.id, "abbreviation")?,
        name: required(&team.name, "team", team.id, "name")?,
        full_name: required(&team.full_name, "team", team.id, "full_name")?,
        city: present(&team.city),
        conference,
        division: present(&team.division),
    })
}

/// `team_id` is the internal id of the player's team, already resolved by the caller
pub fn transform_player(player: &ExternalPlayer, team_id: Option<i64>) -> Result<PlayerRecord> {
    Ok(PlayerRecord {
        external_id: Some(player.id),
        first_name: required(&player.first_name, "player", player.id, "first_name")?,
        last_name: required(&player.last_name, "player", player.id, "last_name")?,
        position: present(&player.position),
        height: present(&player.height),
        weight: present(&player.weight),
        jersey_number: present(&player.jersey_number),
        college: present(&player.college),
        country: present(&player.country),
        draft_year: player.draft_year,
        draft_round: player.draft_round,
        draft_number: player.draft_number,
        team_id,
    })
}

/// Optional text with whitespace-only values treated as absent
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(value: &Option<String>, entity: &str, id: i64, field: &str) -> Result<String> {
    value.clone().ok_or_else(|| {
        ImporterError::TransformationError(format!(
            "{} {} is missing required field '{}'",
            entity, id, field
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn celtics() -> ExternalTeam {
        ExternalTeam {
            id: 2,
            conference: Some("East".to_string()),
            division: Some("Atlantic".to_string()),
            city: Some("Boston".to_string()),
            name: Some("Celtics".to_string()),
            full_name: Some("Boston Celtics".to_string()),
            abbreviation: Some("BOS".to_string()),
        }
    }

    fn lebron() -> ExternalPlayer {
        ExternalPlayer {
            id: 237,
            first_name: Some("LeBron".to_string()),
            last_name: Some("James".to_string()),
            position: Some("F".to_string()),
            height: Some("6-9".to_string()),
            weight: Some("250".to_string()),
            jersey_number: Some("23".to_string()),
            college: Some("St. Vincent-St. Mary HS".to_string()),
            country: Some("USA".to_string()),
            draft_year: Some(2003),
            draft_round: Some(1),
            draft_number: Some(1),
            team: None,
        }
    }

    #[test]
    fn test_transform_team() {
        let record = transform_team(&celtics()).unwrap();

        assert_eq!(record.external_id, Some(2));
        assert_eq!(record.name, "Celtics");
        assert_eq!(record.full_name, "Boston Celtics");
        assert_eq!(record.city.as_deref(), Some("Boston"));
        assert_eq!(record.conference, Some(Conference::East));
    }

    #[test]
    fn test_transform_team_keeps_absent_fields_unset() {
        let team = ExternalTeam {
            conference: None,
            division: None,
            city: None,
            ..celtics()
        };
        let record = transform_team(&team).unwrap();

        assert!(record.conference.is_none());
        assert!(record.division.is_none());
        assert!(record.city.is_none());
    }

    #[test]
    fn test_transform_team_missing_abbreviation() {
        let team = ExternalTeam {
            abbreviation: None,
            ..celtics()
        };
        let err = transform_team(&team).unwrap_err();
        assert!(err.to_string().contains("abbreviation"));
    }

    #[test]
    fn test_transform_team_rejects_unknown_conference() {
        let team = ExternalTeam {
            conference: Some("Central".to_string()),
            ..celtics()
        };
        assert!(matches!(
            transform_team(&team),
            Err(ImporterError::TransformationError(_))
        ));
    }

    #[test]
    fn test_transform_player_with_team() {
        let record = transform_player(&lebron(), Some(5)).unwrap();

        assert_eq!(record.external_id, Some(237));
        assert_eq!(record.first_name, "LeBron");
        assert_eq!(record.last_name, "James");
        assert_eq!(record.draft_year, Some(2003));
        assert_eq!(record.team_id, Some(5));
    }

    #[test]
    fn test_transform_player_with_null_fields() {
        let player = ExternalPlayer {
            position: None,
            height: None,
            weight: None,
            jersey_number: None,
            college: None,
            country: None,
            draft_year: None,
            draft_round: None,
            draft_number: None,
            ..lebron()
        };
        let record = transform_player(&player, None).unwrap();

        assert!(record.position.is_none());
        assert!(record.height.is_none());
        assert!(record.draft_year.is_none());
        assert!(record.team_id.is_none());
    }

    #[test]
    fn test_transform_player_requires_last_name() {
        let player = ExternalPlayer {
            last_name: None,
            ..lebron()
        };
        assert!(transform_player(&player, None).is_err());
    }

    #[test]
    fn test_transform_team_treats_blank_fields_as_absent() {
        let stags = ExternalTeam {
            id: 37,
            conference: Some(" ".to_string()),
            division: Some(" ".to_string()),
            city: Some("Chicago".to_string()),
            name: Some("Stags".to_string()),
            full_name: Some("Chicago Stags".to_string()),
            abbreviation: Some("CHS".to_string()),
        };
        let record = transform_team(&stags).unwrap();

        assert_eq!(record.abbreviation, "CHS");
        assert!(record.conference.is_none());
        assert!(record.division.is_none());
        assert_eq!(record.city.as_deref(), Some("Chicago"));
    }

    #[test]
    fn test_transform_player_treats_blank_fields_as_absent() {
        let player = ExternalPlayer {
            college: Some(String::new()),
            jersey_number: Some("  ".to_string()),
            ..lebron()
        };
        let record = transform_player(&player, None).unwrap();

        assert!(record.college.is_none());
        assert!(record.jersey_number.is_none());
        assert_eq!(record.position.as_deref(), Some("F"));
    }
}
