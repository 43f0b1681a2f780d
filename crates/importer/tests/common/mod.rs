//! Shared fixtures: an in-memory record store and a scripted NBA source.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use importer::sources::balldontlie::{Cursor, Decoded, ExternalPlayer, ExternalTeam, TeamRef};
use importer::{ImporterError, NbaSource, Page, Result};
use storage::dto::player::PlayerRecord;
use storage::dto::team::TeamRecord;
use storage::models::{Player, Team};
use storage::{RecordStore, StorageError};
use validator::Validate;

#[derive(Default)]
struct Tables {
    teams: HashMap<i64, Team>,
    players: HashMap<i64, Player>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Record store backed by hash maps. Enforces the same uniqueness rules as
/// the Postgres schema: team abbreviation and external ids.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teams(&self) -> Vec<Team> {
        let mut teams: Vec<_> = self.tables.lock().unwrap().teams.values().cloned().collect();
        teams.sort_by_key(|t| t.id);
        teams
    }

    pub fn players(&self) -> Vec<Player> {
        let mut players: Vec<_> = self
            .tables
            .lock()
            .unwrap()
            .players
            .values()
            .cloned()
            .collect();
        players.sort_by_key(|p| p.id);
        players
    }

    pub fn player_by_external_id(&self, external_id: i64) -> Option<Player> {
        self.players()
            .into_iter()
            .find(|p| p.external_id == Some(external_id))
    }

    fn team_conflict(tables: &Tables, id: Option<i64>, record: &TeamRecord) -> bool {
        tables.teams.values().any(|t| {
            Some(t.id) != id
                && (t.abbreviation == record.abbreviation
                    || (record.external_id.is_some() && t.external_id == record.external_id))
        })
    }

    fn player_conflict(tables: &Tables, id: Option<i64>, record: &PlayerRecord) -> bool {
        record.external_id.is_some()
            && tables
                .players
                .values()
                .any(|p| Some(p.id) != id && p.external_id == record.external_id)
    }
}

fn team_row(id: i64, record: &TeamRecord) -> Team {
    let now = Utc::now();
    Team {
        id,
        external_id: record.external_id,
        abbreviation: record.abbreviation.clone(),
        name: record.name.clone(),
        full_name: record.full_name.clone(),
        city: record.city.clone(),
        conference: record.conference.map(|c| c.as_str().to_string()),
        division: record.division.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn player_row(id: i64, record: &PlayerRecord) -> Player {
    let now = Utc::now();
    Player {
        id,
        external_id: record.external_id,
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        position: record.position.clone(),
        height: record.height.clone(),
        weight: record.weight.clone(),
        jersey_number: record.jersey_number.clone(),
        college: record.college.clone(),
        country: record.country.clone(),
        draft_year: record.draft_year,
        draft_round: record.draft_round,
        draft_number: record.draft_number,
        team_id: record.team_id,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_team_by_external_id(&self, external_id: i64) -> storage::Result<Option<Team>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .teams
            .values()
            .find(|t| t.external_id == Some(external_id))
            .cloned())
    }

    async fn create_team(&self, record: &TeamRecord) -> storage::Result<Team> {
        record.validate()?;
        let mut tables = self.tables.lock().unwrap();
        if Self::team_conflict(&tables, None, record) {
            return Err(StorageError::ConstraintViolation(
                "Team abbreviation or external id already exists".to_string(),
            ));
        }
        let id = tables.next_id();
        let team = team_row(id, record);
        tables.teams.insert(id, team.clone());
        Ok(team)
    }

    async fn update_team(&self, id: i64, record: &TeamRecord) -> storage::Result<Team> {
        record.validate()?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.teams.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        if Self::team_conflict(&tables, Some(id), record) {
            return Err(StorageError::ConstraintViolation(
                "Team abbreviation or external id already exists".to_string(),
            ));
        }
        let team = team_row(id, record);
        tables.teams.insert(id, team.clone());
        Ok(team)
    }

    async fn find_player_by_external_id(
        &self,
        external_id: i64,
    ) -> storage::Result<Option<Player>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .players
            .values()
            .find(|p| p.external_id == Some(external_id))
            .cloned())
    }

    async fn create_player(&self, record: &PlayerRecord) -> storage::Result<Player> {
        record.validate()?;
        let mut tables = self.tables.lock().unwrap();
        if Self::player_conflict(&tables, None, record) {
            return Err(StorageError::ConstraintViolation(
                "Player external id already exists".to_string(),
            ));
        }
        let id = tables.next_id();
        let player = player_row(id, record);
        tables.players.insert(id, player.clone());
        Ok(player)
    }

    async fn update_player(&self, id: i64, record: &PlayerRecord) -> storage::Result<Player> {
        record.validate()?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.players.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        if Self::player_conflict(&tables, Some(id), record) {
            return Err(StorageError::ConstraintViolation(
                "Player external id already exists".to_string(),
            ));
        }
        let player = player_row(id, record);
        tables.players.insert(id, player.clone());
        Ok(player)
    }
}

/// Source that replays scripted responses and records the cursors it saw.
/// Once the player script runs out it returns an empty last page.
#[derive(Default)]
pub struct ScriptedSource {
    teams: Mutex<VecDeque<Result<Vec<ExternalTeam>>>>,
    players: Mutex<VecDeque<Result<Page<Decoded<ExternalPlayer>>>>>,
    cursors: Mutex<Vec<Option<String>>>,
    per_page: Mutex<Vec<u32>>,
    latency: Option<Duration>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_teams(self, teams: Vec<ExternalTeam>) -> Self {
        self.push_teams(Ok(teams));
        self
    }

    pub fn push_teams(&self, response: Result<Vec<ExternalTeam>>) {
        self.teams.lock().unwrap().push_back(response);
    }

    pub fn with_player_page(self, players: Vec<ExternalPlayer>, next_cursor: Option<&str>) -> Self {
        self.with_decoded_player_page(players.into_iter().map(Ok).collect(), next_cursor)
    }

    /// Page whose items may include records the source failed to decode
    pub fn with_decoded_player_page(
        self,
        players: Vec<Decoded<ExternalPlayer>>,
        next_cursor: Option<&str>,
    ) -> Self {
        self.players
            .lock()
            .unwrap()
            .push_back(Ok(Page::new(players, next_cursor.map(Cursor::new))));
        self
    }

    pub fn push_players(&self, response: Result<Page<ExternalPlayer>>) {
        let response = response
            .map(|page| Page::new(page.items.into_iter().map(Ok).collect(), page.next_cursor));
        self.players.lock().unwrap().push_back(response);
    }

    /// Every call sleeps this long before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn player_cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }

    pub fn player_page_sizes(&self) -> Vec<u32> {
        self.per_page.lock().unwrap().clone()
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl NbaSource for ScriptedSource {
    async fn fetch_teams(&self) -> Result<Vec<Decoded<ExternalTeam>>> {
        self.wait().await;
        let response = self
            .teams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        response.map(|teams| teams.into_iter().map(Ok).collect())
    }

    async fn fetch_players(
        &self,
        cursor: Option<&Cursor>,
        per_page: u32,
    ) -> Result<Page<Decoded<ExternalPlayer>>> {
        self.cursors
            .lock()
            .unwrap()
            .push(cursor.map(|c| c.as_str().to_string()));
        self.per_page.lock().unwrap().push(per_page);
        self.wait().await;
        self.players
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Page::last(Vec::new())))
    }
}

pub fn source_down(endpoint: &str) -> ImporterError {
    ImporterError::SourceUnavailable {
        endpoint: endpoint.to_string(),
        status: 503,
        body: "Service Unavailable".to_string(),
    }
}

pub fn team(id: i64, abbreviation: &str, name: &str, city: &str, conference: &str) -> ExternalTeam {
    ExternalTeam {
        id,
        conference: Some(conference.to_string()),
        division: Some("Atlantic".to_string()),
        city: Some(city.to_string()),
        name: Some(name.to_string()),
        full_name: Some(format!("{} {}", city, name)),
        abbreviation: Some(abbreviation.to_string()),
    }
}

pub fn sample_teams() -> Vec<ExternalTeam> {
    vec![
        team(1, "ATL", "Hawks", "Atlanta", "East"),
        team(2, "BOS", "Celtics", "Boston", "East"),
        team(14, "LAL", "Lakers", "Los Angeles", "West"),
    ]
}

pub fn player(id: i64, first_name: &str, last_name: &str, team_id: Option<i64>) -> ExternalPlayer {
    ExternalPlayer {
        id,
        first_name: Some(first_name.to_string()),
        last_name: Some(last_name.to_string()),
        position: Some("G".to_string()),
        height: Some("6-2".to_string()),
        weight: Some("185".to_string()),
        jersey_number: Some("30".to_string()),
        college: Some("Davidson".to_string()),
        country: Some("USA".to_string()),
        draft_year: Some(2009),
        draft_round: Some(1),
        draft_number: Some(7),
        team: team_id.map(|id| TeamRef { id: Some(id) }),
    }
}

pub fn players(ids: std::ops::RangeInclusive<i64>, team_id: Option<i64>) -> Vec<ExternalPlayer> {
    ids.map(|id| player(id, "Player", &format!("Number{}", id), team_id))
        .collect()
}
