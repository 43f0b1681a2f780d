//! The record store boundary the importer drives.
//!
//! Identity for imported rows is the external id assigned by the upstream
//! source. Every method is its own atomic unit; nothing here spans records.

use async_trait::async_trait;

use crate::Database;
use crate::dto::player::PlayerRecord;
use crate::dto::team::TeamRecord;
use crate::error::Result;
use crate::models::{Player, Team};
use crate::repository::{PlayerRepository, TeamRepository};

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_team_by_external_id(&self, external_id: i64) -> Result<Option<Team>>;

    async fn create_team(&self, record: &TeamRecord) -> Result<Team>;

    async fn update_team(&self, id: i64, record: &TeamRecord) -> Result<Team>;

    async fn find_player_by_external_id(&self, external_id: i64) -> Result<Option<Player>>;

    async fn create_player(&self, record: &PlayerRecord) -> Result<Player>;

    async fn update_player(&self, id: i64, record: &PlayerRecord) -> Result<Player>;
}

/// Postgres-backed store built on the repositories
#[derive(Clone)]
pub struct PgRecordStore {
    db: Database,
}

impl PgRecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_team_by_external_id(&self, external_id: i64) -> Result<Option<Team>> {
        TeamRepository::new(self.db.pool())
            .find_by_external_id(external_id)
            .await
    }

    async fn create_team(&self, record: &TeamRecord) -> Result<Team> {
        TeamRepository::new(self.db.pool()).create(record).await
    }

    async fn update_team(&self, id: i64, record: &TeamRecord) -> Result<Team> {
        TeamRepository::new(self.db.pool()).update(id, record).await
    }

    async fn find_player_by_external_id(&self, external_id: i64) -> Result<Option<Player>> {
        PlayerRepository::new(self.db.pool())
            .find_by_external_id(external_id)
            .await
    }

    async fn create_player(&self, record: &PlayerRecord) -> Result<Player> {
        PlayerRepository::new(self.db.pool()).create(record).await
    }

    async fn update_player(&self, id: i64, record: &PlayerRecord) -> Result<Player> {
        PlayerRepository::new(self.db.pool()).update(id, record).await
    }
}
