use storage::RecordStore;
use tracing::debug;

use crate::sources::balldontlie::{ExternalPlayer, ExternalTeam, transform_player, transform_team};
use crate::{ImporterError, Result};

/// Result of reconciling one record, carrying the internal id it landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created(i64),
    Updated(i64),
}

/// Counters for one run. Threaded by value through the runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub created: u64,
    pub updated: u64,
    pub failed: u64,
    /// Records handed to the reconciler, failures included
    pub processed: u64,
    /// Records returned by the source
    pub fetched: u64,
    /// Page fetches issued
    pub requests: u64,
}

impl ImportStats {
    pub fn absorb(mut self, result: &Result<Outcome>) -> Self {
        match result {
            Ok(Outcome::Created(_)) => self.created += 1,
            Ok(Outcome::Updated(_)) => self.updated += 1,
            Err(_) => self.failed += 1,
        }
        self.processed += 1;
        self
    }

    pub fn limit_reached(&self, limit: Option<u64>) -> bool {
        limit.is_some_and(|limit| self.processed >= limit)
    }
}

/// Create-or-update decisions keyed on external id. Names are never used
/// for matching.
pub struct Reconciler<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    pub async fn reconcile_team(&self, team: &ExternalTeam) -> Result<Outcome> {
        let record = transform_team(team)?;

        let existing = self
            .store
            .find_team_by_external_id(team.id)
            .await
            .map_err(ImporterError::from_store)?;

        match existing {
            Some(existing) => {
                self.store
                    .update_team(existing.id, &record)
                    .await
                    .map_err(ImporterError::from_store)?;
                debug!("Updated team {} (external id {})", existing.id, team.id);
                Ok(Outcome::Updated(existing.id))
            }
            None => {
                let created = self
                    .store
                    .create_team(&record)
                    .await
                    .map_err(ImporterError::from_store)?;
                debug!("Created team {} (external id {})", created.id, team.id);
                Ok(Outcome::Created(created.id))
            }
        }
    }

    /// Internal id of the team with this external id. An absent, zero or
    /// unmatched id all resolve to no team.
    pub async fn resolve_team(&self, external_team_id: Option<i64>) -> Result<Option<i64>> {
        let Some(external_id) = external_team_id.filter(|id| *id != 0) else {
            return Ok(None);
        };

        let team = self
            .store
            .find_team_by_external_id(external_id)
            .await
            .map_err(ImporterError::from_store)?;

        if team.is_none() {
            debug!("No team with external id {}, importing player without team", external_id);
        }

        Ok(team.map(|t| t.id))
    }

    pub async fn reconcile_player(&self, player: &ExternalPlayer) -> Result<Outcome> {
        let team_id = self.resolve_team(player.team_external_id()).await?;
        let record = transform_player(player, team_id)?;

        let existing = self
            .store
            .find_player_by_external_id(player.id)
            .await
            .map_err(ImporterError::from_store)?;

        match existing {
            Some(existing) => {
                self.store
                    .update_player(existing.id, &record)
                    .await
                    .map_err(ImporterError::from_store)?;
                debug!("Updated player {} (external id {})", existing.id, player.id);
                Ok(Outcome::Updated(existing.id))
            }
            None => {
                let created = self
                    .store
                    .create_player(&record)
                    .await
                    .map_err(ImporterError::from_store)?;
                debug!("Created player {} (external id {})", created.id, player.id);
                Ok(Outcome::Created(created.id))
            }
        }
    }
}
