//! Pagination loop shared by the team and player imports.
//!
//! A run moves through `Fetching -> Processing -> (Fetching | Done)`. Only a
//! source failure ends it in `Failed`; record failures are counted and the
//! run carries on.

use serde::Serialize;
use tracing::{error, info};

use crate::reconcile::{ImportStats, Outcome, Reconciler};
use crate::sources::balldontlie::{
    Cursor, Decoded, ExternalPlayer, ExternalTeam, InvalidRecord, MAX_PER_PAGE,
};
use crate::traits::{EntityImporter, ImportContext, Page};
use crate::{ImporterError, Result};

enum RunPhase<T> {
    Fetching(Option<Cursor>),
    Processing {
        items: Vec<T>,
        next_cursor: Option<Cursor>,
    },
    Done,
    Failed(ImporterError),
}

pub struct ImportRunner<I> {
    importer: I,
    limit: Option<u64>,
}

impl<I: EntityImporter> ImportRunner<I> {
    pub fn new(importer: I) -> Self {
        Self {
            importer,
            limit: None,
        }
    }

    /// Hard ceiling on records processed, checked before each record
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub async fn run(&self) -> Result<ImportStats> {
        let entity = self.importer.entity();
        let mut stats = ImportStats::default();
        let mut phase = RunPhase::Fetching(None);

        loop {
            phase = match phase {
                RunPhase::Fetching(cursor) => {
                    stats.requests += 1;
                    info!(
                        "Request #{} for {} (cursor: {})",
                        stats.requests,
                        entity,
                        cursor.as_ref().map_or("first page".to_string(), Cursor::to_string)
                    );

                    match self.importer.fetch_page(cursor.as_ref()).await {
                        Ok(page) if page.items.is_empty() => {
                            info!("No more {} found", entity);
                            RunPhase::Done
                        }
                        Ok(page) => {
                            info!("Fetched {} {}", page.items.len(), entity);
                            stats.fetched += page.items.len() as u64;
                            RunPhase::Processing {
                                items: page.items,
                                next_cursor: page.next_cursor,
                            }
                        }
                        Err(e) => RunPhase::Failed(e),
                    }
                }
                RunPhase::Processing { items, next_cursor } => {
                    stats = self.process_page(&items, stats).await;

                    match next_cursor {
                        Some(cursor) if !stats.limit_reached(self.limit) => {
                            RunPhase::Fetching(Some(cursor))
                        }
                        _ => RunPhase::Done,
                    }
                }
                RunPhase::Done => {
                    info!(
                        "{} import completed: {} imported, {} updated, {} errors, {} processed, {} requests",
                        entity,
                        stats.created,
                        stats.updated,
                        stats.failed,
                        stats.processed,
                        stats.requests
                    );
                    return Ok(stats);
                }
                RunPhase::Failed(e) => {
                    error!("{} import failed: {}", entity, e);
                    return Err(e);
                }
            };
        }
    }

    async fn process_page(&self, items: &[I::Item], mut stats: ImportStats) -> ImportStats {
        for item in items {
            if stats.limit_reached(self.limit) {
                info!(
                    "Limit of {} {} reached. Stopping.",
                    self.limit.unwrap_or_default(),
                    self.importer.entity()
                );
                break;
            }

            let result = self.importer.reconcile_one(item).await;
            if let Err(e) = &result {
                error!("Error importing {}: {}", I::label(item), e);
            }
            stats = stats.absorb(&result);
        }

        stats
    }
}

pub struct TeamImporter<'a> {
    ctx: &'a ImportContext,
}

impl<'a> TeamImporter<'a> {
    pub fn new(ctx: &'a ImportContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl<'a> EntityImporter for TeamImporter<'a> {
    type Item = Decoded<ExternalTeam>;

    fn entity(&self) -> &'static str {
        "teams"
    }

    /// The teams endpoint is a flat list, so the cursor is ignored and no
    /// next page is ever reported.
    async fn fetch_page(&self, _cursor: Option<&Cursor>) -> Result<Page<Decoded<ExternalTeam>>> {
        let teams = self.ctx.source.fetch_teams().await?;
        Ok(Page::last(teams))
    }

    async fn reconcile_one(&self, item: &Decoded<ExternalTeam>) -> Result<Outcome> {
        Reconciler::new(self.ctx.store.as_ref())
            .reconcile_team(decoded(item)?)
            .await
    }

    fn label(item: &Decoded<ExternalTeam>) -> String {
        match item {
            Ok(team) => format!(
                "team {} (external id {})",
                team.full_name.as_deref().unwrap_or("<unnamed>"),
                team.id
            ),
            Err(invalid) => invalid_label(invalid),
        }
    }
}

pub struct PlayerImporter<'a> {
    ctx: &'a ImportContext,
    per_page: u32,
}

impl<'a> PlayerImporter<'a> {
    pub fn new(ctx: &'a ImportContext, per_page: u32) -> Self {
        Self {
            ctx,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }
}

#[async_trait::async_trait]
impl<'a> EntityImporter for PlayerImporter<'a> {
    type Item = Decoded<ExternalPlayer>;

    fn entity(&self) -> &'static str {
        "players"
    }

    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page<Decoded<ExternalPlayer>>> {
        self.ctx.source.fetch_players(cursor, self.per_page).await
    }

    async fn reconcile_one(&self, item: &Decoded<ExternalPlayer>) -> Result<Outcome> {
        Reconciler::new(self.ctx.store.as_ref())
            .reconcile_player(decoded(item)?)
            .await
    }

    fn label(item: &Decoded<ExternalPlayer>) -> String {
        match item {
            Ok(player) => format!(
                "player {} (external id {})",
                player.display_name(),
                player.id
            ),
            Err(invalid) => invalid_label(invalid),
        }
    }
}

/// An item the source could not decode fails as a transformation error
fn decoded<T>(item: &Decoded<T>) -> Result<&T> {
    item.as_ref()
        .map_err(|invalid| ImporterError::TransformationError(invalid.to_string()))
}

fn invalid_label(invalid: &InvalidRecord) -> String {
    match invalid.id {
        Some(id) => format!("{} (external id {})", invalid.entity, id),
        None => format!("{} without external id", invalid.entity),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamImportReport {
    pub imported: u64,
    pub updated: u64,
    pub errors: u64,
    pub total: u64,
}

impl From<ImportStats> for TeamImportReport {
    fn from(stats: ImportStats) -> Self {
        Self {
            imported: stats.created,
            updated: stats.updated,
            errors: stats.failed,
            total: stats.fetched,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerImportReport {
    pub imported: u64,
    pub updated: u64,
    pub errors: u64,
    pub total_processed: u64,
    pub request_count: u64,
}

impl From<ImportStats> for PlayerImportReport {
    fn from(stats: ImportStats) -> Self {
        Self {
            imported: stats.created,
            updated: stats.updated,
            errors: stats.failed,
            total_processed: stats.processed,
            request_count: stats.requests,
        }
    }
}

/// Import every team from the source in a single pass
pub async fn run_team_import(ctx: &ImportContext) -> Result<TeamImportReport> {
    let stats = ImportRunner::new(TeamImporter::new(ctx)).run().await?;
    Ok(stats.into())
}

/// Import players page by page until the source runs dry or `limit` records
/// have been processed
pub async fn run_player_import(
    ctx: &ImportContext,
    per_page: u32,
    limit: Option<u64>,
) -> Result<PlayerImportReport> {
    let stats = ImportRunner::new(PlayerImporter::new(ctx, per_page))
        .with_limit(limit)
        .run()
        .await?;
    Ok(stats.into())
}
