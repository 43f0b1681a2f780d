use std::sync::Arc;

use storage::RecordStore;

use crate::Result;
use crate::reconcile::Outcome;
use crate::sources::balldontlie::{Cursor, Decoded, ExternalPlayer, ExternalTeam};

/// One page of records from a source. `next_cursor` is `None` on the last page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Upstream provider of NBA teams and players. Items that fail to decode are
/// handed back individually so the rest of the page can still be imported.
#[async_trait::async_trait]
pub trait NbaSource: Send + Sync {
    async fn fetch_teams(&self) -> Result<Vec<Decoded<ExternalTeam>>>;

    async fn fetch_players(
        &self,
        cursor: Option<&Cursor>,
        per_page: u32,
    ) -> Result<Page<Decoded<ExternalPlayer>>>;
}

#[derive(Clone)]
pub struct ImportContext {
    pub source: Arc<dyn NbaSource>,
    pub store: Arc<dyn RecordStore>,
}

impl ImportContext {
    pub fn new(source: Arc<dyn NbaSource>, store: Arc<dyn RecordStore>) -> Self {
        Self { source, store }
    }
}

/// What the import runner needs from one kind of entity: a way to pull pages
/// and a way to reconcile a single record against the store.
#[async_trait::async_trait]
pub trait EntityImporter: Send + Sync {
    type Item: Send + Sync;

    /// Plural entity name used in logs, e.g. "teams"
    fn entity(&self) -> &'static str;

    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page<Self::Item>>;

    async fn reconcile_one(&self, item: &Self::Item) -> Result<Outcome>;

    fn label(item: &Self::Item) -> String;
}
