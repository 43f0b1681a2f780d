//! Background execution with bounded retries and a per-attempt deadline.

use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::runner::{PlayerImportReport, TeamImportReport, run_player_import, run_team_import};
use crate::traits::ImportContext;
use crate::{ImporterError, Result};

const MAX_ATTEMPTS: u32 = 3;
const TEAMS_TIMEOUT: Duration = Duration::from_secs(300);
const PLAYERS_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportJob {
    Teams,
    Players { per_page: u32, limit: Option<u64> },
}

impl ImportJob {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Teams => "import-teams",
            Self::Players { .. } => "import-players",
        }
    }

    pub fn max_attempts(&self) -> u32 {
        MAX_ATTEMPTS
    }

    pub fn timeout(&self) -> Duration {
        match self {
            Self::Teams => TEAMS_TIMEOUT,
            Self::Players { .. } => PLAYERS_TIMEOUT,
        }
    }

    /// One attempt, without deadline or retry
    pub async fn handle(&self, ctx: &ImportContext) -> Result<ImportReport> {
        match *self {
            Self::Teams => run_team_import(ctx).await.map(ImportReport::Teams),
            Self::Players { per_page, limit } => run_player_import(ctx, per_page, limit)
                .await
                .map(ImportReport::Players),
        }
    }

    pub fn failed(&self, error: &ImporterError) {
        error!("{} failed permanently: {}", self.name(), error);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum ImportReport {
    Teams(TeamImportReport),
    Players(PlayerImportReport),
}

#[derive(Debug)]
pub enum JobOutcome {
    Completed { attempts: u32, report: ImportReport },
    Failed { attempts: u32, error: ImporterError },
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Completed { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

#[derive(Clone)]
pub struct JobRunner {
    ctx: ImportContext,
}

impl JobRunner {
    pub fn new(ctx: ImportContext) -> Self {
        Self { ctx }
    }

    /// Run `job` on the tokio runtime. The caller may await the handle or drop it.
    pub fn dispatch(&self, job: ImportJob) -> JoinHandle<JobOutcome> {
        let runner = self.clone();
        info!("Dispatching {}", job.name());
        tokio::spawn(async move { runner.run(job).await })
    }

    pub async fn run(&self, job: ImportJob) -> JobOutcome {
        let max_attempts = job.max_attempts();
        let deadline = job.timeout();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = match tokio::time::timeout(deadline, job.handle(&self.ctx)).await {
                Ok(result) => result,
                Err(_) => Err(ImporterError::Timeout(deadline)),
            };

            match result {
                Ok(report) => {
                    info!("{} completed on attempt {}/{}", job.name(), attempt, max_attempts);
                    return JobOutcome::Completed {
                        attempts: attempt,
                        report,
                    };
                }
                Err(e) if attempt < max_attempts => {
                    warn!(
                        "{} attempt {}/{} failed: {}. Retrying.",
                        job.name(),
                        attempt,
                        max_attempts,
                        e
                    );
                }
                Err(e) => {
                    job.failed(&e);
                    return JobOutcome::Failed {
                        attempts: attempt,
                        error: e,
                    };
                }
            }
        }
    }
}
