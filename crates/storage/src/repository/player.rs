use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::dto::common::{PaginatedResponse, PaginationParams};
use crate::dto::player::{PlayerFilter, PlayerRecord};
use crate::error::{Result, StorageError};
use crate::models::Player;

const DUPLICATE_PLAYER: &str = "Player external id already exists";

pub struct PlayerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List players matching `filter`, one page at a time
    pub async fn list(
        &self,
        filter: &PlayerFilter,
        pagination: &PaginationParams,
    ) -> Result<PaginatedResponse<Player>> {
        pagination.validate().map_err(StorageError::InvalidQuery)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM players");
        push_filters(&mut count, filter);
        let total_items: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, external_id, first_name, last_name, position, height, weight, \
             jersey_number, college, country, draft_year, draft_round, draft_number, team_id, \
             created_at, updated_at FROM players",
        );
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY last_name, first_name, id LIMIT ")
            .push_bind(i64::from(pagination.limit()))
            .push(" OFFSET ")
            .push_bind(i64::from(pagination.offset()));

        let players = query.build_query_as::<Player>().fetch_all(self.pool).await?;

        Ok(PaginatedResponse::new(
            players,
            pagination.page,
            pagination.page_size,
            total_items,
        ))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Player> {
        sqlx::query_as::<_, Player>(
            r#"
            SELECT id, external_id, first_name, last_name, position, height, weight,
                   jersey_number, college, country, draft_year, draft_round, draft_number,
                   team_id, created_at, updated_at
            FROM players
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_external_id(&self, external_id: i64) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            SELECT id, external_id, first_name, last_name, position, height, weight,
                   jersey_number, college, country, draft_year, draft_round, draft_number,
                   team_id, created_at, updated_at
            FROM players
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(player)
    }

    /// List the players currently attached to team `team_id`
    pub async fn list_by_team(&self, team_id: i64) -> Result<Vec<Player>> {
        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT id, external_id, first_name, last_name, position, height, weight,
                   jersey_number, college, country, draft_year, draft_round, draft_number,
                   team_id, created_at, updated_at
            FROM players
            WHERE team_id = $1
            ORDER BY last_name, first_name
            "#,
        )
        .bind(team_id)
        .fetch_all(self.pool)
        .await?;

        Ok(players)
    }

    pub async fn create(&self, record: &PlayerRecord) -> Result<Player> {
        record.validate()?;

        let player = sqlx::query_as::<_, Player>(
            r#"
            INSERT INTO players (
                external_id, first_name, last_name, position, height, weight, jersey_number,
                college, country, draft_year, draft_round, draft_number, team_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, external_id, first_name, last_name, position, height, weight,
                      jersey_number, college, country, draft_year, draft_round, draft_number,
                      team_id, created_at, updated_at
            "#,
        )
        .bind(record.external_id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.position)
        .bind(&record.height)
        .bind(&record.weight)
        .bind(&record.jersey_number)
        .bind(&record.college)
        .bind(&record.country)
        .bind(record.draft_year)
        .bind(record.draft_round)
        .bind(record.draft_number)
        .bind(record.team_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::on_unique_violation(e, DUPLICATE_PLAYER))?;

        Ok(player)
    }

    /// Overwrite every column of player `id` with `record`
    pub async fn update(&self, id: i64, record: &PlayerRecord) -> Result<Player> {
        record.validate()?;

        sqlx::query_as::<_, Player>(
            r#"
            UPDATE players
            SET external_id = $2,
                first_name = $3,
                last_name = $4,
                position = $5,
                height = $6,
                weight = $7,
                jersey_number = $8,
                college = $9,
                country = $10,
                draft_year = $11,
                draft_round = $12,
                draft_number = $13,
                team_id = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, external_id, first_name, last_name, position, height, weight,
                      jersey_number, college, country, draft_year, draft_round, draft_number,
                      team_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(record.external_id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.position)
        .bind(&record.height)
        .bind(&record.weight)
        .bind(&record.jersey_number)
        .bind(&record.college)
        .bind(&record.country)
        .bind(record.draft_year)
        .bind(record.draft_round)
        .bind(record.draft_number)
        .bind(record.team_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| StorageError::on_unique_violation(e, DUPLICATE_PLAYER))?
        .ok_or(StorageError::NotFound)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &PlayerFilter) {
    let mut separator = " WHERE ";

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        builder
            .push(separator)
            .push("(first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR last_name ILIKE ")
            .push_bind(pattern)
            .push(")");
        separator = " AND ";
    }

    if let Some(first_name) = &filter.first_name {
        builder
            .push(separator)
            .push("first_name = ")
            .push_bind(first_name.clone());
        separator = " AND ";
    }

    if let Some(last_name) = &filter.last_name {
        builder
            .push(separator)
            .push("last_name = ")
            .push_bind(last_name.clone());
        separator = " AND ";
    }

    // team_ids are external team ids, so resolve them through the teams table
    if !filter.team_ids.is_empty() {
        builder
            .push(separator)
            .push("team_id IN (SELECT id FROM teams WHERE external_id = ANY(")
            .push_bind(filter.team_ids.clone())
            .push("))");
        separator = " AND ";
    }

    if !filter.player_ids.is_empty() {
        builder
            .push(separator)
            .push("external_id = ANY(")
            .push_bind(filter.player_ids.clone())
            .push(")");
    }
}
