use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::dto::common::{PaginatedResponse, PaginationParams};
use crate::dto::team::{TeamFilter, TeamRecord};
use crate::error::{Result, StorageError};
use crate::models::Team;

const DUPLICATE_TEAM: &str = "Team abbreviation or external id already exists";

pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List teams matching `filter`, one page at a time
    pub async fn list(
        &self,
        filter: &TeamFilter,
        pagination: &PaginationParams,
    ) -> Result<PaginatedResponse<Team>> {
        pagination.validate().map_err(StorageError::InvalidQuery)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM teams");
        push_filters(&mut count, filter);
        let total_items: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, external_id, abbreviation, name, full_name, city, conference, division, \
             created_at, updated_at FROM teams",
        );
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(i64::from(pagination.limit()))
            .push(" OFFSET ")
            .push_bind(i64::from(pagination.offset()));

        let teams = query.build_query_as::<Team>().fetch_all(self.pool).await?;

        Ok(PaginatedResponse::new(
            teams,
            pagination.page,
            pagination.page_size,
            total_items,
        ))
    }

    /// Find team by internal ID
    pub async fn find_by_id(&self, id: i64) -> Result<Team> {
        sqlx::query_as::<_, Team>(
            r#"
            SELECT id, external_id, abbreviation, name, full_name, city, conference, division,
                   created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Find team by the id BallDontLie assigned to it
    pub async fn find_by_external_id(&self, external_id: i64) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, external_id, abbreviation, name, full_name, city, conference, division,
                   created_at, updated_at
            FROM teams
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(team)
    }

    pub async fn create(&self, record: &TeamRecord) -> Result<Team> {
        record.validate()?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (external_id, abbreviation, name, full_name, city, conference, division)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, external_id, abbreviation, name, full_name, city, conference, division,
                      created_at, updated_at
            "#,
        )
        .bind(record.external_id)
        .bind(&record.abbreviation)
        .bind(&record.name)
        .bind(&record.full_name)
        .bind(&record.city)
        .bind(record.conference.map(|c| c.as_str()))
        .bind(&record.division)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::on_unique_violation(e, DUPLICATE_TEAM))?;

        Ok(team)
    }

    /// Overwrite every column of team `id` with `record`
    pub async fn update(&self, id: i64, record: &TeamRecord) -> Result<Team> {
        record.validate()?;

        sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET external_id = $2,
                abbreviation = $3,
                name = $4,
                full_name = $5,
                city = $6,
                conference = $7,
                division = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, external_id, abbreviation, name, full_name, city, conference, division,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(record.external_id)
        .bind(&record.abbreviation)
        .bind(&record.name)
        .bind(&record.full_name)
        .bind(&record.city)
        .bind(record.conference.map(|c| c.as_str()))
        .bind(&record.division)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| StorageError::on_unique_violation(e, DUPLICATE_TEAM))?
        .ok_or(StorageError::NotFound)
    }

    /// Delete a team. Its players keep existing with no team.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TeamFilter) {
    let mut separator = " WHERE ";

    if let Some(division) = &filter.division {
        builder
            .push(separator)
            .push("division = ")
            .push_bind(division.clone());
        separator = " AND ";
    }

    if let Some(conference) = filter.conference {
        builder
            .push(separator)
            .push("conference = ")
            .push_bind(conference.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Conference;

    #[test]
    fn test_no_filters_leaves_query_untouched() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM teams");
        push_filters(&mut builder, &TeamFilter::default());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM teams");
    }

    #[test]
    fn test_filters_are_joined_with_and() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM teams");
        let filter = TeamFilter {
            division: Some("Pacific".to_string()),
            conference: Some(Conference::West),
        };
        push_filters(&mut builder, &filter);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM teams WHERE division = $1 AND conference = $2"
        );
    }
}
