use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use nimbus_application::SpaceRepository;
use nimbus_core::{AppError, AppResult, Guid};
use nimbus_domain::{Organization, Space};
use tracing::info;

use crate::sql_support::{guid_strings, is_unique_violation, stored_guid};

/// PostgreSQL-backed repository for organizations and spaces.
#[derive(Clone)]
pub struct PostgresSpaceRepository {
    pool: PgPool,
}

impl PostgresSpaceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OrganizationRow {
    guid: String,
    name: String,
}

#[derive(Debug, FromRow)]
struct SpaceRow {
    guid: String,
    name: String,
    organization_guid: String,
}

impl SpaceRow {
    fn into_space(self) -> AppResult<Space> {
        Space::new(
            stored_guid(self.guid, "spaces.guid")?,
            self.name,
            stored_guid(self.organization_guid, "spaces.organization_guid")?,
        )
    }
}

fn space_name_conflict(space: &Space) -> AppError {
    AppError::Conflict(format!(
        "space name '{}' must be unique in organization '{}'",
        space.name(),
        space.organization_guid()
    ))
}

#[async_trait]
impl SpaceRepository for PostgresSpaceRepository {
    async fn ensure_organization(&self, organization: Organization) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO organizations (guid, name)
            VALUES ($1, $2)
            ON CONFLICT (guid) DO NOTHING
            "#,
        )
        .bind(organization.guid().as_str())
        .bind(organization.name().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to ensure organization '{}': {error}",
                organization.guid()
            ))
        })?;

        Ok(())
    }

    async fn find_organization(&self, guid: &Guid) -> AppResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT guid, name
            FROM organizations
            WHERE guid = $1
            "#,
        )
        .bind(guid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find organization '{guid}': {error}"))
        })?;

        row.map(|row| {
            Organization::new(stored_guid(row.guid, "organizations.guid")?, row.name)
        })
        .transpose()
    }

    async fn find_space(&self, guid: &Guid) -> AppResult<Option<Space>> {
        let row = sqlx::query_as::<_, SpaceRow>(
            r#"
            SELECT guid, name, organization_guid
            FROM spaces
            WHERE guid = $1
            "#,
        )
        .bind(guid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find space '{guid}': {error}")))?;

        row.map(SpaceRow::into_space).transpose()
    }

    async fn find_spaces(&self, guids: &[Guid]) -> AppResult<Vec<Space>> {
        if guids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, SpaceRow>(
            r#"
            SELECT guid, name, organization_guid
            FROM spaces
            WHERE guid = ANY($1)
            ORDER BY name, guid
            "#,
        )
        .bind(guid_strings(guids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load spaces: {error}")))?;

        rows.into_iter().map(SpaceRow::into_space).collect()
    }

    async fn list_spaces(&self) -> AppResult<Vec<Space>> {
        let rows = sqlx::query_as::<_, SpaceRow>(
            r#"
            SELECT guid, name, organization_guid
            FROM spaces
            ORDER BY name, guid
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list spaces: {error}")))?;

        rows.into_iter().map(SpaceRow::into_space).collect()
    }

    async fn create_space(&self, space: Space) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO spaces (guid, name, organization_guid)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(space.guid().as_str())
        .bind(space.name().as_str())
        .bind(space.organization_guid().as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => Err(space_name_conflict(&space)),
            Err(error) => Err(AppError::Internal(format!(
                "failed to create space '{}': {error}",
                space.guid()
            ))),
        }
    }

    async fn update_space(&self, space: Space) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE spaces
            SET name = $2, updated_at = now()
            WHERE guid = $1
            "#,
        )
        .bind(space.guid().as_str())
        .bind(space.name().as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(AppError::NotFound(format!(
                "space '{}' not found",
                space.guid()
            ))),
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => Err(space_name_conflict(&space)),
            Err(error) => Err(AppError::Internal(format!(
                "failed to update space '{}': {error}",
                space.guid()
            ))),
        }
    }

    async fn delete_space(&self, guid: &Guid, recursive: bool) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start delete transaction for space '{guid}': {error}"
            ))
        })?;

        // Row lock conflicts with the key-share lock taken by app inserts.
        let locked = sqlx::query_scalar::<_, String>(
            r#"
            SELECT guid
            FROM spaces
            WHERE guid = $1
            FOR UPDATE
            "#,
        )
        .bind(guid.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock space '{guid}': {error}")))?;

        if locked.is_none() {
            return Ok(());
        }

        let deleted = sqlx::query(
            r#"
            DELETE FROM spaces
            WHERE guid = $1
                AND ($2 OR NOT EXISTS (SELECT 1 FROM apps WHERE space_guid = $1))
            "#,
        )
        .bind(guid.as_str())
        .bind(recursive)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete space '{guid}': {error}"))
        })?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "space '{guid}' contains apps; delete recursively to remove them"
            )));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit delete transaction for space '{guid}': {error}"
            ))
        })?;

        info!(space_guid = %guid, recursive, "deleted space rows");

        Ok(())
    }
}
