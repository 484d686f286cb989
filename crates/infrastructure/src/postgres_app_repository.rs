use async_trait::async_trait;
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use nimbus_application::AppRepository;
use nimbus_core::{AppError, AppResult, Guid};
use nimbus_domain::AppModel;

use crate::sql_support::{
    guid_strings, is_unique_violation, stored_guid, stored_optional_guid, stored_record,
};

/// PostgreSQL-backed repository for apps.
#[derive(Clone)]
pub struct PostgresAppRepository {
    pool: PgPool,
}

impl PostgresAppRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AppRow {
    guid: String,
    name: String,
    space_guid: String,
    revisions_enabled: bool,
    enable_ssh: bool,
    droplet_guid: Option<String>,
    environment_variables: Value,
}

impl AppRow {
    fn into_app(self) -> AppResult<AppModel> {
        let app = AppModel::new(
            stored_guid(self.guid, "apps.guid")?,
            self.name,
            stored_guid(self.space_guid, "apps.space_guid")?,
            self.revisions_enabled,
            self.enable_ssh,
            stored_optional_guid(self.droplet_guid, "apps.droplet_guid")?,
        )
        .and_then(|app| app.with_environment_variables(self.environment_variables));

        stored_record(app, "app")
    }
}

#[async_trait]
impl AppRepository for PostgresAppRepository {
    async fn find_app(&self, guid: &Guid) -> AppResult<Option<AppModel>> {
        let row = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT
                guid,
                name,
                space_guid,
                revisions_enabled,
                enable_ssh,
                droplet_guid,
                environment_variables
            FROM apps
            WHERE guid = $1
            "#,
        )
        .bind(guid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find app '{guid}': {error}")))?;

        row.map(AppRow::into_app).transpose()
    }

    async fn find_apps(&self, guids: &[Guid]) -> AppResult<Vec<AppModel>> {
        if guids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT
                guid,
                name,
                space_guid,
                revisions_enabled,
                enable_ssh,
                droplet_guid,
                environment_variables
            FROM apps
            WHERE guid = ANY($1)
            ORDER BY name, guid
            "#,
        )
        .bind(guid_strings(guids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load apps: {error}")))?;

        rows.into_iter().map(AppRow::into_app).collect()
    }

    async fn list_apps(&self) -> AppResult<Vec<AppModel>> {
        let rows = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT
                guid,
                name,
                space_guid,
                revisions_enabled,
                enable_ssh,
                droplet_guid,
                environment_variables
            FROM apps
            ORDER BY name, guid
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list apps: {error}")))?;

        rows.into_iter().map(AppRow::into_app).collect()
    }

    async fn create_app(&self, app: AppModel) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO apps (
                guid,
                name,
                space_guid,
                revisions_enabled,
                enable_ssh,
                droplet_guid,
                environment_variables
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(app.guid().as_str())
        .bind(app.name().as_str())
        .bind(app.space_guid().as_str())
        .bind(app.revisions_enabled())
        .bind(app.enable_ssh())
        .bind(app.droplet_guid().map(|guid| guid.as_str()))
        .bind(Value::Object(app.environment_variables().clone()))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => Err(AppError::Conflict(
                "name must be unique in space".to_owned(),
            )),
            Err(error) => Err(AppError::Internal(format!(
                "failed to create app '{}': {error}",
                app.guid()
            ))),
        }
    }

    async fn count_apps_in_space(&self, space_guid: &Guid) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM apps
            WHERE space_guid = $1
            "#,
        )
        .bind(space_guid.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to count apps in space '{space_guid}': {error}"
            ))
        })?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
