use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use nimbus_application::DeploymentRepository;
use nimbus_core::{AppError, AppResult, Guid};
use nimbus_domain::{
    Deployment, DeploymentInput, HistoricalRelatedProcess, MetadataEntry, RevisionReference,
};

use crate::sql_support::{guid_strings, stored_guid, stored_optional_guid, stored_record};

/// PostgreSQL-backed repository for deployments and historical processes.
#[derive(Clone)]
pub struct PostgresDeploymentRepository {
    pool: PgPool,
}

impl PostgresDeploymentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeploymentRow {
    guid: String,
    state: String,
    status_value: String,
    status_reason: String,
    last_healthy_at: Option<DateTime<Utc>>,
    strategy: String,
    app_guid: String,
    droplet_guid: Option<String>,
    previous_droplet_guid: Option<String>,
    revision_guid: Option<String>,
    revision_version: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct MetadataRow {
    resource_guid: String,
    key_prefix: Option<String>,
    key_name: String,
    value: String,
}

#[derive(Debug, FromRow)]
struct HistoricalProcessRow {
    deployment_guid: String,
    process_guid: String,
    process_type: String,
}

#[derive(Debug, Clone, Copy)]
enum MetadataTable {
    Labels,
    Annotations,
}

impl MetadataTable {
    fn select_sql(self) -> &'static str {
        match self {
            Self::Labels => {
                r#"
                SELECT resource_guid, key_prefix, key_name, value
                FROM deployment_labels
                WHERE resource_guid = ANY($1)
                ORDER BY id
                "#
            }
            Self::Annotations => {
                r#"
                SELECT resource_guid, key_prefix, key_name, value
                FROM deployment_annotations
                WHERE resource_guid = ANY($1)
                ORDER BY id
                "#
            }
        }
    }

    fn delete_sql(self) -> &'static str {
        match self {
            Self::Labels => "DELETE FROM deployment_labels WHERE resource_guid = $1",
            Self::Annotations => "DELETE FROM deployment_annotations WHERE resource_guid = $1",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            Self::Labels => {
                r#"
                INSERT INTO deployment_labels (resource_guid, key_prefix, key_name, value)
                VALUES ($1, $2, $3, $4)
                "#
            }
            Self::Annotations => {
                r#"
                INSERT INTO deployment_annotations (resource_guid, key_prefix, key_name, value)
                VALUES ($1, $2, $3, $4)
                "#
            }
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Labels => "labels",
            Self::Annotations => "annotations",
        }
    }
}

const SELECT_DEPLOYMENTS: &str = r#"
    SELECT
        guid,
        state,
        status_value,
        status_reason,
        last_healthy_at,
        strategy,
        app_guid,
        droplet_guid,
        previous_droplet_guid,
        revision_guid,
        revision_version,
        created_at,
        updated_at
    FROM deployments
"#;

impl PostgresDeploymentRepository {
    async fn load_metadata(
        &self,
        table: MetadataTable,
        deployment_guids: &[String],
    ) -> AppResult<HashMap<String, Vec<MetadataEntry>>> {
        let rows = sqlx::query_as::<_, MetadataRow>(table.select_sql())
            .bind(deployment_guids)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to load deployment {}: {error}",
                    table.name()
                ))
            })?;

        let mut grouped: HashMap<String, Vec<MetadataEntry>> = HashMap::new();
        for row in rows {
            let entry = stored_record(
                MetadataEntry::new(row.key_prefix, row.key_name, row.value),
                table.name(),
            )?;
            grouped.entry(row.resource_guid).or_default().push(entry);
        }

        Ok(grouped)
    }

    async fn hydrate(&self, rows: Vec<DeploymentRow>) -> AppResult<Vec<Deployment>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let guids: Vec<String> = rows.iter().map(|row| row.guid.clone()).collect();
        let mut labels = self.load_metadata(MetadataTable::Labels, &guids).await?;
        let mut annotations = self
            .load_metadata(MetadataTable::Annotations, &guids)
            .await?;

        rows.into_iter()
            .map(|row| {
                let row_labels = labels.remove(&row.guid).unwrap_or_default();
                let row_annotations = annotations.remove(&row.guid).unwrap_or_default();
                deployment_from_row(row, row_labels, row_annotations)
            })
            .collect()
    }

    async fn replace_metadata(
        transaction: &mut Transaction<'_, Postgres>,
        table: MetadataTable,
        deployment_guid: &Guid,
        entries: &[MetadataEntry],
    ) -> AppResult<()> {
        sqlx::query(table.delete_sql())
            .bind(deployment_guid.as_str())
            .execute(&mut **transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to clear {} of deployment '{deployment_guid}': {error}",
                    table.name()
                ))
            })?;

        for entry in entries {
            sqlx::query(table.insert_sql())
                .bind(deployment_guid.as_str())
                .bind(entry.key_prefix())
                .bind(entry.key_name())
                .bind(entry.value())
                .execute(&mut **transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!(
                        "failed to store {} of deployment '{deployment_guid}': {error}",
                        table.name()
                    ))
                })?;
        }

        Ok(())
    }
}

fn deployment_from_row(
    row: DeploymentRow,
    labels: Vec<MetadataEntry>,
    annotations: Vec<MetadataEntry>,
) -> AppResult<Deployment> {
    stored_record(decode_deployment(row, labels, annotations), "deployment")
}

fn decode_deployment(
    row: DeploymentRow,
    labels: Vec<MetadataEntry>,
    annotations: Vec<MetadataEntry>,
) -> AppResult<Deployment> {
    let revision = match (row.revision_guid, row.revision_version) {
        (Some(guid), Some(version)) => Some(RevisionReference::new(
            stored_guid(guid, "deployments.revision_guid")?,
            version,
        )?),
        _ => None,
    };

    Deployment::new(DeploymentInput {
        guid: stored_guid(row.guid, "deployments.guid")?,
        state: row.state.parse()?,
        status_value: row.status_value.parse()?,
        status_reason: row.status_reason.parse()?,
        last_healthy_at: row.last_healthy_at,
        strategy: row.strategy.parse()?,
        app_guid: stored_guid(row.app_guid, "deployments.app_guid")?,
        droplet_guid: stored_optional_guid(row.droplet_guid, "deployments.droplet_guid")?,
        previous_droplet_guid: stored_optional_guid(
            row.previous_droplet_guid,
            "deployments.previous_droplet_guid",
        )?,
        revision,
        labels,
        annotations,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl DeploymentRepository for PostgresDeploymentRepository {
    async fn find_deployment(&self, guid: &Guid) -> AppResult<Option<Deployment>> {
        let row =
            sqlx::query_as::<_, DeploymentRow>(&format!("{SELECT_DEPLOYMENTS} WHERE guid = $1"))
                .bind(guid.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to find deployment '{guid}': {error}"))
                })?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.hydrate(vec![row]).await?.into_iter().next())
    }

    async fn list_deployments(&self) -> AppResult<Vec<Deployment>> {
        let rows = sqlx::query_as::<_, DeploymentRow>(&format!(
            "{SELECT_DEPLOYMENTS} ORDER BY created_at, guid"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list deployments: {error}")))?;

        self.hydrate(rows).await
    }

    async fn save_deployment(&self, deployment: Deployment) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start deployment save transaction for '{}': {error}",
                deployment.guid()
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO deployments (
                guid,
                state,
                status_value,
                status_reason,
                last_healthy_at,
                strategy,
                app_guid,
                droplet_guid,
                previous_droplet_guid,
                revision_guid,
                revision_version,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (guid) DO UPDATE SET
                state = EXCLUDED.state,
                status_value = EXCLUDED.status_value,
                status_reason = EXCLUDED.status_reason,
                last_healthy_at = EXCLUDED.last_healthy_at,
                strategy = EXCLUDED.strategy,
                droplet_guid = EXCLUDED.droplet_guid,
                previous_droplet_guid = EXCLUDED.previous_droplet_guid,
                revision_guid = EXCLUDED.revision_guid,
                revision_version = EXCLUDED.revision_version,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(deployment.guid().as_str())
        .bind(deployment.state().as_str())
        .bind(deployment.status_value().as_str())
        .bind(deployment.status_reason().as_str())
        .bind(deployment.last_healthy_at())
        .bind(deployment.strategy().as_str())
        .bind(deployment.app_guid().as_str())
        .bind(deployment.droplet_guid().map(|guid| guid.as_str()))
        .bind(deployment.previous_droplet_guid().map(|guid| guid.as_str()))
        .bind(deployment.revision().map(|revision| revision.guid().as_str()))
        .bind(deployment.revision().map(RevisionReference::version))
        .bind(deployment.created_at())
        .bind(deployment.updated_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save deployment '{}': {error}",
                deployment.guid()
            ))
        })?;

        Self::replace_metadata(
            &mut transaction,
            MetadataTable::Labels,
            deployment.guid(),
            deployment.labels(),
        )
        .await?;
        Self::replace_metadata(
            &mut transaction,
            MetadataTable::Annotations,
            deployment.guid(),
            deployment.annotations(),
        )
        .await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit deployment save transaction for '{}': {error}",
                deployment.guid()
            ))
        })
    }

    async fn append_historical_process(&self, process: HistoricalRelatedProcess) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO deployment_historical_related_processes (
                deployment_guid,
                process_guid,
                process_type
            )
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(process.deployment_guid().as_str())
        .bind(process.process_guid().as_str())
        .bind(process.process_type())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to append historical process '{}' to deployment '{}': {error}",
                process.process_guid(),
                process.deployment_guid()
            ))
        })?;

        Ok(())
    }

    async fn list_historical_processes(
        &self,
        deployment_guids: &[Guid],
    ) -> AppResult<Vec<HistoricalRelatedProcess>> {
        if deployment_guids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, HistoricalProcessRow>(
            r#"
            SELECT deployment_guid, process_guid, process_type
            FROM deployment_historical_related_processes
            WHERE deployment_guid = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(guid_strings(deployment_guids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list historical processes: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                let process = HistoricalRelatedProcess::new(
                    stored_guid(
                        row.deployment_guid,
                        "deployment_historical_related_processes.deployment_guid",
                    )?,
                    stored_guid(
                        row.process_guid,
                        "deployment_historical_related_processes.process_guid",
                    )?,
                    row.process_type,
                );
                stored_record(process, "historical related process")
            })
            .collect()
    }
}
