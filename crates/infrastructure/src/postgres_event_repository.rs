use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use nimbus_application::{AuditEventQuery, EventRepository, NewAuditEvent, RecordedAuditEvent};
use nimbus_core::{AppError, AppResult};

use crate::sql_support::{guid_strings, stored_guid, stored_optional_guid};

/// PostgreSQL-backed append-only audit event repository.
#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InsertedEventRow {
    guid: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct EventRow {
    guid: String,
    event_type: String,
    actee: String,
    actee_type: String,
    actee_name: String,
    actor: String,
    actor_type: String,
    actor_name: Option<String>,
    actor_username: Option<String>,
    space_link_guid: Option<String>,
    space_guid: Option<String>,
    organization_guid: Option<String>,
    metadata: Value,
    timestamp: DateTime<Utc>,
}

impl EventRow {
    fn into_recorded(self) -> AppResult<RecordedAuditEvent> {
        Ok(RecordedAuditEvent {
            guid: stored_guid(self.guid, "events.guid")?,
            timestamp: self.timestamp,
            event: NewAuditEvent {
                event_type: self.event_type.parse()?,
                actee: stored_guid(self.actee, "events.actee")?,
                actee_type: self.actee_type.parse()?,
                actee_name: self.actee_name,
                actor: stored_guid(self.actor, "events.actor")?,
                actor_type: self.actor_type,
                actor_name: self.actor_name,
                actor_username: self.actor_username,
                space_link: stored_optional_guid(self.space_link_guid, "events.space_link_guid")?,
                space_guid: stored_optional_guid(self.space_guid, "events.space_guid")?,
                organization_guid: stored_optional_guid(
                    self.organization_guid,
                    "events.organization_guid",
                )?,
                metadata: self.metadata,
            },
        })
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn create_event(&self, event: NewAuditEvent) -> AppResult<RecordedAuditEvent> {
        let inserted = sqlx::query_as::<_, InsertedEventRow>(
            r#"
            INSERT INTO events (
                type,
                actee,
                actee_type,
                actee_name,
                actor,
                actor_type,
                actor_name,
                actor_username,
                space_link_guid,
                space_guid,
                organization_guid,
                metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING guid, timestamp
            "#,
        )
        .bind(event.event_type.as_str())
        .bind(event.actee.as_str())
        .bind(event.actee_type.as_str())
        .bind(event.actee_name.as_str())
        .bind(event.actor.as_str())
        .bind(event.actor_type.as_str())
        .bind(event.actor_name.as_deref())
        .bind(event.actor_username.as_deref())
        .bind(event.space_link.as_ref().map(|guid| guid.as_str()))
        .bind(event.space_guid.as_ref().map(|guid| guid.as_str()))
        .bind(event.organization_guid.as_ref().map(|guid| guid.as_str()))
        .bind(&event.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to record audit event '{}' for actee '{}': {error}",
                event.event_type.as_str(),
                event.actee
            ))
        })?;

        Ok(RecordedAuditEvent {
            guid: stored_guid(inserted.guid, "events.guid")?,
            timestamp: inserted.timestamp,
            event,
        })
    }

    async fn list_events(&self, query: AuditEventQuery) -> AppResult<Vec<RecordedAuditEvent>> {
        let limit = i64::try_from(query.limit.clamp(1, 200)).unwrap_or(200);
        let offset = i64::try_from(query.offset).map_err(|_| {
            AppError::Validation(format!("event offset {} is out of range", query.offset))
        })?;
        let event_types: Vec<String> = query
            .event_types
            .iter()
            .map(|event_type| event_type.as_str().to_owned())
            .collect();

        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT
                guid,
                type AS event_type,
                actee,
                actee_type,
                actee_name,
                actor,
                actor_type,
                actor_name,
                actor_username,
                space_link_guid,
                space_guid,
                organization_guid,
                metadata,
                timestamp
            FROM events
            WHERE (cardinality($1::TEXT[]) = 0 OR type = ANY($1))
                AND (cardinality($2::TEXT[]) = 0 OR space_guid = ANY($2))
                AND (space_guid = ANY($3) OR organization_guid = ANY($4))
            ORDER BY timestamp DESC, id DESC
            LIMIT $5
            OFFSET $6
            "#,
        )
        .bind(event_types)
        .bind(guid_strings(&query.space_guids))
        .bind(guid_strings(&query.readable_space_guids))
        .bind(guid_strings(&query.readable_organization_guids))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list audit events: {error}")))?;

        rows.into_iter().map(EventRow::into_recorded).collect()
    }
}
