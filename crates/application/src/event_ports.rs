use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nimbus_core::{AppResult, Guid};
use nimbus_domain::{ActeeType, AuditEventType};
use serde_json::Value;

/// Actor type stamped on events recorded on behalf of an authenticated user.
pub const ACTOR_TYPE_USER: &str = "user";

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEvent {
    /// Audited action.
    pub event_type: AuditEventType,
    /// Guid of the resource acted upon.
    pub actee: Guid,
    /// Kind of resource acted upon.
    pub actee_type: ActeeType,
    /// Name of the resource at the time of the action.
    pub actee_name: String,
    /// Guid of the acting principal.
    pub actor: Guid,
    /// Kind of acting principal.
    pub actor_type: String,
    /// Email of the acting principal.
    pub actor_name: Option<String>,
    /// User name of the acting principal.
    pub actor_username: Option<String>,
    /// Link to the owning space row; absent when the space may be deleted.
    pub space_link: Option<Guid>,
    /// Denormalized owning space guid.
    pub space_guid: Option<Guid>,
    /// Denormalized owning organization guid.
    pub organization_guid: Option<Guid>,
    /// Event metadata, `{"request": ...}`.
    pub metadata: Value,
}

/// Audit event as persisted, with store-assigned identity and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAuditEvent {
    /// Stable event guid.
    pub guid: Guid,
    /// Write time assigned by the store.
    pub timestamp: DateTime<Utc>,
    /// Recorded payload.
    pub event: NewAuditEvent,
}

/// Query parameters for audit event listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditEventQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Restrict to these event types when non-empty.
    pub event_types: Vec<AuditEventType>,
    /// Restrict to these denormalized space guids when non-empty.
    pub space_guids: Vec<Guid>,
    /// Keep only events whose space is one of these or whose organization is
    /// one of `readable_organization_guids`.
    pub readable_space_guids: Vec<Guid>,
    /// Organizations whose events are readable.
    pub readable_organization_guids: Vec<Guid>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persists one audit event and returns it with its write timestamp.
    async fn create_event(&self, event: NewAuditEvent) -> AppResult<RecordedAuditEvent>;

    /// Lists events newest first.
    async fn list_events(&self, query: AuditEventQuery) -> AppResult<Vec<RecordedAuditEvent>>;
}
