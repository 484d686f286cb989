use nimbus_application::RecordedAuditEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::dto::common::{NullableGuidDto, format_timestamp};

/// Query parameters for audit event listing.
#[derive(Debug, Default, Deserialize)]
pub struct AuditEventListQuery {
    /// Comma separated event types.
    pub types: Option<String>,
    /// Comma separated space guids.
    pub space_guids: Option<String>,
    /// 1-based page number.
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Acting principal of an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-event-actor-dto.ts"
)]
pub struct AuditEventActorDto {
    pub guid: String,
    #[serde(rename = "type")]
    pub actor_type: String,
    pub name: Option<String>,
    pub username: Option<String>,
}

/// Resource an audit event acted upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-event-target-dto.ts"
)]
pub struct AuditEventTargetDto {
    pub guid: String,
    #[serde(rename = "type")]
    pub target_type: String,
    pub name: String,
}

/// API representation of an audit event.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-event-response.ts"
)]
pub struct AuditEventResponse {
    pub guid: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: String,
    pub actor: AuditEventActorDto,
    pub target: AuditEventTargetDto,
    #[ts(type = "unknown")]
    pub data: Value,
    pub space: NullableGuidDto,
    pub organization: NullableGuidDto,
}

impl From<RecordedAuditEvent> for AuditEventResponse {
    fn from(value: RecordedAuditEvent) -> Self {
        let event = value.event;

        Self {
            guid: value.guid.as_str().to_owned(),
            event_type: event.event_type.as_str().to_owned(),
            created_at: format_timestamp(value.timestamp),
            actor: AuditEventActorDto {
                guid: event.actor.as_str().to_owned(),
                actor_type: event.actor_type,
                name: event.actor_name,
                username: event.actor_username,
            },
            target: AuditEventTargetDto {
                guid: event.actee.as_str().to_owned(),
                target_type: event.actee_type.as_str().to_owned(),
                name: event.actee_name,
            },
            data: event.metadata,
            space: NullableGuidDto::of(event.space_guid.as_ref()),
            organization: NullableGuidDto::of(event.organization_guid.as_ref()),
        }
    }
}
