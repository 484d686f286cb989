use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use nimbus_core::Guid;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Absolute link to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/link-dto.ts"
)]
pub struct LinkDto {
    pub href: String,
}

/// Guid of a related resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/relationship-data-dto.ts"
)]
pub struct RelationshipDataDto {
    pub guid: String,
}

/// To-one relationship, `{ "data": { "guid": ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/relationship-dto.ts"
)]
pub struct RelationshipDto {
    pub data: RelationshipDataDto,
}

impl RelationshipDto {
    pub fn to(guid: &Guid) -> Self {
        Self {
            data: RelationshipDataDto {
                guid: guid.as_str().to_owned(),
            },
        }
    }
}

/// Reference that may point at nothing, e.g. a droplet not yet staged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/nullable-guid-dto.ts"
)]
pub struct NullableGuidDto {
    pub guid: Option<String>,
}

impl NullableGuidDto {
    pub fn of(guid: Option<&Guid>) -> Self {
        Self {
            guid: guid.map(|guid| guid.as_str().to_owned()),
        }
    }
}

/// Labels and annotations keyed by `prefix/name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/metadata-dto.ts"
)]
pub struct MetadataDto {
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
