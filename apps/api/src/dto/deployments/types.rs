use serde::Serialize;
use ts_rs::TS;

use crate::dto::common::{LinkDto, MetadataDto, NullableGuidDto, RelationshipDto};

/// API representation of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/deployment-response.ts"
)]
pub struct DeploymentResponse {
    pub guid: String,
    pub state: String,
    pub status: DeploymentStatusDto,
    pub strategy: String,
    pub droplet: NullableGuidDto,
    pub previous_droplet: NullableGuidDto,
    pub new_processes: Vec<DeploymentProcessDto>,
    pub revision: Option<DeploymentRevisionDto>,
    pub created_at: String,
    pub updated_at: String,
    pub relationships: DeploymentRelationshipsDto,
    pub metadata: MetadataDto,
    pub links: DeploymentLinksDto,
}

/// Deployment status block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/deployment-status-dto.ts"
)]
pub struct DeploymentStatusDto {
    pub value: String,
    pub reason: String,
    pub details: DeploymentStatusDetailsDto,
}

/// Deployment status details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/deployment-status-details-dto.ts"
)]
pub struct DeploymentStatusDetailsDto {
    pub last_successful_healthcheck: Option<String>,
}

/// Process created by a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/deployment-process-dto.ts"
)]
pub struct DeploymentProcessDto {
    pub guid: String,
    #[serde(rename = "type")]
    pub process_type: String,
}

/// Revision rolled out by a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/deployment-revision-dto.ts"
)]
pub struct DeploymentRevisionDto {
    pub guid: String,
    pub version: i32,
}

/// Relationships of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/deployment-relationships-dto.ts"
)]
pub struct DeploymentRelationshipsDto {
    pub app: RelationshipDto,
}

/// Links of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/deployment-links-dto.ts"
)]
pub struct DeploymentLinksDto {
    #[serde(rename = "self")]
    pub self_link: LinkDto,
    pub app: LinkDto,
}
