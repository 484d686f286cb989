mod apps;
mod common;
mod deployments;
mod events;
mod spaces;

pub use apps::{AppLinksDto, AppRelationshipsDto, AppResponse, CreateAppRequest};
pub use common::{
    HealthResponse, LinkDto, MetadataDto, NullableGuidDto, RelationshipDataDto, RelationshipDto,
};
pub use deployments::{
    DeploymentLinksDto, DeploymentProcessDto, DeploymentRelationshipsDto, DeploymentResponse,
    DeploymentRevisionDto, DeploymentStatusDetailsDto, DeploymentStatusDto, present_deployment,
};
pub use events::{AuditEventActorDto, AuditEventListQuery, AuditEventResponse, AuditEventTargetDto};
pub use spaces::{
    CreateSpaceRequest, DeleteSpaceQuery, SpaceLinksDto, SpaceRelationshipsDto, SpaceResponse,
    UpdateSpaceRequest,
};
