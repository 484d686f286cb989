//! Domain entities and invariants.

#![forbid(unsafe_code)]

pub mod access;

mod app;
mod deployment;
mod metadata;
mod security;
mod space;

pub use access::{PrincipalRoles, VisibilityScope};
pub use app::{AppModel, validate_app_name, validate_environment_variables};
pub use deployment::{
    Deployment, DeploymentInput, DeploymentState, DeploymentStatusReason, DeploymentStatusValue,
    DeploymentStrategy, HistoricalRelatedProcess, RevisionReference,
};
pub use metadata::{MetadataEntry, hashify, hashify_entries};
pub use security::{ActeeType, AuditEventType, RoleMembership, RoleScope, RoleType};
pub use space::{Organization, Space};
