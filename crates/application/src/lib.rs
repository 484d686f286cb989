//! Application services and ports.

#![forbid(unsafe_code)]

mod app_ports;
mod app_service;
mod deployment_ports;
mod deployment_service;
mod event_ports;
mod event_service;
mod space_ports;
mod space_service;
mod visibility_service;

#[cfg(test)]
mod test_support;

pub use app_ports::AppRepository;
pub use app_service::{AppDefaults, AppService, CreateAppInput};
pub use deployment_ports::DeploymentRepository;
pub use deployment_service::{DeploymentDetails, DeploymentService};
pub use event_ports::{
    ACTOR_TYPE_USER, AuditEventQuery, EventRepository, NewAuditEvent, RecordedAuditEvent,
};
pub use event_service::{AuditedActee, EventService, MAX_EVENTS_PER_PAGE};
pub use space_ports::SpaceRepository;
pub use space_service::{CreateSpaceInput, SpaceService, UpdateSpaceInput};
pub use visibility_service::{RoleRepository, VisibilityService, VisibleSpace, scope_of_space};
