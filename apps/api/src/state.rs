use nimbus_application::{AppService, DeploymentService, EventService, SpaceService};

use crate::url_builder::ApiUrlBuilder;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub deployment_service: DeploymentService,
    pub space_service: SpaceService,
    pub app_service: AppService,
    pub event_service: EventService,
    pub url_builder: ApiUrlBuilder,
}
