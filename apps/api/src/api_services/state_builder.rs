use nimbus_application::{
    AppDefaults, AppService, DeploymentService, EventService, SpaceService, VisibilityService,
};
use nimbus_core::AppError;
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;
use crate::url_builder::ApiUrlBuilder;

mod repositories;

use repositories::RepositorySet;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let repositories = repositories::build_repository_set(&pool);

    Ok(assemble_app_state(
        repositories,
        config.url_builder()?,
        config.app_defaults(),
    ))
}

#[cfg(test)]
pub fn build_in_memory_state(
    store: std::sync::Arc<nimbus_infrastructure::InMemoryStore>,
    url_builder: ApiUrlBuilder,
    defaults: AppDefaults,
) -> AppState {
    assemble_app_state(RepositorySet::in_memory(store), url_builder, defaults)
}

fn assemble_app_state(
    repositories: RepositorySet,
    url_builder: ApiUrlBuilder,
    defaults: AppDefaults,
) -> AppState {
    let visibility = VisibilityService::new(
        repositories.role_repository.clone(),
        repositories.space_repository.clone(),
    );
    let event_service = EventService::new(repositories.event_repository, visibility.clone());

    AppState {
        deployment_service: DeploymentService::new(
            repositories.deployment_repository,
            repositories.app_repository.clone(),
            repositories.space_repository.clone(),
            visibility.clone(),
        ),
        space_service: SpaceService::new(
            repositories.space_repository,
            repositories.app_repository.clone(),
            visibility.clone(),
            event_service.clone(),
        ),
        app_service: AppService::new(
            repositories.app_repository,
            visibility,
            event_service.clone(),
            defaults,
        ),
        event_service,
        url_builder,
    }
}
