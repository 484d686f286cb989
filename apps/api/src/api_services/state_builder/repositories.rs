use std::sync::Arc;

use nimbus_application::{
    AppRepository, DeploymentRepository, EventRepository, RoleRepository, SpaceRepository,
};
use nimbus_infrastructure::{
    PostgresAppRepository, PostgresDeploymentRepository, PostgresEventRepository,
    PostgresRoleRepository, PostgresSpaceRepository,
};
use sqlx::PgPool;

pub(super) struct RepositorySet {
    pub(super) role_repository: Arc<dyn RoleRepository>,
    pub(super) space_repository: Arc<dyn SpaceRepository>,
    pub(super) app_repository: Arc<dyn AppRepository>,
    pub(super) deployment_repository: Arc<dyn DeploymentRepository>,
    pub(super) event_repository: Arc<dyn EventRepository>,
}

#[cfg(test)]
impl RepositorySet {
    pub(super) fn in_memory(store: Arc<nimbus_infrastructure::InMemoryStore>) -> Self {
        Self {
            role_repository: store.clone(),
            space_repository: store.clone(),
            app_repository: store.clone(),
            deployment_repository: store.clone(),
            event_repository: store,
        }
    }
}

pub(super) fn build_repository_set(pool: &PgPool) -> RepositorySet {
    RepositorySet {
        role_repository: Arc::new(PostgresRoleRepository::new(pool.clone())),
        space_repository: Arc::new(PostgresSpaceRepository::new(pool.clone())),
        app_repository: Arc::new(PostgresAppRepository::new(pool.clone())),
        deployment_repository: Arc::new(PostgresDeploymentRepository::new(pool.clone())),
        event_repository: Arc::new(PostgresEventRepository::new(pool.clone())),
    }
}
