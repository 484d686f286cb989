//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_store;
mod postgres_app_repository;
mod postgres_deployment_repository;
mod postgres_event_repository;
mod postgres_role_repository;
mod postgres_space_repository;
mod sql_support;

#[cfg(test)]
mod test_fixtures;

pub use in_memory_store::InMemoryStore;
pub use postgres_app_repository::PostgresAppRepository;
pub use postgres_deployment_repository::PostgresDeploymentRepository;
pub use postgres_event_repository::PostgresEventRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_space_repository::PostgresSpaceRepository;
