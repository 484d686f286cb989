use nimbus_application::{CreateSpaceInput, RoleRepository, SpaceRepository};
use nimbus_core::{AppError, AppResult, Guid, UserAuditInfo};
use nimbus_domain::{Organization, RoleMembership, RoleType};
use nimbus_infrastructure::{PostgresRoleRepository, PostgresSpaceRepository};
use serde_json::json;
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::api_services::build_app_state;

const DEV_ORGANIZATION_GUID: &str = "00000000-0000-4000-8000-000000000001";
const DEV_ORGANIZATION_NAME: &str = "dev-org";
const DEV_SPACE_NAME: &str = "development";

/// Seeds a development organization and space owned by `DEV_SEED_USER_GUID`.
pub async fn run(pool: PgPool, config: &ApiConfig) -> AppResult<()> {
    let user_guid = config.dev_seed_user_guid.clone().ok_or_else(|| {
        AppError::Validation("DEV_SEED_USER_GUID is required to seed".to_owned())
    })?;

    let organization =
        Organization::new(Guid::parse(DEV_ORGANIZATION_GUID)?, DEV_ORGANIZATION_NAME)?;
    PostgresSpaceRepository::new(pool.clone())
        .ensure_organization(organization.clone())
        .await?;
    PostgresRoleRepository::new(pool.clone())
        .grant_role(RoleMembership::new(
            user_guid.clone(),
            RoleType::OrganizationManager,
            organization.guid().clone(),
        ))
        .await?;

    let state = build_app_state(pool, config)?;
    let user = UserAuditInfo::new(user_guid, None, Some("dev-seed".to_owned()));
    let request = json!({
        "name": DEV_SPACE_NAME,
        "relationships": { "organization": { "data": { "guid": DEV_ORGANIZATION_GUID } } }
    });

    match state
        .space_service
        .create_space(
            &user,
            CreateSpaceInput {
                name: DEV_SPACE_NAME.to_owned(),
                organization_guid: organization.guid().clone(),
            },
            request,
        )
        .await
    {
        Ok(space) => info!(space_guid = %space.guid(), "seeded development space"),
        Err(AppError::Conflict(_)) => info!("development space already seeded"),
        Err(error) => return Err(error),
    }

    info!(
        organization_guid = %organization.guid(),
        user_guid = %user.user_guid(),
        "development seed applied"
    );

    Ok(())
}
