use nimbus_application::RoleRepository;
use nimbus_core::Guid;
use nimbus_domain::{RoleMembership, RoleType};

use super::PostgresRoleRepository;
use crate::test_fixtures::test_pool;

#[tokio::test]
async fn granting_the_same_role_twice_keeps_one_membership() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool);
    let user_guid = Guid::generate();
    let space_guid = Guid::generate();
    let organization_guid = Guid::generate();

    let developer = RoleMembership::new(user_guid.clone(), RoleType::SpaceDeveloper, space_guid);
    let manager = RoleMembership::new(
        user_guid.clone(),
        RoleType::OrganizationManager,
        organization_guid,
    );
    assert!(repository.grant_role(developer.clone()).await.is_ok());
    assert!(repository.grant_role(developer.clone()).await.is_ok());
    assert!(repository.grant_role(manager.clone()).await.is_ok());

    let memberships = repository
        .list_memberships_for_user(&user_guid)
        .await
        .unwrap_or_default();
    assert_eq!(memberships.len(), 2);
    assert!(memberships.contains(&developer));
    assert!(memberships.contains(&manager));
}

#[tokio::test]
async fn users_without_roles_have_no_memberships() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool);
    let memberships = repository
        .list_memberships_for_user(&Guid::generate())
        .await;

    assert!(memberships.is_ok_and(|memberships| memberships.is_empty()));
}
