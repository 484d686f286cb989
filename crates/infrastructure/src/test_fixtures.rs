use chrono::{DateTime, TimeZone, Utc};
use nimbus_application::{ACTOR_TYPE_USER, NewAuditEvent};
use nimbus_core::Guid;
use nimbus_domain::{
    ActeeType, AppModel, AuditEventType, Deployment, DeploymentInput, DeploymentState,
    DeploymentStatusReason, DeploymentStatusValue, DeploymentStrategy, MetadataEntry,
    Organization, RevisionReference, Space,
};
use serde_json::json;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for repository tests: {error}");
    }

    Some(pool)
}

pub(crate) fn organization() -> Organization {
    let guid = Guid::generate();
    let name = format!("org-{guid}");
    Organization::new(guid, name).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn space_in(organization: &Organization, name: &str) -> Space {
    Space::new(Guid::generate(), name, organization.guid().clone())
        .unwrap_or_else(|_| unreachable!())
}

pub(crate) fn app_in(space: &Space, name: &str) -> AppModel {
    AppModel::new(
        Guid::generate(),
        name,
        space.guid().clone(),
        true,
        true,
        Some(Guid::generate()),
    )
    .unwrap_or_else(|_| unreachable!())
}

pub(crate) fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!())
}

pub(crate) fn deployment_for(app: &AppModel) -> Deployment {
    Deployment::new(DeploymentInput {
        guid: Guid::generate(),
        state: DeploymentState::Deploying,
        status_value: DeploymentStatusValue::Active,
        status_reason: DeploymentStatusReason::Deploying,
        last_healthy_at: Some(created_at()),
        strategy: DeploymentStrategy::Rolling,
        app_guid: app.guid().clone(),
        droplet_guid: app.droplet_guid().cloned(),
        previous_droplet_guid: None,
        revision: Some(
            RevisionReference::new(Guid::generate(), 1).unwrap_or_else(|_| unreachable!()),
        ),
        labels: vec![
            MetadataEntry::new(None, "team", "payments").unwrap_or_else(|_| unreachable!()),
        ],
        annotations: vec![
            MetadataEntry::new(Some("example.com".to_owned()), "owner", "ops")
                .unwrap_or_else(|_| unreachable!()),
        ],
        created_at: created_at(),
        updated_at: created_at(),
    })
    .unwrap_or_else(|_| unreachable!())
}

pub(crate) fn space_event(
    event_type: AuditEventType,
    space: &Space,
    linked: bool,
) -> NewAuditEvent {
    NewAuditEvent {
        event_type,
        actee: space.guid().clone(),
        actee_type: ActeeType::Space,
        actee_name: space.name().to_string(),
        actor: Guid::generate(),
        actor_type: ACTOR_TYPE_USER.to_owned(),
        actor_name: Some("user@example.com".to_owned()),
        actor_username: Some("some-user".to_owned()),
        space_link: linked.then(|| space.guid().clone()),
        space_guid: Some(space.guid().clone()),
        organization_guid: Some(space.organization_guid().clone()),
        metadata: json!({"request": {"name": space.name().as_str()}}),
    }
}
