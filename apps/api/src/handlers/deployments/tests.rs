use axum::Json;
use axum::extract::{Extension, Path, State};
use nimbus_core::{AppError, Guid};
use nimbus_domain::RoleType;
use serde_json::{Value, json};

use super::{get_deployment_handler, list_deployments_handler};
use crate::error::ApiError;
use crate::handlers::test_support::{harness, user};

#[tokio::test]
async fn space_developer_gets_a_presented_deployment() {
    let harness = harness();
    let user = user();
    let organization = harness.organization().await;
    let space = harness.space(&organization, "dev").await;
    let app = harness.app(&space, "web-app", true).await;
    let deployment = harness.deployment(app.guid()).await;
    let process_guid = harness.process(&deployment, "web").await;
    harness
        .grant(&user, RoleType::SpaceDeveloper, space.guid())
        .await;

    let response = get_deployment_handler(
        State(harness.state.clone()),
        Extension(user),
        Path(deployment.guid().as_str().to_owned()),
    )
    .await;

    let Ok(Json(response)) = response else {
        panic!("deployment should be visible");
    };
    let presented = serde_json::to_value(response).unwrap_or_default();

    assert_eq!(presented["guid"], json!(deployment.guid().as_str()));
    assert_eq!(presented["metadata"]["labels"], json!({ "team": "payments" }));
    assert_eq!(presented["metadata"]["annotations"], json!({}));
    assert_eq!(
        presented["new_processes"],
        json!([{ "guid": process_guid.as_str(), "type": "web" }])
    );
    assert_eq!(presented["revision"]["version"], json!(1));
    assert_eq!(
        presented["links"]["app"]["href"],
        json!(format!("https://api.example.com/v3/apps/{}", app.guid()))
    );
}

#[tokio::test]
async fn revision_is_hidden_when_the_app_does_not_track_revisions() {
    let harness = harness();
    let user = user();
    let organization = harness.organization().await;
    let space = harness.space(&organization, "dev").await;
    let app = harness.app(&space, "web-app", false).await;
    let deployment = harness.deployment(app.guid()).await;
    harness
        .grant(&user, RoleType::OrganizationManager, organization.guid())
        .await;

    let response = get_deployment_handler(
        State(harness.state.clone()),
        Extension(user),
        Path(deployment.guid().as_str().to_owned()),
    )
    .await;

    let Ok(Json(response)) = response else {
        panic!("deployment should be visible");
    };
    let presented = serde_json::to_value(response).unwrap_or_default();

    assert_eq!(presented["revision"], Value::Null);
}

#[tokio::test]
async fn invisible_deployment_is_not_found() {
    let harness = harness();
    let organization = harness.organization().await;
    let space = harness.space(&organization, "dev").await;
    let app = harness.app(&space, "web-app", true).await;
    let deployment = harness.deployment(app.guid()).await;

    let response = get_deployment_handler(
        State(harness.state.clone()),
        Extension(user()),
        Path(deployment.guid().as_str().to_owned()),
    )
    .await;

    assert!(matches!(response, Err(ApiError(AppError::NotFound(_)))));
}

#[tokio::test]
async fn deployment_of_a_missing_app_is_an_internal_error() {
    let harness = harness();
    let deployment = harness.deployment(&Guid::generate()).await;

    let response = get_deployment_handler(
        State(harness.state.clone()),
        Extension(user()),
        Path(deployment.guid().as_str().to_owned()),
    )
    .await;

    assert!(matches!(response, Err(ApiError(AppError::Internal(_)))));
}

#[tokio::test]
async fn listing_skips_orphans_and_invisible_deployments() {
    let harness = harness();
    let user = user();
    let organization = harness.organization().await;
    let visible_space = harness.space(&organization, "visible").await;
    let hidden_space = harness.space(&organization, "hidden").await;
    let visible_app = harness.app(&visible_space, "web-app", true).await;
    let hidden_app = harness.app(&hidden_space, "web-app", true).await;
    let visible = harness.deployment(visible_app.guid()).await;
    harness.deployment(hidden_app.guid()).await;
    harness.deployment(&Guid::generate()).await;
    harness
        .grant(&user, RoleType::SpaceAuditor, visible_space.guid())
        .await;

    let response = list_deployments_handler(State(harness.state.clone()), Extension(user)).await;

    let Ok(Json(deployments)) = response else {
        panic!("listing should succeed");
    };
    let guids: Vec<&str> = deployments
        .iter()
        .map(|deployment| deployment.guid.as_str())
        .collect();

    assert_eq!(guids, vec![visible.guid().as_str()]);
}
