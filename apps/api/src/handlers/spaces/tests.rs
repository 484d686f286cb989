use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use nimbus_core::{AppError, UserAuditInfo};
use nimbus_domain::RoleType;
use serde_json::json;

use super::{create_space_handler, delete_space_handler, list_spaces_handler, update_space_handler};
use crate::dto::{AuditEventListQuery, AuditEventResponse, DeleteSpaceQuery};
use crate::error::ApiError;
use crate::handlers::events::list_audit_events_handler;
use crate::handlers::test_support::{Harness, harness, user};

async fn events_seen_by(harness: &Harness, user: &UserAuditInfo) -> Vec<AuditEventResponse> {
    let response = list_audit_events_handler(
        State(harness.state.clone()),
        Extension(user.clone()),
        Query(AuditEventListQuery::default()),
    )
    .await;

    response.map(|Json(events)| events).unwrap_or_default()
}

#[tokio::test]
async fn organization_manager_creates_a_space_and_an_audit_event() {
    let harness = harness();
    let user = user();
    let organization = harness.organization().await;
    harness
        .grant(&user, RoleType::OrganizationManager, organization.guid())
        .await;
    let payload = json!({
        "name": "staging",
        "relationships": { "organization": { "data": { "guid": organization.guid().as_str() } } }
    });

    let response = create_space_handler(
        State(harness.state.clone()),
        Extension(user.clone()),
        Json(payload.clone()),
    )
    .await;

    let Ok((status, Json(space))) = response else {
        panic!("space creation should succeed");
    };
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(space.name, "staging");
    assert_eq!(
        space.links.organization.href,
        format!("https://api.example.com/v3/organizations/{}", organization.guid())
    );

    let events = events_seen_by(&harness, &user).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "audit.space.create");
    assert_eq!(events[0].target.guid, space.guid);
    assert_eq!(events[0].actor.name.as_deref(), Some("user@example.com"));
    assert_eq!(events[0].data, json!({ "request": payload }));
    assert_eq!(events[0].space.guid.as_deref(), Some(space.guid.as_str()));
}

#[tokio::test]
async fn space_developer_cannot_create_spaces() {
    let harness = harness();
    let user = user();
    let organization = harness.organization().await;
    let space = harness.space(&organization, "dev").await;
    harness
        .grant(&user, RoleType::SpaceDeveloper, space.guid())
        .await;

    let response = create_space_handler(
        State(harness.state.clone()),
        Extension(user),
        Json(json!({
            "name": "staging",
            "relationships": {
                "organization": { "data": { "guid": organization.guid().as_str() } }
            }
        })),
    )
    .await;

    assert!(matches!(response, Err(ApiError(AppError::NotFound(_)))));
}

#[tokio::test]
async fn space_manager_renames_a_space() {
    let harness = harness();
    let user = user();
    let organization = harness.organization().await;
    let space = harness.space(&organization, "dev").await;
    harness
        .grant(&user, RoleType::SpaceManager, space.guid())
        .await;

    let response = update_space_handler(
        State(harness.state.clone()),
        Extension(user.clone()),
        Path(space.guid().as_str().to_owned()),
        Json(json!({ "name": "development" })),
    )
    .await;

    assert!(response.is_ok_and(|Json(space)| space.name == "development"));

    let listed = list_spaces_handler(State(harness.state.clone()), Extension(user)).await;
    let Ok(Json(listed)) = listed else {
        panic!("listing should succeed");
    };
    let names: Vec<&str> = listed.iter().map(|space| space.name.as_str()).collect();
    assert_eq!(names, vec!["development"]);
}

#[tokio::test]
async fn non_recursive_delete_of_a_space_with_apps_is_a_conflict() {
    let harness = harness();
    let user = user();
    let organization = harness.organization().await;
    let space = harness.space(&organization, "dev").await;
    harness.app(&space, "web-app", true).await;
    harness
        .grant(&user, RoleType::OrganizationManager, organization.guid())
        .await;

    let response = delete_space_handler(
        State(harness.state.clone()),
        Extension(user.clone()),
        Path(space.guid().as_str().to_owned()),
        Query(DeleteSpaceQuery::default()),
    )
    .await;

    assert!(matches!(response, Err(ApiError(AppError::Conflict(_)))));
    assert!(events_seen_by(&harness, &user).await.is_empty());
}

#[tokio::test]
async fn recursive_delete_records_a_delete_request_that_outlives_the_space() {
    let harness = harness();
    let user = user();
    let organization = harness.organization().await;
    let space = harness.space(&organization, "dev").await;
    harness.app(&space, "web-app", true).await;
    harness
        .grant(&user, RoleType::OrganizationManager, organization.guid())
        .await;

    let response = delete_space_handler(
        State(harness.state.clone()),
        Extension(user.clone()),
        Path(space.guid().as_str().to_owned()),
        Query(DeleteSpaceQuery {
            recursive: Some(true),
        }),
    )
    .await;

    assert!(response.is_ok_and(|status| status == StatusCode::NO_CONTENT));

    let events = events_seen_by(&harness, &user).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "audit.space.delete-request");
    assert_eq!(events[0].data, json!({ "request": { "recursive": true } }));
    assert_eq!(events[0].space.guid.as_deref(), Some(space.guid().as_str()));
    assert_eq!(
        events[0].organization.guid.as_deref(),
        Some(organization.guid().as_str())
    );
}
