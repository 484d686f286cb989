use axum::Json;
use axum::extract::{Extension, Query, State};
use nimbus_application::{AppRepository as _, MAX_EVENTS_PER_PAGE};
use nimbus_core::{AppError, Guid};
use nimbus_domain::{AuditEventType, RoleType};
use serde_json::json;

use super::{audit_event_query, list_audit_events_handler};
use crate::dto::AuditEventListQuery;
use crate::handlers::apps::create_app_handler;
use crate::handlers::test_support::{harness, user};

#[test]
fn defaults_to_the_first_page_of_fifty() {
    let query = audit_event_query(AuditEventListQuery::default());

    assert!(query.is_ok_and(|query| query.limit == 50 && query.offset == 0));
}

#[test]
fn pages_are_one_based_and_per_page_is_capped() {
    let query = audit_event_query(AuditEventListQuery {
        page: Some(3),
        per_page: Some(10_000),
        ..AuditEventListQuery::default()
    });

    assert!(query.is_ok_and(|query| {
        query.limit == MAX_EVENTS_PER_PAGE && query.offset == 2 * MAX_EVENTS_PER_PAGE
    }));
}

#[test]
fn zero_page_or_page_size_is_rejected() {
    let zero_page = audit_event_query(AuditEventListQuery {
        page: Some(0),
        ..AuditEventListQuery::default()
    });
    let zero_per_page = audit_event_query(AuditEventListQuery {
        per_page: Some(0),
        ..AuditEventListQuery::default()
    });

    assert!(matches!(zero_page, Err(AppError::Validation(_))));
    assert!(matches!(zero_per_page, Err(AppError::Validation(_))));
}

#[test]
fn deep_pages_keep_their_exact_offset() {
    let query = audit_event_query(AuditEventListQuery {
        page: Some(102),
        per_page: Some(50),
        ..AuditEventListQuery::default()
    });

    assert!(query.is_ok_and(|query| query.offset == 5_050));
}

#[test]
fn page_whose_offset_overflows_is_rejected() {
    let query = audit_event_query(AuditEventListQuery {
        page: Some(usize::MAX),
        per_page: Some(2),
        ..AuditEventListQuery::default()
    });

    assert!(matches!(query, Err(AppError::Validation(_))));
}

#[test]
fn comma_separated_filters_are_parsed() {
    let query = audit_event_query(AuditEventListQuery {
        types: Some("audit.space.create, audit.app.create,".to_owned()),
        space_guids: Some("space-1,space-2".to_owned()),
        ..AuditEventListQuery::default()
    })
    .unwrap_or_else(|error| panic!("query should parse: {error}"));

    assert_eq!(
        query.event_types,
        vec![AuditEventType::SpaceCreate, AuditEventType::AppCreate]
    );
    assert_eq!(
        query.space_guids,
        vec![
            Guid::parse("space-1").unwrap_or_else(|_| unreachable!()),
            Guid::parse("space-2").unwrap_or_else(|_| unreachable!()),
        ]
    );
}

#[test]
fn unknown_event_type_is_rejected() {
    let query = audit_event_query(AuditEventListQuery {
        types: Some("audit.space.launch".to_owned()),
        ..AuditEventListQuery::default()
    });

    assert!(matches!(query, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn events_are_filtered_by_type_and_visibility() {
    let harness = harness();
    let developer = user();
    let outsider = user();
    let organization = harness.organization().await;
    let space = harness.space(&organization, "dev").await;
    harness
        .grant(&developer, RoleType::SpaceDeveloper, space.guid())
        .await;

    let created = create_app_handler(
        State(harness.state.clone()),
        Extension(developer.clone()),
        Json(json!({
            "name": "web-app",
            "relationships": { "space": { "data": { "guid": space.guid().as_str() } } }
        })),
    )
    .await;
    assert!(created.is_ok());
    assert_eq!(
        harness
            .store
            .count_apps_in_space(space.guid())
            .await
            .unwrap_or_default(),
        1
    );

    let listed = list_audit_events_handler(
        State(harness.state.clone()),
        Extension(developer),
        Query(AuditEventListQuery {
            types: Some("audit.app.create".to_owned()),
            ..AuditEventListQuery::default()
        }),
    )
    .await;
    let Ok(Json(events)) = listed else {
        panic!("listing should succeed");
    };
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "audit.app.create");
    assert_eq!(events[0].target.target_type, "app");
    assert_eq!(events[0].target.name, "web-app");

    let hidden = list_audit_events_handler(
        State(harness.state.clone()),
        Extension(outsider),
        Query(AuditEventListQuery::default()),
    )
    .await;
    assert!(hidden.is_ok_and(|Json(events)| events.is_empty()));
}
