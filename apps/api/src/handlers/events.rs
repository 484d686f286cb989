use axum::Json;
use axum::extract::{Extension, Query, State};
use nimbus_application::{AuditEventQuery, MAX_EVENTS_PER_PAGE};
use nimbus_core::{AppError, Guid, UserAuditInfo};
use nimbus_domain::AuditEventType;

use crate::dto::{AuditEventListQuery, AuditEventResponse};
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_EVENTS_PER_PAGE: usize = 50;

pub async fn list_audit_events_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuditInfo>,
    Query(query): Query<AuditEventListQuery>,
) -> ApiResult<Json<Vec<AuditEventResponse>>> {
    let events = state
        .event_service
        .list_events(&user, audit_event_query(query)?)
        .await?
        .into_iter()
        .map(AuditEventResponse::from)
        .collect();

    Ok(Json(events))
}

fn audit_event_query(query: AuditEventListQuery) -> Result<AuditEventQuery, AppError> {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(AppError::Validation("page must be at least 1".to_owned()));
    }

    let per_page = query.per_page.unwrap_or(DEFAULT_EVENTS_PER_PAGE);
    if per_page == 0 {
        return Err(AppError::Validation("per_page must be at least 1".to_owned()));
    }
    let per_page = per_page.min(MAX_EVENTS_PER_PAGE);
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| AppError::Validation(format!("page {page} is out of range")))?;

    let event_types = comma_separated(query.types.as_deref())
        .map(str::parse::<AuditEventType>)
        .collect::<Result<Vec<_>, _>>()?;
    let space_guids = comma_separated(query.space_guids.as_deref())
        .map(Guid::parse)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AuditEventQuery {
        limit: per_page,
        offset,
        event_types,
        space_guids,
        ..AuditEventQuery::default()
    })
}

fn comma_separated(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests;
