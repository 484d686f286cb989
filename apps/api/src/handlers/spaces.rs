use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use nimbus_application::{CreateSpaceInput, UpdateSpaceInput};
use nimbus_core::{Guid, UserAuditInfo};
use serde_json::Value;

use super::decode_request;
use crate::dto::{CreateSpaceRequest, DeleteSpaceQuery, SpaceResponse, UpdateSpaceRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_spaces_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuditInfo>,
) -> ApiResult<Json<Vec<SpaceResponse>>> {
    let spaces = state
        .space_service
        .list_spaces(&user)
        .await?
        .iter()
        .map(|space| SpaceResponse::present(space, &state.url_builder))
        .collect();

    Ok(Json(spaces))
}

pub async fn create_space_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuditInfo>,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<SpaceResponse>)> {
    let request: CreateSpaceRequest = decode_request(&payload)?;
    let space = state
        .space_service
        .create_space(
            &user,
            CreateSpaceInput {
                name: request.name,
                organization_guid: Guid::parse(request.relationships.organization.data.guid)?,
            },
            payload,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SpaceResponse::present(&space, &state.url_builder)),
    ))
}

pub async fn update_space_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuditInfo>,
    Path(space_guid): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<SpaceResponse>> {
    let space_guid = Guid::parse(space_guid)?;
    let request: UpdateSpaceRequest = decode_request(&payload)?;
    let space = state
        .space_service
        .update_space(
            &user,
            &space_guid,
            UpdateSpaceInput { name: request.name },
            payload,
        )
        .await?;

    Ok(Json(SpaceResponse::present(&space, &state.url_builder)))
}

pub async fn delete_space_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuditInfo>,
    Path(space_guid): Path<String>,
    Query(query): Query<DeleteSpaceQuery>,
) -> ApiResult<StatusCode> {
    let space_guid = Guid::parse(space_guid)?;
    state
        .space_service
        .delete_space(&user, &space_guid, query.recursive.unwrap_or(false))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;
