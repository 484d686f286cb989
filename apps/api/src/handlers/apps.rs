use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use nimbus_application::CreateAppInput;
use nimbus_core::{Guid, UserAuditInfo};
use serde_json::Value;

use super::decode_request;
use crate::dto::{AppResponse, CreateAppRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_apps_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuditInfo>,
) -> ApiResult<Json<Vec<AppResponse>>> {
    let apps = state
        .app_service
        .list_apps(&user)
        .await?
        .iter()
        .map(|app| AppResponse::present(app, &state.url_builder))
        .collect();

    Ok(Json(apps))
}

pub async fn create_app_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuditInfo>,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<AppResponse>)> {
    let request: CreateAppRequest = decode_request(&payload)?;
    let app = state
        .app_service
        .create_app(
            &user,
            CreateAppInput {
                name: request.name,
                space_guid: Guid::parse(request.relationships.space.data.guid)?,
                enable_ssh: request.enable_ssh,
                environment_variables: request.environment_variables,
            },
            payload,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AppResponse::present(&app, &state.url_builder)),
    ))
}
