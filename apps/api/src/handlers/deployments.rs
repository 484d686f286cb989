use axum::Json;
use axum::extract::{Extension, Path, State};
use nimbus_application::DeploymentDetails;
use nimbus_core::{AppResult, Guid, UserAuditInfo};

use crate::dto::{DeploymentResponse, present_deployment};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::url_builder::ApiUrlBuilder;

pub async fn list_deployments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuditInfo>,
) -> ApiResult<Json<Vec<DeploymentResponse>>> {
    let deployments = state
        .deployment_service
        .list_deployments(&user)
        .await?
        .iter()
        .map(|details| present(details, &state.url_builder))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(deployments))
}

pub async fn get_deployment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuditInfo>,
    Path(deployment_guid): Path<String>,
) -> ApiResult<Json<DeploymentResponse>> {
    let deployment_guid = Guid::parse(deployment_guid)?;
    let details = state
        .deployment_service
        .get_deployment(&user, &deployment_guid)
        .await?;

    Ok(Json(present(&details, &state.url_builder)?))
}

fn present(
    details: &DeploymentDetails,
    url_builder: &ApiUrlBuilder,
) -> AppResult<DeploymentResponse> {
    present_deployment(
        &details.deployment,
        Some(&details.app),
        &details.historical_processes,
        url_builder,
    )
}

#[cfg(test)]
mod tests;
