use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use nimbus_core::{AppError, Guid, UserAuditInfo};

use crate::error::ApiResult;

pub const USER_GUID_HEADER: &str = "x-user-guid";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Builds the caller identity from headers set by the authenticating proxy.
pub async fn require_auth(mut request: Request, next: Next) -> ApiResult<Response> {
    let user = user_from_headers(request.headers())?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn user_from_headers(headers: &HeaderMap) -> Result<UserAuditInfo, AppError> {
    let user_guid = header_value(headers, USER_GUID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let user_guid = Guid::parse(user_guid)
        .map_err(|_| AppError::Unauthorized("invalid user identity".to_owned()))?;

    Ok(UserAuditInfo::new(
        user_guid,
        header_value(headers, USER_EMAIL_HEADER),
        header_value(headers, USER_NAME_HEADER),
    ))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
