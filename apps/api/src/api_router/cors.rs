use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use nimbus_core::AppError;
use tower_http::cors::CorsLayer;

use crate::middleware::{USER_EMAIL_HEADER, USER_GUID_HEADER, USER_NAME_HEADER};

pub(super) fn build_cors_layer(allowed_origin: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(allowed_origin).map_err(|error| {
            AppError::Internal(format!("invalid CORS_ALLOWED_ORIGIN: {error}"))
        })?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(USER_GUID_HEADER),
            HeaderName::from_static(USER_EMAIL_HEADER),
            HeaderName::from_static(USER_NAME_HEADER),
        ]))
}
