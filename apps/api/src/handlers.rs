pub mod apps;
pub mod deployments;
pub mod events;
pub mod health;
pub mod spaces;

#[cfg(test)]
mod test_support;

use nimbus_core::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes a request body while keeping the raw payload for audit metadata.
fn decode_request<T: DeserializeOwned>(payload: &Value) -> Result<T, AppError> {
    serde_json::from_value(payload.clone())
        .map_err(|error| AppError::Validation(format!("invalid request body: {error}")))
}
