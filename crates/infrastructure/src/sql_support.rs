use nimbus_core::{AppError, AppResult, Guid};

/// PostgreSQL `unique_violation` SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(database_error) = error
        && database_error.code().as_deref() == Some(UNIQUE_VIOLATION)
    {
        return true;
    }

    false
}

pub(crate) fn stored_guid(value: String, column: &str) -> AppResult<Guid> {
    Guid::parse(value).map_err(|error| {
        AppError::Internal(format!("invalid guid stored in column '{column}': {error}"))
    })
}

pub(crate) fn stored_optional_guid(value: Option<String>, column: &str) -> AppResult<Option<Guid>> {
    value.map(|value| stored_guid(value, column)).transpose()
}

/// Reports a stored row that no longer decodes into its domain type as a
/// storage fault rather than a client error.
pub(crate) fn stored_record<T>(decoded: AppResult<T>, record: &str) -> AppResult<T> {
    decoded.map_err(|error| match error {
        AppError::Internal(_) => error,
        other => AppError::Internal(format!("invalid {record} stored: {other}")),
    })
}

pub(crate) fn guid_strings(guids: &[Guid]) -> Vec<String> {
    guids.iter().map(|guid| guid.as_str().to_owned()).collect()
}
