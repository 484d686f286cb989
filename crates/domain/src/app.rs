use nimbus_core::{AppError, AppResult, Guid, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Application owned by a space.
///
/// `revisions_enabled` is part of the loaded state so presenters never need to
/// consult global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppModel {
    guid: Guid,
    name: NonEmptyString,
    space_guid: Guid,
    revisions_enabled: bool,
    enable_ssh: bool,
    droplet_guid: Option<Guid>,
    environment_variables: Map<String, Value>,
}

impl AppModel {
    /// Creates a validated app with an empty environment.
    pub fn new(
        guid: Guid,
        name: impl Into<String>,
        space_guid: Guid,
        revisions_enabled: bool,
        enable_ssh: bool,
        droplet_guid: Option<Guid>,
    ) -> AppResult<Self> {
        Ok(Self {
            guid,
            name: validate_app_name(name)?,
            space_guid,
            revisions_enabled,
            enable_ssh,
            droplet_guid,
            environment_variables: Map::new(),
        })
    }

    /// Replaces the app environment after validating it.
    pub fn with_environment_variables(mut self, environment_variables: Value) -> AppResult<Self> {
        self.environment_variables = validate_environment_variables(environment_variables)?;
        Ok(self)
    }

    /// Returns the app guid.
    #[must_use]
    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    /// Returns the validated app name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the owning space guid.
    #[must_use]
    pub fn space_guid(&self) -> &Guid {
        &self.space_guid
    }

    /// Returns whether deployments of this app carry revisions.
    #[must_use]
    pub fn revisions_enabled(&self) -> bool {
        self.revisions_enabled
    }

    /// Returns whether SSH access to app instances is enabled.
    #[must_use]
    pub fn enable_ssh(&self) -> bool {
        self.enable_ssh
    }

    /// Returns the current droplet guid, if one is assigned.
    #[must_use]
    pub fn droplet_guid(&self) -> Option<&Guid> {
        self.droplet_guid.as_ref()
    }

    /// Returns the user-provided environment variables.
    #[must_use]
    pub fn environment_variables(&self) -> &Map<String, Value> {
        &self.environment_variables
    }

    /// Returns the key used to enforce case-insensitive name uniqueness.
    #[must_use]
    pub fn name_uniqueness_key(&self) -> String {
        self.name.as_str().to_lowercase()
    }
}

/// Validates and normalizes an app name.
///
/// Surrounding whitespace is stripped. Printable ASCII, backslashes and
/// unicode are accepted; control characters such as newline or escape are not.
pub fn validate_app_name(name: impl Into<String>) -> AppResult<NonEmptyString> {
    let name: String = name.into();
    let trimmed = name.trim();

    if let Some(invalid) = trimmed.chars().find(|character| character.is_control()) {
        return Err(AppError::Validation(format!(
            "name must not contain control characters (found {invalid:?})"
        )));
    }

    NonEmptyString::new(trimmed)
}

/// Validates an app environment.
///
/// The environment must be a JSON object. Names must be non-empty and must
/// not use the reserved `VCAP_` or `VMC_` prefixes in any case. `PORT` is
/// assigned by the platform and cannot be set.
pub fn validate_environment_variables(value: Value) -> AppResult<Map<String, Value>> {
    let Value::Object(variables) = value else {
        return Err(AppError::Validation("environment_variables must be a hash".to_owned()));
    };

    for name in variables.keys() {
        if name.is_empty() {
            return Err(AppError::Validation(
                "environment variable names must not be empty".to_owned(),
            ));
        }

        let upper = name.to_ascii_uppercase();
        if upper.starts_with("VCAP_") || upper.starts_with("VMC_") {
            return Err(AppError::Validation(format!(
                "environment variable '{name}' cannot start with VCAP_ or VMC_"
            )));
        }
        if name == "PORT" {
            return Err(AppError::Validation(
                "environment variable 'PORT' is reserved".to_owned(),
            ));
        }
    }

    Ok(variables)
}
