use nimbus_core::{AppResult, Guid, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Top-level tenancy boundary that owns spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    guid: Guid,
    name: NonEmptyString,
}

impl Organization {
    /// Creates a validated organization.
    pub fn new(guid: Guid, name: impl Into<String>) -> AppResult<Self> {
        let name: String = name.into();
        Ok(Self {
            guid,
            name: NonEmptyString::new(name.trim())?,
        })
    }

    /// Returns the organization guid.
    #[must_use]
    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    /// Returns the organization name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }
}

/// Deployment target inside an organization; owns apps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    guid: Guid,
    name: NonEmptyString,
    organization_guid: Guid,
}

impl Space {
    /// Creates a validated space.
    pub fn new(guid: Guid, name: impl Into<String>, organization_guid: Guid) -> AppResult<Self> {
        let name: String = name.into();
        Ok(Self {
            guid,
            name: NonEmptyString::new(name.trim())?,
            organization_guid,
        })
    }

    /// Returns the space guid.
    #[must_use]
    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    /// Returns the space name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the owning organization guid.
    #[must_use]
    pub fn organization_guid(&self) -> &Guid {
        &self.organization_guid
    }

    /// Returns a copy with a new name, keeping identity and ownership.
    pub fn renamed(&self, name: impl Into<String>) -> AppResult<Self> {
        Self::new(self.guid.clone(), name, self.organization_guid.clone())
    }

    /// Returns the key used to enforce case-insensitive name uniqueness.
    #[must_use]
    pub fn name_uniqueness_key(&self) -> String {
        self.name.as_str().to_lowercase()
    }
}
