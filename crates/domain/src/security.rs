use std::str::FromStr;

use nimbus_core::{AppError, Guid};
use serde::{Deserialize, Serialize};

/// Whether a role is granted on a space or on an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// Role scoped to one space.
    Space,
    /// Role scoped to one organization.
    Organization,
}

/// Role types a user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Pushes and manages apps in a space.
    SpaceDeveloper,
    /// Reads everything in a space.
    SpaceAuditor,
    /// Manages a space and its roles.
    SpaceManager,
    /// Troubleshoots apps in a space without reading secrets.
    SpaceSupporter,
    /// Manages an organization, its spaces and roles.
    OrganizationManager,
    /// Reads organization-level settings.
    OrganizationAuditor,
    /// Manages organization billing.
    OrganizationBillingManager,
    /// Plain organization member.
    OrganizationUser,
}

impl RoleType {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpaceDeveloper => "space_developer",
            Self::SpaceAuditor => "space_auditor",
            Self::SpaceManager => "space_manager",
            Self::SpaceSupporter => "space_supporter",
            Self::OrganizationManager => "organization_manager",
            Self::OrganizationAuditor => "organization_auditor",
            Self::OrganizationBillingManager => "organization_billing_manager",
            Self::OrganizationUser => "organization_user",
        }
    }

    /// Returns the kind of resource this role is granted on.
    #[must_use]
    pub fn scope(&self) -> RoleScope {
        match self {
            Self::SpaceDeveloper
            | Self::SpaceAuditor
            | Self::SpaceManager
            | Self::SpaceSupporter => RoleScope::Space,
            Self::OrganizationManager
            | Self::OrganizationAuditor
            | Self::OrganizationBillingManager
            | Self::OrganizationUser => RoleScope::Organization,
        }
    }

    /// Returns all known role types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RoleType] = &[
            RoleType::SpaceDeveloper,
            RoleType::SpaceAuditor,
            RoleType::SpaceManager,
            RoleType::SpaceSupporter,
            RoleType::OrganizationManager,
            RoleType::OrganizationAuditor,
            RoleType::OrganizationBillingManager,
            RoleType::OrganizationUser,
        ];

        ALL
    }
}

impl FromStr for RoleType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown role type '{value}'")))
    }
}

/// One role granted to a user on a space or organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleMembership {
    user_guid: Guid,
    role: RoleType,
    scope_guid: Guid,
}

impl RoleMembership {
    /// Creates a role membership.
    #[must_use]
    pub fn new(user_guid: Guid, role: RoleType, scope_guid: Guid) -> Self {
        Self {
            user_guid,
            role,
            scope_guid,
        }
    }

    /// Returns the member user guid.
    #[must_use]
    pub fn user_guid(&self) -> &Guid {
        &self.user_guid
    }

    /// Returns the granted role.
    #[must_use]
    pub fn role(&self) -> RoleType {
        self.role
    }

    /// Returns the space or organization guid the role applies to.
    #[must_use]
    pub fn scope_guid(&self) -> &Guid {
        &self.scope_guid
    }
}

/// Audited lifecycle actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditEventType {
    /// A space was created.
    SpaceCreate,
    /// A space was updated.
    SpaceUpdate,
    /// Deletion of a space was requested.
    SpaceDeleteRequest,
    /// An app was created.
    AppCreate,
    /// An app was updated.
    AppUpdate,
    /// Deletion of an app was requested.
    AppDeleteRequest,
}

impl AuditEventType {
    /// Returns a stable storage value for this event type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpaceCreate => "audit.space.create",
            Self::SpaceUpdate => "audit.space.update",
            Self::SpaceDeleteRequest => "audit.space.delete-request",
            Self::AppCreate => "audit.app.create",
            Self::AppUpdate => "audit.app.update",
            Self::AppDeleteRequest => "audit.app.delete-request",
        }
    }

    /// Returns all known event types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuditEventType] = &[
            AuditEventType::SpaceCreate,
            AuditEventType::SpaceUpdate,
            AuditEventType::SpaceDeleteRequest,
            AuditEventType::AppCreate,
            AuditEventType::AppUpdate,
            AuditEventType::AppDeleteRequest,
        ];

        ALL
    }
}

impl FromStr for AuditEventType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|event_type| event_type.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown audit event type '{value}'")))
    }
}

/// Kind of resource an audit event acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActeeType {
    /// A space.
    Space,
    /// An app.
    App,
}

impl ActeeType {
    /// Returns a stable storage value for this actee type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::App => "app",
        }
    }
}

impl FromStr for ActeeType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "space" => Ok(Self::Space),
            "app" => Ok(Self::App),
            _ => Err(AppError::Validation(format!(
                "unknown actee type '{value}'"
            ))),
        }
    }
}
