use serde::{Deserialize, Serialize};

use crate::Guid;

/// Identity of the authenticated principal, as supplied by the auth layer.
///
/// Read-only input to audit recording and visibility checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAuditInfo {
    user_guid: Guid,
    user_email: Option<String>,
    user_name: Option<String>,
}

impl UserAuditInfo {
    /// Creates a principal bundle from authentication data.
    #[must_use]
    pub fn new(user_guid: Guid, user_email: Option<String>, user_name: Option<String>) -> Self {
        Self {
            user_guid,
            user_email: user_email.filter(|value| !value.trim().is_empty()),
            user_name: user_name.filter(|value| !value.trim().is_empty()),
        }
    }

    /// Returns the stable user guid.
    #[must_use]
    pub fn user_guid(&self) -> &Guid {
        &self.user_guid
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }

    /// Returns the display user name, if the provider returned one.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }
}
