use std::sync::Arc;

use nimbus_core::{AppError, AppResult, Guid, UserAuditInfo};
use nimbus_domain::{AppModel, access};
use serde_json::Value;
use tracing::info;

use crate::{AppRepository, EventService, VisibilityService};

/// Input payload for app creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAppInput {
    /// Requested app name.
    pub name: String,
    /// Owning space.
    pub space_guid: Guid,
    /// Explicit SSH setting; the configured default applies when absent.
    pub enable_ssh: Option<bool>,
    /// Initial environment; must be a JSON object when present.
    pub environment_variables: Option<Value>,
}

/// Platform defaults applied to new apps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppDefaults {
    /// SSH access for apps that do not set it explicitly.
    pub default_app_ssh_access: bool,
    /// Whether new apps track revisions.
    pub revisions_enabled: bool,
}

impl Default for AppDefaults {
    fn default() -> Self {
        Self {
            default_app_ssh_access: true,
            revisions_enabled: true,
        }
    }
}

/// Application service for apps.
#[derive(Clone)]
pub struct AppService {
    repository: Arc<dyn AppRepository>,
    visibility: VisibilityService,
    events: EventService,
    defaults: AppDefaults,
}

impl AppService {
    /// Creates an app service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AppRepository>,
        visibility: VisibilityService,
        events: EventService,
        defaults: AppDefaults,
    ) -> Self {
        Self {
            repository,
            visibility,
            events,
            defaults,
        }
    }

    /// Lists the apps visible to the caller.
    pub async fn list_apps(&self, user: &UserAuditInfo) -> AppResult<Vec<AppModel>> {
        let apps = self.repository.list_apps().await?;

        self.visibility
            .filter_space_owned(
                user,
                apps,
                |app| app.guid().clone(),
                |app| Some(app.space_guid().clone()),
            )
            .await
    }

    /// Creates an app and records `audit.app.create`.
    pub async fn create_app(
        &self,
        user: &UserAuditInfo,
        input: CreateAppInput,
        request: Value,
    ) -> AppResult<AppModel> {
        let visible = self
            .visibility
            .require_visible_space(user, &input.space_guid)
            .await?;
        if !access::can_write_apps(&visible.roles, &visible.scope) {
            return Err(AppError::Forbidden(format!(
                "user '{}' may not create apps in space '{}'",
                user.user_guid(),
                input.space_guid
            )));
        }

        let mut app = AppModel::new(
            Guid::generate(),
            input.name,
            input.space_guid,
            self.defaults.revisions_enabled,
            input
                .enable_ssh
                .unwrap_or(self.defaults.default_app_ssh_access),
            None,
        )?;
        if let Some(environment_variables) = input.environment_variables {
            app = app.with_environment_variables(environment_variables)?;
        }

        self.repository.create_app(app.clone()).await?;
        self.events
            .record_app_create(&app, &visible.space, user, request)
            .await?;

        info!(app_guid = %app.guid(), space_guid = %app.space_guid(), "created app");

        Ok(app)
    }
}
