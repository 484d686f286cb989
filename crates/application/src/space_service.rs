use std::sync::Arc;

use nimbus_core::{AppError, AppResult, Guid, UserAuditInfo};
use nimbus_domain::{Space, access};
use serde_json::Value;
use tracing::info;

use crate::visibility_service::scope_of_space;
use crate::{AppRepository, EventService, SpaceRepository, VisibilityService};

/// Input payload for space creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpaceInput {
    /// Requested space name.
    pub name: String,
    /// Owning organization.
    pub organization_guid: Guid,
}

/// Input payload for space updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSpaceInput {
    /// New space name, when renaming.
    pub name: Option<String>,
}

/// Application service for space lifecycle operations.
#[derive(Clone)]
pub struct SpaceService {
    repository: Arc<dyn SpaceRepository>,
    app_repository: Arc<dyn AppRepository>,
    visibility: VisibilityService,
    events: EventService,
}

impl SpaceService {
    /// Creates a space service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SpaceRepository>,
        app_repository: Arc<dyn AppRepository>,
        visibility: VisibilityService,
        events: EventService,
    ) -> Self {
        Self {
            repository,
            app_repository,
            visibility,
            events,
        }
    }

    /// Lists the spaces visible to the caller.
    pub async fn list_spaces(&self, user: &UserAuditInfo) -> AppResult<Vec<Space>> {
        let spaces = self.repository.list_spaces().await?;
        let roles = self.visibility.principal_roles(user).await?;

        Ok(access::filter_visible(
            &roles,
            spaces,
            |space| space.guid().clone(),
            |space| Some(scope_of_space(space)),
        ))
    }

    /// Creates a space and records `audit.space.create`.
    ///
    /// `request` is stored verbatim as the event's request metadata.
    pub async fn create_space(
        &self,
        user: &UserAuditInfo,
        input: CreateSpaceInput,
        request: Value,
    ) -> AppResult<Space> {
        let organization_guid = input.organization_guid;
        let not_found =
            || AppError::NotFound(format!("organization '{organization_guid}' not found"));

        let organization = self
            .repository
            .find_organization(&organization_guid)
            .await?
            .ok_or_else(not_found)?;

        let roles = self.visibility.principal_roles(user).await?;
        if !access::can_create_space(&roles, organization.guid()) {
            if roles.holds_any_role_on(organization.guid()) {
                return Err(AppError::Forbidden(format!(
                    "user '{}' may not create spaces in organization '{}'",
                    user.user_guid(),
                    organization.guid()
                )));
            }
            return Err(not_found());
        }

        let space = Space::new(Guid::generate(), input.name, organization.guid().clone())?;
        self.repository.create_space(space.clone()).await?;
        self.events.record_space_create(&space, user, request).await?;

        info!(
            space_guid = %space.guid(),
            organization_guid = %organization.guid(),
            "created space"
        );

        Ok(space)
    }

    /// Updates a space and records `audit.space.update`.
    pub async fn update_space(
        &self,
        user: &UserAuditInfo,
        space_guid: &Guid,
        input: UpdateSpaceInput,
        request: Value,
    ) -> AppResult<Space> {
        let visible = self
            .visibility
            .require_visible_space(user, space_guid)
            .await?;
        if !access::can_manage_space(&visible.roles, &visible.scope) {
            return Err(forbidden_space_write(user, space_guid));
        }

        let space = match input.name {
            Some(name) => visible.space.renamed(name)?,
            None => visible.space,
        };

        self.repository.update_space(space.clone()).await?;
        self.events.record_space_update(&space, user, request).await?;

        info!(space_guid = %space.guid(), "updated space");

        Ok(space)
    }

    /// Records `audit.space.delete-request` and deletes the space.
    ///
    /// A non-recursive delete of a space that still holds apps is rejected.
    pub async fn delete_space(
        &self,
        user: &UserAuditInfo,
        space_guid: &Guid,
        recursive: bool,
    ) -> AppResult<()> {
        let visible = self
            .visibility
            .require_visible_space(user, space_guid)
            .await?;
        if !access::can_manage_space(&visible.roles, &visible.scope) {
            return Err(forbidden_space_write(user, space_guid));
        }

        if !recursive {
            let app_count = self.app_repository.count_apps_in_space(space_guid).await?;
            if app_count > 0 {
                return Err(AppError::Conflict(format!(
                    "space '{space_guid}' contains {app_count} app(s); delete recursively to remove them"
                )));
            }
        }

        self.events
            .record_space_delete_request(&visible.space, user, recursive)
            .await?;
        self.repository.delete_space(space_guid, recursive).await?;

        info!(space_guid = %space_guid, recursive, "deleted space");

        Ok(())
    }
}

fn forbidden_space_write(user: &UserAuditInfo, space_guid: &Guid) -> AppError {
    AppError::Forbidden(format!(
        "user '{}' may not modify space '{space_guid}'",
        user.user_guid()
    ))
}
