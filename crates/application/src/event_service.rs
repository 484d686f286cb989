use std::sync::Arc;

use nimbus_core::{AppResult, Guid, UserAuditInfo};
use nimbus_domain::{ActeeType, AppModel, AuditEventType, Space, VisibilityScope, access};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    ACTOR_TYPE_USER, AuditEventQuery, EventRepository, NewAuditEvent, RecordedAuditEvent,
    VisibilityService,
};

/// Upper bound for one page of listed events.
pub const MAX_EVENTS_PER_PAGE: usize = 200;

/// Resource that lifecycle audit events can be recorded against.
pub trait AuditedActee: Send + Sync {
    /// Kind of the resource.
    fn actee_type(&self) -> ActeeType;

    /// Guid of the resource.
    fn actee_guid(&self) -> &Guid;

    /// Current name of the resource.
    fn actee_name(&self) -> &str;
}

impl AuditedActee for Space {
    fn actee_type(&self) -> ActeeType {
        ActeeType::Space
    }

    fn actee_guid(&self) -> &Guid {
        self.guid()
    }

    fn actee_name(&self) -> &str {
        self.name().as_str()
    }
}

impl AuditedActee for AppModel {
    fn actee_type(&self) -> ActeeType {
        ActeeType::App
    }

    fn actee_guid(&self) -> &Guid {
        self.guid()
    }

    fn actee_name(&self) -> &str {
        self.name().as_str()
    }
}

#[derive(Debug, Clone, Copy)]
enum LifecycleAction {
    Create,
    Update,
    DeleteRequest,
}

fn event_type_for(actee_type: ActeeType, action: LifecycleAction) -> AuditEventType {
    match (actee_type, action) {
        (ActeeType::Space, LifecycleAction::Create) => AuditEventType::SpaceCreate,
        (ActeeType::Space, LifecycleAction::Update) => AuditEventType::SpaceUpdate,
        (ActeeType::Space, LifecycleAction::DeleteRequest) => AuditEventType::SpaceDeleteRequest,
        (ActeeType::App, LifecycleAction::Create) => AuditEventType::AppCreate,
        (ActeeType::App, LifecycleAction::Update) => AuditEventType::AppUpdate,
        (ActeeType::App, LifecycleAction::DeleteRequest) => AuditEventType::AppDeleteRequest,
    }
}

/// Application service recording and listing audit events.
///
/// Every record call performs exactly one insert. Storage failures are
/// returned to the caller as-is.
#[derive(Clone)]
pub struct EventService {
    repository: Arc<dyn EventRepository>,
    visibility: VisibilityService,
}

impl EventService {
    /// Creates an event service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn EventRepository>, visibility: VisibilityService) -> Self {
        Self {
            repository,
            visibility,
        }
    }

    /// Records the creation of `actee` inside `space`.
    pub async fn record_create(
        &self,
        actee: &dyn AuditedActee,
        space: &Space,
        user: &UserAuditInfo,
        request: Value,
    ) -> AppResult<RecordedAuditEvent> {
        let event = build_event(
            actee,
            LifecycleAction::Create,
            space,
            true,
            user,
            json!({ "request": request }),
        );
        self.persist(event).await
    }

    /// Records an update of `actee` inside `space`.
    pub async fn record_update(
        &self,
        actee: &dyn AuditedActee,
        space: &Space,
        user: &UserAuditInfo,
        request: Value,
    ) -> AppResult<RecordedAuditEvent> {
        let event = build_event(
            actee,
            LifecycleAction::Update,
            space,
            true,
            user,
            json!({ "request": request }),
        );
        self.persist(event).await
    }

    /// Records a request to delete `actee`.
    ///
    /// The event does not link to the space row since the space may be gone
    /// by the time the event is read; it keeps the guids captured now.
    pub async fn record_delete_request(
        &self,
        actee: &dyn AuditedActee,
        space: &Space,
        user: &UserAuditInfo,
        recursive: bool,
    ) -> AppResult<RecordedAuditEvent> {
        let event = build_event(
            actee,
            LifecycleAction::DeleteRequest,
            space,
            false,
            user,
            json!({ "request": { "recursive": recursive } }),
        );
        self.persist(event).await
    }

    /// Records `audit.space.create`.
    pub async fn record_space_create(
        &self,
        space: &Space,
        user: &UserAuditInfo,
        request: Value,
    ) -> AppResult<RecordedAuditEvent> {
        self.record_create(space, space, user, request).await
    }

    /// Records `audit.space.update`.
    pub async fn record_space_update(
        &self,
        space: &Space,
        user: &UserAuditInfo,
        request: Value,
    ) -> AppResult<RecordedAuditEvent> {
        self.record_update(space, space, user, request).await
    }

    /// Records `audit.space.delete-request`.
    pub async fn record_space_delete_request(
        &self,
        space: &Space,
        user: &UserAuditInfo,
        recursive: bool,
    ) -> AppResult<RecordedAuditEvent> {
        self.record_delete_request(space, space, user, recursive)
            .await
    }

    /// Records `audit.app.create`.
    pub async fn record_app_create(
        &self,
        app: &AppModel,
        space: &Space,
        user: &UserAuditInfo,
        request: Value,
    ) -> AppResult<RecordedAuditEvent> {
        self.record_create(app, space, user, request).await
    }

    /// Lists events the caller may read, newest first.
    pub async fn list_events(
        &self,
        user: &UserAuditInfo,
        mut query: AuditEventQuery,
    ) -> AppResult<Vec<RecordedAuditEvent>> {
        let roles = self.visibility.principal_roles(user).await?;
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        query.limit = match query.limit {
            0 => MAX_EVENTS_PER_PAGE,
            limit => limit.min(MAX_EVENTS_PER_PAGE),
        };
        query.readable_space_guids = roles.readable_space_guids();
        query.readable_organization_guids = roles.managed_organization_guids();

        let events = self.repository.list_events(query).await?;

        Ok(access::filter_visible(
            &roles,
            events,
            |recorded| recorded.guid.clone(),
            |recorded| match (&recorded.event.space_guid, &recorded.event.organization_guid) {
                (Some(space_guid), Some(organization_guid)) => Some(VisibilityScope::new(
                    space_guid.clone(),
                    organization_guid.clone(),
                )),
                _ => None,
            },
        ))
    }

    async fn persist(&self, event: NewAuditEvent) -> AppResult<RecordedAuditEvent> {
        let recorded = self.repository.create_event(event).await?;

        info!(
            event_guid = %recorded.guid,
            event_type = recorded.event.event_type.as_str(),
            actee = %recorded.event.actee,
            actor = %recorded.event.actor,
            "recorded audit event"
        );

        Ok(recorded)
    }
}

fn build_event(
    actee: &dyn AuditedActee,
    action: LifecycleAction,
    space: &Space,
    link_space: bool,
    user: &UserAuditInfo,
    metadata: Value,
) -> NewAuditEvent {
    NewAuditEvent {
        event_type: event_type_for(actee.actee_type(), action),
        actee: actee.actee_guid().clone(),
        actee_type: actee.actee_type(),
        actee_name: actee.actee_name().to_owned(),
        actor: user.user_guid().clone(),
        actor_type: ACTOR_TYPE_USER.to_owned(),
        actor_name: user.user_email().map(str::to_owned),
        actor_username: user.user_name().map(str::to_owned),
        space_link: link_space.then(|| space.guid().clone()),
        space_guid: Some(space.guid().clone()),
        organization_guid: Some(space.organization_guid().clone()),
        metadata,
    }
}
