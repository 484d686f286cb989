use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nimbus_core::{AppError, AppResult, Guid, UserAuditInfo};
use nimbus_domain::{
    AppModel, Deployment, DeploymentInput, DeploymentState, DeploymentStatusReason,
    DeploymentStatusValue, DeploymentStrategy, HistoricalRelatedProcess, Organization,
    RevisionReference, RoleMembership, RoleType, Space,
};
use tokio::sync::Mutex;

use crate::{
    AppDefaults, AppRepository, AppService, AuditEventQuery, DeploymentRepository,
    DeploymentService, EventRepository, EventService, NewAuditEvent, RecordedAuditEvent,
    RoleRepository, SpaceRepository, SpaceService, VisibilityService,
};

#[derive(Default)]
struct FakeState {
    organizations: Vec<Organization>,
    spaces: Vec<Space>,
    apps: Vec<AppModel>,
    deployments: Vec<Deployment>,
    processes: Vec<HistoricalRelatedProcess>,
    memberships: Vec<RoleMembership>,
    events: Vec<RecordedAuditEvent>,
}

#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<FakeState>,
    fail_event_writes: AtomicBool,
    stale_app_counts: AtomicBool,
}

pub(crate) struct Services {
    pub visibility: VisibilityService,
    pub events: EventService,
    pub spaces: SpaceService,
    pub apps: AppService,
    pub deployments: DeploymentService,
}

pub(crate) fn services(store: &Arc<FakeStore>) -> Services {
    services_with_defaults(store, AppDefaults::default())
}

pub(crate) fn services_with_defaults(store: &Arc<FakeStore>, defaults: AppDefaults) -> Services {
    let visibility = VisibilityService::new(store.clone(), store.clone());
    let events = EventService::new(store.clone(), visibility.clone());

    Services {
        spaces: SpaceService::new(
            store.clone(),
            store.clone(),
            visibility.clone(),
            events.clone(),
        ),
        apps: AppService::new(store.clone(), visibility.clone(), events.clone(), defaults),
        deployments: DeploymentService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            visibility.clone(),
        ),
        events,
        visibility,
    }
}

pub(crate) fn user() -> UserAuditInfo {
    UserAuditInfo::new(
        Guid::generate(),
        Some("user@example.com".to_owned()),
        Some("some-user".to_owned()),
    )
}

impl FakeStore {
    pub(crate) fn fail_event_writes(&self) {
        self.fail_event_writes.store(true, Ordering::SeqCst);
    }

    /// Makes app counts report an empty space, as seen by a reader racing an
    /// app creation.
    pub(crate) fn report_stale_app_counts(&self) {
        self.stale_app_counts.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn seed_organization(&self, name: &str) -> Organization {
        let organization = Organization::new(Guid::generate(), name)
            .unwrap_or_else(|_| unreachable!());
        let ensured = self.ensure_organization(organization.clone()).await;
        assert!(ensured.is_ok());
        organization
    }

    pub(crate) async fn seed_space(&self, organization: &Organization, name: &str) -> Space {
        let space = Space::new(Guid::generate(), name, organization.guid().clone())
            .unwrap_or_else(|_| unreachable!());
        self.state.lock().await.spaces.push(space.clone());
        space
    }

    pub(crate) async fn seed_app(
        &self,
        space: &Space,
        name: &str,
        revisions_enabled: bool,
    ) -> AppModel {
        let app = AppModel::new(
            Guid::generate(),
            name,
            space.guid().clone(),
            revisions_enabled,
            true,
            None,
        )
        .unwrap_or_else(|_| unreachable!());
        self.state.lock().await.apps.push(app.clone());
        app
    }

    pub(crate) async fn seed_deployment(&self, app_guid: &Guid) -> Deployment {
        let created_at = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(|| unreachable!());
        let deployment = Deployment::new(DeploymentInput {
            guid: Guid::generate(),
            state: DeploymentState::Deploying,
            status_value: DeploymentStatusValue::Active,
            status_reason: DeploymentStatusReason::Deploying,
            last_healthy_at: Some(created_at),
            strategy: DeploymentStrategy::Rolling,
            app_guid: app_guid.clone(),
            droplet_guid: Some(Guid::generate()),
            previous_droplet_guid: None,
            revision: Some(
                RevisionReference::new(Guid::generate(), 1).unwrap_or_else(|_| unreachable!()),
            ),
            labels: Vec::new(),
            annotations: Vec::new(),
            created_at,
            updated_at: created_at,
        })
        .unwrap_or_else(|_| unreachable!());
        self.save_deployment(deployment.clone())
            .await
            .unwrap_or_else(|_| unreachable!());
        deployment
    }

    pub(crate) async fn grant(&self, user: &UserAuditInfo, role: RoleType, scope_guid: &Guid) {
        let granted = self
            .grant_role(RoleMembership::new(
                user.user_guid().clone(),
                role,
                scope_guid.clone(),
            ))
            .await;
        assert!(granted.is_ok());
    }

    pub(crate) async fn recorded_events(&self) -> Vec<RecordedAuditEvent> {
        self.state.lock().await.events.clone()
    }

    pub(crate) async fn space_exists(&self, guid: &Guid) -> bool {
        self.state
            .lock()
            .await
            .spaces
            .iter()
            .any(|space| space.guid() == guid)
    }

    pub(crate) async fn app_count(&self) -> usize {
        self.state.lock().await.apps.len()
    }
}

#[async_trait]
impl RoleRepository for FakeStore {
    async fn list_memberships_for_user(&self, user_guid: &Guid) -> AppResult<Vec<RoleMembership>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .filter(|membership| membership.user_guid() == user_guid)
            .cloned()
            .collect())
    }

    async fn grant_role(&self, membership: RoleMembership) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.memberships.contains(&membership) {
            state.memberships.push(membership);
        }
        Ok(())
    }
}

#[async_trait]
impl SpaceRepository for FakeStore {
    async fn ensure_organization(&self, organization: Organization) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state
            .organizations
            .iter()
            .any(|existing| existing.guid() == organization.guid())
        {
            state.organizations.push(organization);
        }
        Ok(())
    }

    async fn find_organization(&self, guid: &Guid) -> AppResult<Option<Organization>> {
        Ok(self
            .state
            .lock()
            .await
            .organizations
            .iter()
            .find(|organization| organization.guid() == guid)
            .cloned())
    }

    async fn find_space(&self, guid: &Guid) -> AppResult<Option<Space>> {
        Ok(self
            .state
            .lock()
            .await
            .spaces
            .iter()
            .find(|space| space.guid() == guid)
            .cloned())
    }

    async fn find_spaces(&self, guids: &[Guid]) -> AppResult<Vec<Space>> {
        Ok(self
            .state
            .lock()
            .await
            .spaces
            .iter()
            .filter(|space| guids.contains(space.guid()))
            .cloned()
            .collect())
    }

    async fn list_spaces(&self) -> AppResult<Vec<Space>> {
        Ok(self.state.lock().await.spaces.clone())
    }

    async fn create_space(&self, space: Space) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.spaces.iter().any(|existing| {
            existing.organization_guid() == space.organization_guid()
                && existing.name_uniqueness_key() == space.name_uniqueness_key()
        }) {
            return Err(AppError::Conflict(
                "name must be unique in organization".to_owned(),
            ));
        }
        state.spaces.push(space);
        Ok(())
    }

    async fn update_space(&self, space: Space) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let existing = state
            .spaces
            .iter_mut()
            .find(|existing| existing.guid() == space.guid())
            .ok_or_else(|| AppError::NotFound(format!("space '{}' not found", space.guid())))?;
        *existing = space;
        Ok(())
    }

    async fn delete_space(&self, guid: &Guid, recursive: bool) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !recursive && state.apps.iter().any(|app| app.space_guid() == guid) {
            return Err(AppError::Conflict(format!("space '{guid}' is not empty")));
        }
        let app_guids: Vec<Guid> = state
            .apps
            .iter()
            .filter(|app| app.space_guid() == guid)
            .map(|app| app.guid().clone())
            .collect();
        state.spaces.retain(|space| space.guid() != guid);
        state.apps.retain(|app| app.space_guid() != guid);
        state
            .deployments
            .retain(|deployment| !app_guids.contains(deployment.app_guid()));
        Ok(())
    }
}

#[async_trait]
impl AppRepository for FakeStore {
    async fn find_app(&self, guid: &Guid) -> AppResult<Option<AppModel>> {
        Ok(self
            .state
            .lock()
            .await
            .apps
            .iter()
            .find(|app| app.guid() == guid)
            .cloned())
    }

    async fn find_apps(&self, guids: &[Guid]) -> AppResult<Vec<AppModel>> {
        Ok(self
            .state
            .lock()
            .await
            .apps
            .iter()
            .filter(|app| guids.contains(app.guid()))
            .cloned()
            .collect())
    }

    async fn list_apps(&self) -> AppResult<Vec<AppModel>> {
        Ok(self.state.lock().await.apps.clone())
    }

    async fn create_app(&self, app: AppModel) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.apps.iter().any(|existing| {
            existing.space_guid() == app.space_guid()
                && existing.name_uniqueness_key() == app.name_uniqueness_key()
        }) {
            return Err(AppError::Conflict("name must be unique in space".to_owned()));
        }
        state.apps.push(app);
        Ok(())
    }

    async fn count_apps_in_space(&self, space_guid: &Guid) -> AppResult<u64> {
        if self.stale_app_counts.load(Ordering::SeqCst) {
            return Ok(0);
        }

        let count = self
            .state
            .lock()
            .await
            .apps
            .iter()
            .filter(|app| app.space_guid() == space_guid)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl DeploymentRepository for FakeStore {
    async fn find_deployment(&self, guid: &Guid) -> AppResult<Option<Deployment>> {
        Ok(self
            .state
            .lock()
            .await
            .deployments
            .iter()
            .find(|deployment| deployment.guid() == guid)
            .cloned())
    }

    async fn list_deployments(&self) -> AppResult<Vec<Deployment>> {
        Ok(self.state.lock().await.deployments.clone())
    }

    async fn save_deployment(&self, deployment: Deployment) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .deployments
            .retain(|existing| existing.guid() != deployment.guid());
        state.deployments.push(deployment);
        Ok(())
    }

    async fn append_historical_process(&self, process: HistoricalRelatedProcess) -> AppResult<()> {
        self.state.lock().await.processes.push(process);
        Ok(())
    }

    async fn list_historical_processes(
        &self,
        deployment_guids: &[Guid],
    ) -> AppResult<Vec<HistoricalRelatedProcess>> {
        Ok(self
            .state
            .lock()
            .await
            .processes
            .iter()
            .filter(|process| deployment_guids.contains(process.deployment_guid()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventRepository for FakeStore {
    async fn create_event(&self, event: NewAuditEvent) -> AppResult<RecordedAuditEvent> {
        if self.fail_event_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("event store unavailable".to_owned()));
        }

        let recorded = RecordedAuditEvent {
            guid: Guid::generate(),
            timestamp: Utc::now(),
            event,
        };
        self.state.lock().await.events.push(recorded.clone());
        Ok(recorded)
    }

    async fn list_events(&self, query: AuditEventQuery) -> AppResult<Vec<RecordedAuditEvent>> {
        let state = self.state.lock().await;
        Ok(state
            .events
            .iter()
            .rev()
            .filter(|recorded| {
                query.event_types.is_empty()
                    || query.event_types.contains(&recorded.event.event_type)
            })
            .filter(|recorded| {
                query.space_guids.is_empty()
                    || recorded
                        .event
                        .space_guid
                        .as_ref()
                        .is_some_and(|guid| query.space_guids.contains(guid))
            })
            .filter(|recorded| {
                let space_readable = recorded
                    .event
                    .space_guid
                    .as_ref()
                    .is_some_and(|guid| query.readable_space_guids.contains(guid));
                let organization_readable = recorded
                    .event
                    .organization_guid
                    .as_ref()
                    .is_some_and(|guid| query.readable_organization_guids.contains(guid));
                space_readable || organization_readable
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }
}
