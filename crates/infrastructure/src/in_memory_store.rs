use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use nimbus_application::{
    AppRepository, AuditEventQuery, DeploymentRepository, EventRepository, NewAuditEvent,
    RecordedAuditEvent, RoleRepository, SpaceRepository,
};
use nimbus_core::{AppError, AppResult, Guid};
use nimbus_domain::{
    AppModel, Deployment, HistoricalRelatedProcess, Organization, RoleMembership, Space,
};
use tokio::sync::RwLock;

/// In-memory implementation of every persistence port.
///
/// Spaces cascade to apps and deployments on delete, and events keep their
/// denormalized guids after the space link is cleared, mirroring the SQL
/// schema.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    organizations: RwLock<HashMap<Guid, Organization>>,
    spaces: RwLock<Vec<Space>>,
    apps: RwLock<Vec<AppModel>>,
    deployments: RwLock<Vec<Deployment>>,
    historical_processes: RwLock<Vec<HistoricalRelatedProcess>>,
    memberships: RwLock<Vec<RoleMembership>>,
    events: RwLock<Vec<RecordedAuditEvent>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_name<T>(mut values: Vec<T>, name_of: impl Fn(&T) -> (String, Guid)) -> Vec<T> {
    values.sort_by_key(|value| name_of(value));
    values
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn list_memberships_for_user(&self, user_guid: &Guid) -> AppResult<Vec<RoleMembership>> {
        let memberships = self.memberships.read().await;

        Ok(memberships
            .iter()
            .filter(|membership| membership.user_guid() == user_guid)
            .cloned()
            .collect())
    }

    async fn grant_role(&self, membership: RoleMembership) -> AppResult<()> {
        let mut memberships = self.memberships.write().await;
        if !memberships.contains(&membership) {
            memberships.push(membership);
        }

        Ok(())
    }
}

#[async_trait]
impl SpaceRepository for InMemoryStore {
    async fn ensure_organization(&self, organization: Organization) -> AppResult<()> {
        self.organizations
            .write()
            .await
            .entry(organization.guid().clone())
            .or_insert(organization);

        Ok(())
    }

    async fn find_organization(&self, guid: &Guid) -> AppResult<Option<Organization>> {
        Ok(self.organizations.read().await.get(guid).cloned())
    }

    async fn find_space(&self, guid: &Guid) -> AppResult<Option<Space>> {
        let spaces = self.spaces.read().await;
        Ok(spaces.iter().find(|space| space.guid() == guid).cloned())
    }

    async fn find_spaces(&self, guids: &[Guid]) -> AppResult<Vec<Space>> {
        let spaces = self.spaces.read().await;
        let found = spaces
            .iter()
            .filter(|space| guids.contains(space.guid()))
            .cloned()
            .collect();

        Ok(sorted_by_name(found, |space| {
            (space.name().to_string(), space.guid().clone())
        }))
    }

    async fn list_spaces(&self) -> AppResult<Vec<Space>> {
        let spaces = self.spaces.read().await.clone();

        Ok(sorted_by_name(spaces, |space| {
            (space.name().to_string(), space.guid().clone())
        }))
    }

    async fn create_space(&self, space: Space) -> AppResult<()> {
        if !self
            .organizations
            .read()
            .await
            .contains_key(space.organization_guid())
        {
            return Err(AppError::NotFound(format!(
                "organization '{}' not found",
                space.organization_guid()
            )));
        }

        let mut spaces = self.spaces.write().await;
        let duplicate = spaces.iter().any(|existing| {
            existing.organization_guid() == space.organization_guid()
                && existing.name_uniqueness_key() == space.name_uniqueness_key()
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "space name '{}' must be unique in organization '{}'",
                space.name(),
                space.organization_guid()
            )));
        }

        spaces.push(space);
        Ok(())
    }

    async fn update_space(&self, space: Space) -> AppResult<()> {
        let mut spaces = self.spaces.write().await;
        let duplicate = spaces.iter().any(|existing| {
            existing.guid() != space.guid()
                && existing.organization_guid() == space.organization_guid()
                && existing.name_uniqueness_key() == space.name_uniqueness_key()
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "space name '{}' must be unique in organization '{}'",
                space.name(),
                space.organization_guid()
            )));
        }

        let existing = spaces
            .iter_mut()
            .find(|existing| existing.guid() == space.guid())
            .ok_or_else(|| AppError::NotFound(format!("space '{}' not found", space.guid())))?;
        *existing = space;

        Ok(())
    }

    async fn delete_space(&self, guid: &Guid, recursive: bool) -> AppResult<()> {
        let mut spaces = self.spaces.write().await;
        let mut apps = self.apps.write().await;
        if !recursive && apps.iter().any(|app| app.space_guid() == guid) {
            return Err(AppError::Conflict(format!(
                "space '{guid}' contains apps; delete recursively to remove them"
            )));
        }

        let mut deployments = self.deployments.write().await;
        let mut historical_processes = self.historical_processes.write().await;
        let mut events = self.events.write().await;

        let app_guids: Vec<Guid> = apps
            .iter()
            .filter(|app| app.space_guid() == guid)
            .map(|app| app.guid().clone())
            .collect();
        let deployment_guids: Vec<Guid> = deployments
            .iter()
            .filter(|deployment| app_guids.contains(deployment.app_guid()))
            .map(|deployment| deployment.guid().clone())
            .collect();

        spaces.retain(|space| space.guid() != guid);
        apps.retain(|app| app.space_guid() != guid);
        deployments.retain(|deployment| !deployment_guids.contains(deployment.guid()));
        historical_processes
            .retain(|process| !deployment_guids.contains(process.deployment_guid()));
        for recorded in events.iter_mut() {
            if recorded.event.space_link.as_ref() == Some(guid) {
                recorded.event.space_link = None;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl AppRepository for InMemoryStore {
    async fn find_app(&self, guid: &Guid) -> AppResult<Option<AppModel>> {
        let apps = self.apps.read().await;
        Ok(apps.iter().find(|app| app.guid() == guid).cloned())
    }

    async fn find_apps(&self, guids: &[Guid]) -> AppResult<Vec<AppModel>> {
        let apps = self.apps.read().await;
        let found = apps
            .iter()
            .filter(|app| guids.contains(app.guid()))
            .cloned()
            .collect();

        Ok(sorted_by_name(found, |app| {
            (app.name().to_string(), app.guid().clone())
        }))
    }

    async fn list_apps(&self) -> AppResult<Vec<AppModel>> {
        let apps = self.apps.read().await.clone();

        Ok(sorted_by_name(apps, |app| {
            (app.name().to_string(), app.guid().clone())
        }))
    }

    async fn create_app(&self, app: AppModel) -> AppResult<()> {
        // Held until the app is stored so a concurrent space delete sees it.
        let spaces = self.spaces.read().await;
        if !spaces.iter().any(|space| space.guid() == app.space_guid()) {
            return Err(AppError::NotFound(format!(
                "space '{}' not found",
                app.space_guid()
            )));
        }

        let mut apps = self.apps.write().await;
        let duplicate = apps.iter().any(|existing| {
            existing.space_guid() == app.space_guid()
                && existing.name_uniqueness_key() == app.name_uniqueness_key()
        });
        if duplicate {
            return Err(AppError::Conflict("name must be unique in space".to_owned()));
        }

        apps.push(app);
        Ok(())
    }

    async fn count_apps_in_space(&self, space_guid: &Guid) -> AppResult<u64> {
        let apps = self.apps.read().await;
        let count = apps
            .iter()
            .filter(|app| app.space_guid() == space_guid)
            .count();

        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl DeploymentRepository for InMemoryStore {
    async fn find_deployment(&self, guid: &Guid) -> AppResult<Option<Deployment>> {
        let deployments = self.deployments.read().await;
        Ok(deployments
            .iter()
            .find(|deployment| deployment.guid() == guid)
            .cloned())
    }

    async fn list_deployments(&self) -> AppResult<Vec<Deployment>> {
        let mut deployments = self.deployments.read().await.clone();
        deployments.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.guid().cmp(right.guid()))
        });

        Ok(deployments)
    }

    async fn save_deployment(&self, deployment: Deployment) -> AppResult<()> {
        let mut deployments = self.deployments.write().await;
        match deployments
            .iter_mut()
            .find(|existing| existing.guid() == deployment.guid())
        {
            Some(existing) => *existing = deployment,
            None => deployments.push(deployment),
        }

        Ok(())
    }

    async fn append_historical_process(&self, process: HistoricalRelatedProcess) -> AppResult<()> {
        let deployment_exists = self
            .deployments
            .read()
            .await
            .iter()
            .any(|deployment| deployment.guid() == process.deployment_guid());
        if !deployment_exists {
            return Err(AppError::NotFound(format!(
                "deployment '{}' not found",
                process.deployment_guid()
            )));
        }

        self.historical_processes.write().await.push(process);
        Ok(())
    }

    async fn list_historical_processes(
        &self,
        deployment_guids: &[Guid],
    ) -> AppResult<Vec<HistoricalRelatedProcess>> {
        let processes = self.historical_processes.read().await;

        Ok(processes
            .iter()
            .filter(|process| deployment_guids.contains(process.deployment_guid()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn create_event(&self, event: NewAuditEvent) -> AppResult<RecordedAuditEvent> {
        let mut events = self.events.write().await;
        let recorded = RecordedAuditEvent {
            guid: Guid::generate(),
            timestamp: Utc::now(),
            event,
        };
        events.push(recorded.clone());

        Ok(recorded)
    }

    async fn list_events(&self, query: AuditEventQuery) -> AppResult<Vec<RecordedAuditEvent>> {
        let events = self.events.read().await;
        let limit = query.limit.clamp(1, 200);

        Ok(events
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
            .take(limit)
            .cloned()
            .collect())
    }
}
