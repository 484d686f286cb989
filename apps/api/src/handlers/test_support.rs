use std::sync::Arc;

use chrono::{TimeZone, Utc};
use nimbus_application::{
    AppDefaults, AppRepository, DeploymentRepository, RoleRepository, SpaceRepository,
};
use nimbus_core::{Guid, UserAuditInfo};
use nimbus_domain::{
    AppModel, Deployment, DeploymentInput, DeploymentState, DeploymentStatusReason,
    DeploymentStatusValue, DeploymentStrategy, HistoricalRelatedProcess, MetadataEntry,
    Organization, RevisionReference, RoleMembership, RoleType, Space,
};
use nimbus_infrastructure::InMemoryStore;

use crate::api_services::build_in_memory_state;
use crate::state::AppState;
use crate::url_builder::ApiUrlBuilder;

pub(crate) struct Harness {
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) state: AppState,
}

pub(crate) fn harness() -> Harness {
    harness_with_defaults(AppDefaults::default())
}

pub(crate) fn harness_with_defaults(defaults: AppDefaults) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let url_builder =
        ApiUrlBuilder::new("https", "api.example.com").unwrap_or_else(|_| unreachable!());
    let state = build_in_memory_state(store.clone(), url_builder, defaults);

    Harness { store, state }
}

pub(crate) fn user() -> UserAuditInfo {
    UserAuditInfo::new(
        Guid::generate(),
        Some("user@example.com".to_owned()),
        Some("some-user".to_owned()),
    )
}

impl Harness {
    pub(crate) async fn organization(&self) -> Organization {
        let guid = Guid::generate();
        let organization = Organization::new(guid.clone(), format!("org-{guid}"))
            .unwrap_or_else(|_| unreachable!());
        assert!(
            self.store
                .ensure_organization(organization.clone())
                .await
                .is_ok()
        );
        organization
    }

    pub(crate) async fn space(&self, organization: &Organization, name: &str) -> Space {
        let space = Space::new(Guid::generate(), name, organization.guid().clone())
            .unwrap_or_else(|_| unreachable!());
        assert!(self.store.create_space(space.clone()).await.is_ok());
        space
    }

    pub(crate) async fn app(&self, space: &Space, name: &str, revisions_enabled: bool) -> AppModel {
        let app = AppModel::new(
            Guid::generate(),
            name,
            space.guid().clone(),
            revisions_enabled,
            true,
            None,
        )
        .unwrap_or_else(|_| unreachable!());
        assert!(self.store.create_app(app.clone()).await.is_ok());
        app
    }

    pub(crate) async fn grant(&self, user: &UserAuditInfo, role: RoleType, scope_guid: &Guid) {
        let granted = self
            .store
            .grant_role(RoleMembership::new(
                user.user_guid().clone(),
                role,
                scope_guid.clone(),
            ))
            .await;
        assert!(granted.is_ok());
    }

    /// Saves a rolling deployment for `app_guid`, which need not exist.
    pub(crate) async fn deployment(&self, app_guid: &Guid) -> Deployment {
        let created_at = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .unwrap_or_else(|| unreachable!());

        let deployment = Deployment::new(DeploymentInput {
            guid: Guid::generate(),
            state: DeploymentState::Deploying,
            status_value: DeploymentStatusValue::Active,
            status_reason: DeploymentStatusReason::Deploying,
            last_healthy_at: None,
            strategy: DeploymentStrategy::Rolling,
            app_guid: app_guid.clone(),
            droplet_guid: None,
            previous_droplet_guid: None,
            revision: Some(
                RevisionReference::new(Guid::generate(), 1).unwrap_or_else(|_| unreachable!()),
            ),
            labels: vec![
                MetadataEntry::new(None, "team", "payments").unwrap_or_else(|_| unreachable!()),
            ],
            annotations: Vec::new(),
            created_at,
            updated_at: created_at,
        })
        .unwrap_or_else(|_| unreachable!());

        assert!(self.store.save_deployment(deployment.clone()).await.is_ok());
        deployment
    }

    pub(crate) async fn process(&self, deployment: &Deployment, process_type: &str) -> Guid {
        let process_guid = Guid::generate();
        let process = HistoricalRelatedProcess::new(
            deployment.guid().clone(),
            process_guid.clone(),
            process_type,
        )
        .unwrap_or_else(|_| unreachable!());

        assert!(self.store.append_historical_process(process).await.is_ok());
        process_guid
    }
}
