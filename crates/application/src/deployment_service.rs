use std::collections::HashMap;
use std::sync::Arc;

use nimbus_core::{AppError, AppResult, Guid, UserAuditInfo};
use nimbus_domain::{AppModel, Deployment, HistoricalRelatedProcess, access};
use tracing::warn;

use crate::visibility_service::scope_of_space;
use crate::{AppRepository, DeploymentRepository, SpaceRepository, VisibilityService};

/// Deployment loaded with the relations needed to present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentDetails {
    /// The deployment.
    pub deployment: Deployment,
    /// Owning app.
    pub app: AppModel,
    /// Historical processes in insertion order.
    pub historical_processes: Vec<HistoricalRelatedProcess>,
}

/// Application service for reading deployments.
#[derive(Clone)]
pub struct DeploymentService {
    repository: Arc<dyn DeploymentRepository>,
    app_repository: Arc<dyn AppRepository>,
    space_repository: Arc<dyn SpaceRepository>,
    visibility: VisibilityService,
}

impl DeploymentService {
    /// Creates a deployment service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn DeploymentRepository>,
        app_repository: Arc<dyn AppRepository>,
        space_repository: Arc<dyn SpaceRepository>,
        visibility: VisibilityService,
    ) -> Self {
        Self {
            repository,
            app_repository,
            space_repository,
            visibility,
        }
    }

    /// Lists the deployments visible to the caller.
    ///
    /// Deployments whose app is missing cannot be scoped and are skipped.
    pub async fn list_deployments(
        &self,
        user: &UserAuditInfo,
    ) -> AppResult<Vec<DeploymentDetails>> {
        let deployments = self.repository.list_deployments().await?;

        let app_guids: Vec<Guid> = deployments
            .iter()
            .map(|deployment| deployment.app_guid().clone())
            .collect();
        let apps: HashMap<Guid, AppModel> = self
            .app_repository
            .find_apps(&app_guids)
            .await?
            .into_iter()
            .map(|app| (app.guid().clone(), app))
            .collect();

        for deployment in &deployments {
            if !apps.contains_key(deployment.app_guid()) {
                warn!(
                    deployment_guid = %deployment.guid(),
                    app_guid = %deployment.app_guid(),
                    "deployment references a missing app"
                );
            }
        }

        let visible = self
            .visibility
            .filter_space_owned(
                user,
                deployments,
                |deployment| deployment.guid().clone(),
                |deployment| {
                    apps.get(deployment.app_guid())
                        .map(|app| app.space_guid().clone())
                },
            )
            .await?;

        let deployment_guids: Vec<Guid> = visible
            .iter()
            .map(|deployment| deployment.guid().clone())
            .collect();
        let mut processes = self.group_processes(&deployment_guids).await?;

        visible
            .into_iter()
            .map(|deployment| -> AppResult<DeploymentDetails> {
                let app = apps
                    .get(deployment.app_guid())
                    .cloned()
                    .ok_or_else(|| missing_app_error(&deployment))?;
                let historical_processes = processes.remove(deployment.guid()).unwrap_or_default();

                Ok(DeploymentDetails {
                    deployment,
                    app,
                    historical_processes,
                })
            })
            .collect()
    }

    /// Loads one deployment visible to the caller.
    ///
    /// Invisible deployments are reported as not found. A deployment whose
    /// app or space is missing is an integrity failure.
    pub async fn get_deployment(
        &self,
        user: &UserAuditInfo,
        deployment_guid: &Guid,
    ) -> AppResult<DeploymentDetails> {
        let not_found = || AppError::NotFound(format!("deployment '{deployment_guid}' not found"));

        let deployment = self
            .repository
            .find_deployment(deployment_guid)
            .await?
            .ok_or_else(not_found)?;

        let Some(app) = self.app_repository.find_app(deployment.app_guid()).await? else {
            return Err(missing_app_error(&deployment));
        };

        let space = self
            .space_repository
            .find_space(app.space_guid())
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "app '{}' references missing space '{}'",
                    app.guid(),
                    app.space_guid()
                ))
            })?;

        let roles = self.visibility.principal_roles(user).await?;
        if !access::is_visible(&roles, &scope_of_space(&space)) {
            return Err(not_found());
        }

        let historical_processes = self
            .repository
            .list_historical_processes(std::slice::from_ref(deployment.guid()))
            .await?;

        Ok(DeploymentDetails {
            deployment,
            app,
            historical_processes,
        })
    }

    async fn group_processes(
        &self,
        deployment_guids: &[Guid],
    ) -> AppResult<HashMap<Guid, Vec<HistoricalRelatedProcess>>> {
        if deployment_guids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut grouped: HashMap<Guid, Vec<HistoricalRelatedProcess>> = HashMap::new();
        for process in self
            .repository
            .list_historical_processes(deployment_guids)
            .await?
        {
            grouped
                .entry(process.deployment_guid().clone())
                .or_default()
                .push(process);
        }

        Ok(grouped)
    }
}

fn missing_app_error(deployment: &Deployment) -> AppError {
    warn!(
        deployment_guid = %deployment.guid(),
        app_guid = %deployment.app_guid(),
        "deployment references a missing app"
    );

    AppError::Internal(format!(
        "deployment '{}' references missing app '{}'",
        deployment.guid(),
        deployment.app_guid()
    ))
}
