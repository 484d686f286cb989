use async_trait::async_trait;
use nimbus_core::{AppResult, Guid};
use nimbus_domain::{Deployment, HistoricalRelatedProcess};

/// Repository port for deployments and their historical processes.
#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    /// Finds a deployment by guid.
    async fn find_deployment(&self, guid: &Guid) -> AppResult<Option<Deployment>>;

    /// Lists all deployments, oldest first.
    async fn list_deployments(&self) -> AppResult<Vec<Deployment>>;

    /// Inserts or replaces a deployment.
    async fn save_deployment(&self, deployment: Deployment) -> AppResult<()>;

    /// Appends a historical process association.
    ///
    /// Associations are never updated after insertion.
    async fn append_historical_process(&self, process: HistoricalRelatedProcess) -> AppResult<()>;

    /// Lists historical processes of the given deployments in insertion order.
    async fn list_historical_processes(
        &self,
        deployment_guids: &[Guid],
    ) -> AppResult<Vec<HistoricalRelatedProcess>>;
}
