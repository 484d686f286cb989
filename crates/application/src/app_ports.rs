use async_trait::async_trait;
use nimbus_core::{AppResult, Guid};
use nimbus_domain::AppModel;

/// Repository port for apps.
#[async_trait]
pub trait AppRepository: Send + Sync {
    /// Finds an app by guid.
    async fn find_app(&self, guid: &Guid) -> AppResult<Option<AppModel>>;

    /// Loads the apps with the given guids. Unknown guids are skipped.
    async fn find_apps(&self, guids: &[Guid]) -> AppResult<Vec<AppModel>>;

    /// Lists all apps ordered by name.
    async fn list_apps(&self) -> AppResult<Vec<AppModel>>;

    /// Persists a new app.
    ///
    /// Returns a conflict with message `name must be unique in space` when the
    /// space already holds an app with the same name ignoring case.
    async fn create_app(&self, app: AppModel) -> AppResult<()>;

    /// Counts the apps owned by a space.
    async fn count_apps_in_space(&self, space_guid: &Guid) -> AppResult<u64>;
}
