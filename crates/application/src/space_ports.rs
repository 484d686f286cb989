use async_trait::async_trait;
use nimbus_core::{AppResult, Guid};
use nimbus_domain::{Organization, Space};

/// Repository port for organizations and spaces.
#[async_trait]
pub trait SpaceRepository: Send + Sync {
    /// Finds an organization by guid.
    async fn find_organization(&self, guid: &Guid) -> AppResult<Option<Organization>>;

    /// Inserts an organization unless one with the same guid exists.
    async fn ensure_organization(&self, organization: Organization) -> AppResult<()>;

    /// Finds a space by guid.
    async fn find_space(&self, guid: &Guid) -> AppResult<Option<Space>>;

    /// Loads the spaces with the given guids. Unknown guids are skipped.
    async fn find_spaces(&self, guids: &[Guid]) -> AppResult<Vec<Space>>;

    /// Lists all spaces ordered by name.
    async fn list_spaces(&self) -> AppResult<Vec<Space>>;

    /// Persists a new space.
    ///
    /// Returns a conflict when the organization already holds a space with the
    /// same name ignoring case.
    async fn create_space(&self, space: Space) -> AppResult<()>;

    /// Persists changes to an existing space.
    async fn update_space(&self, space: Space) -> AppResult<()>;

    /// Deletes a space together with its apps and their deployments.
    ///
    /// Unless `recursive` is set, the delete is refused with a conflict when
    /// the space holds apps at the moment of deletion. Audit events keep their
    /// denormalized space and organization guids.
    async fn delete_space(&self, guid: &Guid, recursive: bool) -> AppResult<()>;
}
