use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use nimbus_core::{AppError, AppResult, Guid, UserAuditInfo};
use nimbus_domain::{PrincipalRoles, RoleMembership, Space, VisibilityScope, access};

use crate::SpaceRepository;

/// Repository port for role membership lookups.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists every role membership held by a user.
    async fn list_memberships_for_user(&self, user_guid: &Guid)
    -> AppResult<Vec<RoleMembership>>;

    /// Grants a role membership. Granting an existing membership is a no-op.
    async fn grant_role(&self, membership: RoleMembership) -> AppResult<()>;
}

/// Visible space resolved together with the caller's roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleSpace {
    /// The visible space.
    pub space: Space,
    /// Owning scope of the space.
    pub scope: VisibilityScope,
    /// Roles of the caller.
    pub roles: PrincipalRoles,
}

/// Application service resolving what a principal may read.
#[derive(Clone)]
pub struct VisibilityService {
    role_repository: Arc<dyn RoleRepository>,
    space_repository: Arc<dyn SpaceRepository>,
}

impl VisibilityService {
    /// Creates a visibility service from repository implementations.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        space_repository: Arc<dyn SpaceRepository>,
    ) -> Self {
        Self {
            role_repository,
            space_repository,
        }
    }

    /// Loads the role memberships of the caller.
    pub async fn principal_roles(&self, user: &UserAuditInfo) -> AppResult<PrincipalRoles> {
        let memberships = self
            .role_repository
            .list_memberships_for_user(user.user_guid())
            .await?;

        Ok(PrincipalRoles::for_user(user.user_guid(), memberships))
    }

    /// Keeps the space-owned resources visible to the caller.
    ///
    /// `space_of` returns `None` when the owning space cannot be determined;
    /// such resources are excluded like resources of unknown spaces.
    pub async fn filter_space_owned<T, K, S>(
        &self,
        user: &UserAuditInfo,
        resources: Vec<T>,
        key_of: K,
        mut space_of: S,
    ) -> AppResult<Vec<T>>
    where
        K: FnMut(&T) -> Guid,
        S: FnMut(&T) -> Option<Guid>,
    {
        if resources.is_empty() {
            return Ok(resources);
        }

        let roles = self.principal_roles(user).await?;
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let space_guids: Vec<Guid> = resources
            .iter()
            .filter_map(&mut space_of)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let scopes: HashMap<Guid, VisibilityScope> = self
            .space_repository
            .find_spaces(&space_guids)
            .await?
            .iter()
            .map(|space| (space.guid().clone(), scope_of_space(space)))
            .collect();

        Ok(access::filter_visible(&roles, resources, key_of, |resource| {
            space_of(resource).and_then(|space_guid| scopes.get(&space_guid).cloned())
        }))
    }

    /// Resolves a space the caller can see.
    ///
    /// Missing and invisible spaces are both reported as not found.
    pub async fn require_visible_space(
        &self,
        user: &UserAuditInfo,
        space_guid: &Guid,
    ) -> AppResult<VisibleSpace> {
        let not_found = || AppError::NotFound(format!("space '{space_guid}' not found"));

        let space = self
            .space_repository
            .find_space(space_guid)
            .await?
            .ok_or_else(not_found)?;
        let roles = self.principal_roles(user).await?;
        let scope = scope_of_space(&space);

        if !access::is_visible(&roles, &scope) {
            return Err(not_found());
        }

        Ok(VisibleSpace {
            space,
            scope,
            roles,
        })
    }
}

/// Returns the visibility scope owning a space.
#[must_use]
pub fn scope_of_space(space: &Space) -> VisibilityScope {
    VisibilityScope::new(space.guid().clone(), space.organization_guid().clone())
}
