//! Role-based read visibility and write access rules.
//!
//! Every rule is a pure predicate over the principal's memberships and the
//! resource's owning space and organization.

use std::collections::{BTreeSet, HashSet};

use nimbus_core::Guid;

use crate::{RoleMembership, RoleType};

/// Space and organization that own a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisibilityScope {
    space_guid: Guid,
    organization_guid: Guid,
}

impl VisibilityScope {
    /// Creates a scope from the owning space and its organization.
    #[must_use]
    pub fn new(space_guid: Guid, organization_guid: Guid) -> Self {
        Self {
            space_guid,
            organization_guid,
        }
    }

    /// Returns the owning space guid.
    #[must_use]
    pub fn space_guid(&self) -> &Guid {
        &self.space_guid
    }

    /// Returns the owning organization guid.
    #[must_use]
    pub fn organization_guid(&self) -> &Guid {
        &self.organization_guid
    }
}

/// Role memberships held by one principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalRoles {
    grants: HashSet<(RoleType, Guid)>,
}

impl PrincipalRoles {
    /// Collects the memberships that belong to `user_guid`.
    ///
    /// Memberships of other users are ignored.
    #[must_use]
    pub fn for_user(
        user_guid: &Guid,
        memberships: impl IntoIterator<Item = RoleMembership>,
    ) -> Self {
        let grants = memberships
            .into_iter()
            .filter(|membership| membership.user_guid() == user_guid)
            .map(|membership| (membership.role(), membership.scope_guid().clone()))
            .collect();

        Self { grants }
    }

    /// Returns whether the principal holds `role` on `scope_guid`.
    #[must_use]
    pub fn has_role(&self, role: RoleType, scope_guid: &Guid) -> bool {
        self.grants.contains(&(role, scope_guid.clone()))
    }

    /// Returns whether the principal holds any role on `scope_guid`.
    #[must_use]
    pub fn holds_any_role_on(&self, scope_guid: &Guid) -> bool {
        self.grants.iter().any(|(_, guid)| guid == scope_guid)
    }

    /// Returns whether the principal holds no memberships at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Returns the spaces whose resources are readable through a space role.
    #[must_use]
    pub fn readable_space_guids(&self) -> Vec<Guid> {
        self.guids_with(&[
            RoleType::SpaceDeveloper,
            RoleType::SpaceAuditor,
            RoleType::SpaceManager,
        ])
    }

    /// Returns the organizations managed by the principal.
    #[must_use]
    pub fn managed_organization_guids(&self) -> Vec<Guid> {
        self.guids_with(&[RoleType::OrganizationManager])
    }

    fn guids_with(&self, roles: &[RoleType]) -> Vec<Guid> {
        let guids: BTreeSet<Guid> = self
            .grants
            .iter()
            .filter(|(role, _)| roles.contains(role))
            .map(|(_, guid)| guid.clone())
            .collect();

        guids.into_iter().collect()
    }
}

/// Principal is a developer in the owning space.
#[must_use]
pub fn is_space_developer(roles: &PrincipalRoles, scope: &VisibilityScope) -> bool {
    roles.has_role(RoleType::SpaceDeveloper, scope.space_guid())
}

/// Principal is an auditor in the owning space.
#[must_use]
pub fn is_space_auditor(roles: &PrincipalRoles, scope: &VisibilityScope) -> bool {
    roles.has_role(RoleType::SpaceAuditor, scope.space_guid())
}

/// Principal is a manager of the owning space.
#[must_use]
pub fn is_space_manager(roles: &PrincipalRoles, scope: &VisibilityScope) -> bool {
    roles.has_role(RoleType::SpaceManager, scope.space_guid())
}

/// Principal is a manager of the owning organization.
#[must_use]
pub fn is_organization_manager(roles: &PrincipalRoles, scope: &VisibilityScope) -> bool {
    roles.has_role(RoleType::OrganizationManager, scope.organization_guid())
}

/// Returns whether the principal may read a resource owned by `scope`.
///
/// Each grant is evaluated on its own and the results are OR-ed.
#[must_use]
pub fn is_visible(roles: &PrincipalRoles, scope: &VisibilityScope) -> bool {
    let grants = [
        is_space_developer(roles, scope),
        is_space_auditor(roles, scope),
        is_space_manager(roles, scope),
        is_organization_manager(roles, scope),
    ];

    grants.into_iter().any(|granted| granted)
}

/// Returns whether the principal may create spaces in an organization.
#[must_use]
pub fn can_create_space(roles: &PrincipalRoles, organization_guid: &Guid) -> bool {
    roles.has_role(RoleType::OrganizationManager, organization_guid)
}

/// Returns whether the principal may update or delete the owning space.
#[must_use]
pub fn can_manage_space(roles: &PrincipalRoles, scope: &VisibilityScope) -> bool {
    let grants = [
        is_space_manager(roles, scope),
        is_organization_manager(roles, scope),
    ];

    grants.into_iter().any(|granted| granted)
}

/// Returns whether the principal may push apps into the owning space.
#[must_use]
pub fn can_write_apps(roles: &PrincipalRoles, scope: &VisibilityScope) -> bool {
    is_space_developer(roles, scope)
}

/// Keeps the resources visible to the principal.
///
/// Input order is preserved and repeated guids are dropped after their first
/// occurrence. Resources whose scope cannot be resolved are excluded.
pub fn filter_visible<T, K, S>(
    roles: &PrincipalRoles,
    resources: impl IntoIterator<Item = T>,
    mut key_of: K,
    mut scope_of: S,
) -> Vec<T>
where
    K: FnMut(&T) -> Guid,
    S: FnMut(&T) -> Option<VisibilityScope>,
{
    let mut seen = HashSet::new();

    resources
        .into_iter()
        .filter(|resource| {
            scope_of(resource).is_some_and(|scope| is_visible(roles, &scope))
        })
        .filter(|resource| seen.insert(key_of(resource)))
        .collect()
}
