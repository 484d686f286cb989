use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use nimbus_application::RoleRepository;
use nimbus_core::{AppError, AppResult, Guid};
use nimbus_domain::RoleMembership;

use crate::sql_support::stored_guid;

/// PostgreSQL-backed role membership lookups.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleMembershipRow {
    user_guid: String,
    role: String,
    scope_guid: String,
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_memberships_for_user(&self, user_guid: &Guid) -> AppResult<Vec<RoleMembership>> {
        let rows = sqlx::query_as::<_, RoleMembershipRow>(
            r#"
            SELECT user_guid, role, scope_guid
            FROM role_memberships
            WHERE user_guid = $1
            ORDER BY role, scope_guid
            "#,
        )
        .bind(user_guid.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list role memberships for user '{user_guid}': {error}"
            ))
        })?;

        rows.into_iter()
            .map(|row| -> AppResult<RoleMembership> {
                Ok(RoleMembership::new(
                    stored_guid(row.user_guid, "role_memberships.user_guid")?,
                    row.role.parse()?,
                    stored_guid(row.scope_guid, "role_memberships.scope_guid")?,
                ))
            })
            .collect()
    }

    async fn grant_role(&self, membership: RoleMembership) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_memberships (user_guid, role, scope_guid)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_guid, role, scope_guid) DO NOTHING
            "#,
        )
        .bind(membership.user_guid().as_str())
        .bind(membership.role().as_str())
        .bind(membership.scope_guid().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to grant role '{}' on '{}' to user '{}': {error}",
                membership.role().as_str(),
                membership.scope_guid(),
                membership.user_guid()
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
