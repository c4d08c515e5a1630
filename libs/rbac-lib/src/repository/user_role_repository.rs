use async_trait::async_trait;
use sqlx::{query, query_scalar, SqlitePool};
use uuid::Uuid;

use crate::repository::errors::{is_foreign_key_violation, map_sqlx_error, RbacRepositoryError};
use crate::repository::traits::UserRoleRepositoryTrait;

#[derive(Debug, Clone)]
pub struct UserRoleRepository {
    pub pool: SqlitePool,
}

impl UserRoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRoleRepositoryTrait for UserRoleRepository {
    async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<(), RbacRepositoryError> {
        query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES (?, ?)
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RbacRepositoryError::NotFound
            } else {
                map_sqlx_error(e)
            }
        })?;

        Ok(())
    }

    async fn unassign_role(&self, user_id: &str, role_id: &str) -> Result<(), RbacRepositoryError> {
        query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = ? AND role_id = ?
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn count_users_with_role(&self, role_id: Uuid) -> Result<u64, RbacRepositoryError> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM user_roles WHERE role_id = ?")
            .bind(role_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.max(0) as u64)
    }
}
