use async_trait::async_trait;
use sqlx::{query, query_as, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::repository::errors::{map_sqlx_error, RbacRepositoryError};
use crate::repository::models::PermissionRow;
use crate::repository::traits::PermissionRepositoryTrait;

#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pub pool: SqlitePool,
}

impl PermissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepositoryTrait for PermissionRepository {
    async fn get_permissions(&self) -> Result<Vec<PermissionRow>, RbacRepositoryError> {
        let permissions = query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description FROM permissions ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(permissions)
    }

    async fn get_permissions_by_ids(
        &self,
        permission_ids: &[String],
    ) -> Result<Vec<PermissionRow>, RbacRepositoryError> {
        if permission_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT id, name, description FROM permissions WHERE id IN (");
        let mut ids = builder.separated(", ");
        for permission_id in permission_ids {
            ids.push_bind(permission_id);
        }
        ids.push_unseparated(")");

        let permissions = builder
            .build_query_as::<PermissionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(permissions)
    }

    async fn upsert_permission(
        &self,
        name: &str,
        description: &str,
    ) -> Result<PermissionRow, RbacRepositoryError> {
        query(
            r#"
            INSERT INTO permissions (id, name, description)
            VALUES (?, ?, ?)
            ON CONFLICT (name) DO UPDATE SET description = excluded.description
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let permission = query_as::<_, PermissionRow>(
            r#"SELECT id, name, description FROM permissions WHERE name = ?"#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(permission)
    }

    async fn get_permissions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PermissionRow>, RbacRepositoryError> {
        let permissions = query_as::<_, PermissionRow>(
            r#"
            SELECT DISTINCT p.id, p.name, p.description
            FROM permissions p
            INNER JOIN role_permissions rp ON rp.permission_id = p.id
            INNER JOIN user_roles ur ON ur.role_id = rp.role_id
            WHERE ur.user_id = ?
            ORDER BY p.name ASC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(permissions)
    }
}
