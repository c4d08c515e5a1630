use async_trait::async_trait;
use sqlx::{query, query_as, QueryBuilder, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::repository::errors::{is_foreign_key_violation, map_sqlx_error, RbacRepositoryError};
use crate::repository::models::{RoleChanges, RolePermissionMapping, RoleRow};
use crate::repository::traits::RoleRepositoryTrait;
use crate::util::timestamp;

const SELECT_ROLE: &str = "SELECT id, name, description, created_at, updated_at FROM roles";

#[derive(Debug, Clone)]
pub struct RoleRepository {
    pub pool: SqlitePool,
}

impl RoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_role_permissions(
    tx: &mut Transaction<'_, Sqlite>,
    insert: &str,
    role_id: &str,
    permission_ids: &[String],
) -> Result<(), RbacRepositoryError> {
    if permission_ids.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(insert);
    builder.push(" INTO role_permissions (role_id, permission_id) ");
    builder.push_values(permission_ids, |mut row, permission_id| {
        row.push_bind(role_id).push_bind(permission_id);
    });

    builder.build().execute(&mut **tx).await.map_err(|e| {
        // A permission removed after the service validated the ids.
        if is_foreign_key_violation(&e) {
            RbacRepositoryError::UnknownPermission
        } else {
            map_sqlx_error(e)
        }
    })?;
    Ok(())
}

async fn fetch_role(
    tx: &mut Transaction<'_, Sqlite>,
    role_id: &str,
) -> Result<RoleRow, RbacRepositoryError> {
    let role = query_as::<_, RoleRow>(&format!("{SELECT_ROLE} WHERE id = ?"))
        .bind(role_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;
    Ok(role)
}

#[async_trait]
impl RoleRepositoryTrait for RoleRepository {
    async fn create_role(
        &self,
        name: &str,
        description: Option<String>,
        permission_ids: &[String],
    ) -> Result<RoleRow, RbacRepositoryError> {
        let id = Uuid::new_v4().to_string();
        let now = timestamp();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        query(
            r#"
            INSERT INTO roles (id, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(description)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        insert_role_permissions(&mut tx, "INSERT", &id, permission_ids).await?;

        let role = fetch_role(&mut tx, &id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(role)
    }

    async fn get_role(&self, role_id: Uuid) -> Result<Option<RoleRow>, RbacRepositoryError> {
        let role = query_as::<_, RoleRow>(&format!("{SELECT_ROLE} WHERE id = ?"))
            .bind(role_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(role)
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<RoleRow>, RbacRepositoryError> {
        let role = query_as::<_, RoleRow>(&format!("{SELECT_ROLE} WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(role)
    }

    async fn update_role(
        &self,
        role_id: Uuid,
        changes: RoleChanges,
    ) -> Result<RoleRow, RbacRepositoryError> {
        let id = role_id.to_string();
        let now = timestamp();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = query(
            r#"
            UPDATE roles
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(changes.name)
        .bind(changes.description)
        .bind(&now)
        .bind(&id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RbacRepositoryError::NotFound);
        }

        if let Some(permission_ids) = changes.permission_ids {
            query("DELETE FROM role_permissions WHERE role_id = ?")
                .bind(&id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

            insert_role_permissions(&mut tx, "INSERT", &id, &permission_ids).await?;
        }

        let role = fetch_role(&mut tx, &id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(role)
    }

    async fn delete_role(&self, role_id: Uuid) -> Result<(), RbacRepositoryError> {
        let result = query("DELETE FROM roles WHERE id = ?")
            .bind(role_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    RbacRepositoryError::RoleInUse
                } else {
                    map_sqlx_error(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(RbacRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get_roles(&self) -> Result<Vec<RoleRow>, RbacRepositoryError> {
        let roles = query_as::<_, RoleRow>(&format!(
            "{SELECT_ROLE} ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(roles)
    }

    async fn get_permissions_for_roles(
        &self,
        role_ids: &[String],
    ) -> Result<Vec<RolePermissionMapping>, RbacRepositoryError> {
        if role_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT rp.role_id,
                   p.id AS permission_id,
                   p.name AS permission_name,
                   p.description AS permission_description
            FROM role_permissions rp
            INNER JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id IN (
            "#,
        );
        let mut ids = builder.separated(", ");
        for role_id in role_ids {
            ids.push_bind(role_id);
        }
        ids.push_unseparated(") ORDER BY p.name ASC");

        let mappings = builder
            .build_query_as::<RolePermissionMapping>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(mappings)
    }

    async fn ensure_role(
        &self,
        name: &str,
        description: Option<String>,
    ) -> Result<RoleRow, RbacRepositoryError> {
        let now = timestamp();
        query(
            r#"
            INSERT INTO roles (id, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(description)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        self.get_role_by_name(name)
            .await?
            .ok_or(RbacRepositoryError::NotFound)
    }

    async fn grant_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[String],
    ) -> Result<(), RbacRepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        insert_role_permissions(&mut tx, "INSERT OR IGNORE", &role_id.to_string(), permission_ids)
            .await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}
