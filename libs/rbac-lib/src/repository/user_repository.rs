use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};
use uuid::Uuid;
use crate::repository::models::UserRow;
use crate::repository::errors::RbacRepositoryError;
use crate::repository::traits::UserRepositoryTrait;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pub pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create_user(&self, email: &str, password_hash: &str, name: &str) -> Result<UserRow, RbacRepositoryError> {
        let user_id = Uuid::new_v4();

        query(
            r#"
            INSERT INTO users (id, email, password, name, is_active)
            VALUES (?, ?, ?, ?, 1)
            "#
        )
        .bind(user_id.to_string())
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(RbacRepositoryError::from)?;

        let user = query_as::<_, UserRow>(
            r#"
            SELECT id, email, password, name, is_active FROM users WHERE id = ?
            "#
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(RbacRepositoryError::from)?;

        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, RbacRepositoryError> {
        let user = query_as::<_, UserRow>(
            r#"
            SELECT id, email, password, name, is_active FROM users WHERE id = ?
            "#
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(RbacRepositoryError::from)?;

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, RbacRepositoryError> {
        let user = query_as::<_, UserRow>(
            r#"
            SELECT id, email, password, name, is_active FROM users WHERE email = ?
            "#
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(RbacRepositoryError::from)?;

        Ok(user)
    }
}
