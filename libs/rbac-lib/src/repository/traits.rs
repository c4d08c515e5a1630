use async_trait::async_trait;
use uuid::Uuid;

use crate::repository::errors::RbacRepositoryError;
use crate::repository::models::{
    PermissionRow, RoleChanges, RolePermissionMapping, RoleRow, UserRow,
};

#[async_trait]
pub trait RoleRepositoryTrait: Send + Sync {
    /// Inserts the role and its permission links in one transaction.
    async fn create_role(
        &self,
        name: &str,
        description: Option<String>,
        permission_ids: &[String],
    ) -> Result<RoleRow, RbacRepositoryError>;
    async fn get_role(&self, role_id: Uuid) -> Result<Option<RoleRow>, RbacRepositoryError>;
    async fn get_role_by_name(&self, name: &str) -> Result<Option<RoleRow>, RbacRepositoryError>;
    /// Applies column changes and, when given, replaces the permission set in one transaction.
    async fn update_role(&self, role_id: Uuid, changes: RoleChanges) -> Result<RoleRow, RbacRepositoryError>;
    async fn delete_role(&self, role_id: Uuid) -> Result<(), RbacRepositoryError>;
    async fn get_roles(&self) -> Result<Vec<RoleRow>, RbacRepositoryError>;
    async fn get_permissions_for_roles(&self, role_ids: &[String]) -> Result<Vec<RolePermissionMapping>, RbacRepositoryError>;
    async fn ensure_role(&self, name: &str, description: Option<String>) -> Result<RoleRow, RbacRepositoryError>;
    async fn grant_permissions(&self, role_id: Uuid, permission_ids: &[String]) -> Result<(), RbacRepositoryError>;
}

#[async_trait]
pub trait PermissionRepositoryTrait: Send + Sync {
    async fn get_permissions(&self) -> Result<Vec<PermissionRow>, RbacRepositoryError>;
    async fn get_permissions_by_ids(&self, permission_ids: &[String]) -> Result<Vec<PermissionRow>, RbacRepositoryError>;
    async fn upsert_permission(&self, name: &str, description: &str) -> Result<PermissionRow, RbacRepositoryError>;
    async fn get_permissions_for_user(&self, user_id: Uuid) -> Result<Vec<PermissionRow>, RbacRepositoryError>;
}

#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn create_user(&self, email: &str, password_hash: &str, name: &str) -> Result<UserRow, RbacRepositoryError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, RbacRepositoryError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, RbacRepositoryError>;
}

#[async_trait]
pub trait UserRoleRepositoryTrait: Send + Sync {
    async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<(), RbacRepositoryError>;
    async fn unassign_role(&self, user_id: &str, role_id: &str) -> Result<(), RbacRepositoryError>;
    async fn count_users_with_role(&self, role_id: Uuid) -> Result<u64, RbacRepositoryError>;
}
