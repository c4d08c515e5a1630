use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::errors_service::RbacServiceError;
use crate::repository::traits::{PermissionRepositoryTrait, UserRepositoryTrait};
use crate::repository::{PermissionRepository, UserRepository};

/// An authenticated user and the union of the permissions granted by its roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub permissions: BTreeSet<String>,
}

impl Principal {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationService<U = UserRepository, P = PermissionRepository>
where
    U: UserRepositoryTrait,
    P: PermissionRepositoryTrait,
{
    pub user_repo: Arc<U>,
    pub permission_repo: Arc<P>,
}

impl AuthorizationService<UserRepository, PermissionRepository> {
    pub fn new(user_repo: UserRepository, permission_repo: PermissionRepository) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
            permission_repo: Arc::new(permission_repo),
        }
    }
}

impl<U, P> AuthorizationService<U, P>
where
    U: UserRepositoryTrait,
    P: PermissionRepositoryTrait,
{
    pub fn with_repos(user_repo: Arc<U>, permission_repo: Arc<P>) -> Self {
        Self {
            user_repo,
            permission_repo,
        }
    }

    /// Unknown and deactivated users resolve to `None`.
    pub async fn resolve_principal(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Principal>, RbacServiceError> {
        let Some(user) = self.user_repo.get_user(user_id).await? else {
            return Ok(None);
        };

        if !user.is_active {
            tracing::debug!(user_id = %user_id, "inactive user rejected");
            return Ok(None);
        }

        let permissions = self
            .permission_repo
            .get_permissions_for_user(user_id)
            .await?
            .into_iter()
            .map(|row| row.name)
            .collect();

        Ok(Some(Principal {
            user_id,
            email: user.email,
            permissions,
        }))
    }
}
