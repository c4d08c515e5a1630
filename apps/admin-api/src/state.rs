use std::sync::Arc;

use rbac_lib::authorization::AuthorizationService;
use rbac_lib::repository::{PermissionRepository, RoleRepository, UserRepository, UserRoleRepository};
use rbac_lib::roles_service::RolesService;
use rbac_lib::util::SqlitePool;

use crate::config::ApiTokens;
use crate::error::is_prod_like;

#[derive(Clone)]
pub struct AppState {
    pub roles_service: Arc<RolesService>,
    pub authz_service: Arc<AuthorizationService>,
    pub tokens: Arc<ApiTokens>,
    pub pool: SqlitePool,
    pub env: String,
}

impl AppState {
    pub fn new(pool: SqlitePool, tokens: ApiTokens, env: impl Into<String>) -> Self {
        let roles_service = RolesService::new(
            RoleRepository::new(pool.clone()),
            PermissionRepository::new(pool.clone()),
            UserRoleRepository::new(pool.clone()),
        );
        let authz_service = AuthorizationService::new(
            UserRepository::new(pool.clone()),
            PermissionRepository::new(pool.clone()),
        );

        Self {
            roles_service: Arc::new(roles_service),
            authz_service: Arc::new(authz_service),
            tokens: Arc::new(tokens),
            pool,
            env: env.into(),
        }
    }

    pub fn is_prod_like(&self) -> bool {
        is_prod_like(&self.env)
    }
}
