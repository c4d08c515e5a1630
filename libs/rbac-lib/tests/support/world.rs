use std::collections::HashMap;

use cucumber::World;
use sqlx::SqlitePool;
use uuid::Uuid;

use rbac_lib::entities::Role;
use rbac_lib::errors_service::RbacServiceError;
use rbac_lib::repository::{PermissionRepository, RoleRepository, UserRepository, UserRoleRepository};
use rbac_lib::roles_service::RolesService;
use rbac_lib::util::connect_in_memory;

#[derive(Debug, Default, World)]
pub struct TestWorld {
    // State
    pub pool: Option<SqlitePool>,
    pub service: Option<RolesService>,
    pub permission_ids: HashMap<String, Uuid>,
    pub user_ids: HashMap<String, Uuid>,
    pub current_role_id: Option<Uuid>,

    // Results
    pub role_result: Option<Result<Role, RbacServiceError>>,
    pub delete_result: Option<Result<(), RbacServiceError>>,
    pub error: Option<RbacServiceError>,
}

impl TestWorld {
    pub async fn reset(&mut self) {
        let pool = connect_in_memory()
            .await
            .expect("in-memory database should open");
        *self = TestWorld::default();
        self.service = Some(RolesService::new(
            RoleRepository::new(pool.clone()),
            PermissionRepository::new(pool.clone()),
            UserRoleRepository::new(pool.clone()),
        ));
        self.pool = Some(pool);
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone().expect("database should be initialised")
    }

    pub fn service(&self) -> &RolesService {
        self.service.as_ref().expect("service should be initialised")
    }

    pub fn role_repo(&self) -> RoleRepository {
        RoleRepository::new(self.pool())
    }

    pub fn permission_repo(&self) -> PermissionRepository {
        PermissionRepository::new(self.pool())
    }

    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.pool())
    }

    pub fn user_role_repo(&self) -> UserRoleRepository {
        UserRoleRepository::new(self.pool())
    }

    pub fn role_id(&self) -> Uuid {
        self.current_role_id.expect("a role should have been created")
    }

    /// Resolves a comma separated list of permission names to their ids.
    pub fn ids_for(&self, names: &str) -> Vec<Uuid> {
        split_names(names)
            .iter()
            .map(|name| {
                *self
                    .permission_ids
                    .get(name)
                    .unwrap_or_else(|| panic!("permission {name} was not seeded"))
            })
            .collect()
    }

    /// Keeps the outcome of a role operation and tracks the role it produced.
    pub fn record_role(&mut self, result: Result<Role, RbacServiceError>) {
        match result {
            Ok(role) => {
                self.current_role_id = Some(role.id);
                self.error = None;
                self.delete_result = None;
                self.role_result = Some(Ok(role));
            }
            Err(e) => {
                self.error = Some(e);
                self.role_result = None;
                self.delete_result = None;
            }
        }
    }

    /// The error of the most recent operation, if it failed.
    pub fn failure(&self) -> Option<&RbacServiceError> {
        self.error
            .as_ref()
            .or_else(|| self.delete_result.as_ref().and_then(|r| r.as_ref().err()))
    }
}

pub fn split_names(names: &str) -> Vec<String> {
    names
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}
