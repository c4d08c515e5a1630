use rbac_lib::entities::User;
use rbac_lib::repository::errors::RbacRepositoryError;
use rbac_lib::repository::traits::{RoleRepositoryTrait, UserRepositoryTrait, UserRoleRepositoryTrait};
use rbac_lib::repository::{PermissionRepository, RoleRepository, UserRepository, UserRoleRepository};
use rbac_lib::seed::{initialize_root_user, seed_catalog, RootUserConfig, SeedSummary};
use rbac_lib::util::{connect_with_retry, SqlitePool};
use rbac_lib::MIGRATOR;

pub struct RbacSetup {
    roles: RoleRepository,
    permissions: PermissionRepository,
    users: UserRepository,
    user_roles: UserRoleRepository,
    pool: SqlitePool,
}

impl RbacSetup {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            roles: RoleRepository::new(pool.clone()),
            permissions: PermissionRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            user_roles: UserRoleRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn from_env() -> Result<Self, String> {
        let db_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;
        let pool = connect_with_retry(&db_url, 5)
            .await
            .map_err(|e| format!("Failed to connect to database: {e}"))?;
        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), String> {
        tracing::info!("running rbac-lib migrations");
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| format!("Migration failed: {e}"))
    }

    pub async fn seed(&self) -> Result<SeedSummary, String> {
        seed_catalog(&self.roles, &self.permissions)
            .await
            .map_err(|e| format!("Seeding failed: {e}"))
    }

    pub async fn root_user(&self, config: &RootUserConfig) -> Result<User, String> {
        initialize_root_user(&self.users, &self.roles, &self.user_roles, config)
            .await
            .map_err(|e| format!("Root user initialization failed: {e}"))
    }

    /// Returns the stored ids of the user (by email) and the role (by name).
    async fn resolve(&self, email: &str, role_name: &str) -> Result<(String, String), String> {
        let user = self
            .users
            .get_user_by_email(email)
            .await
            .map_err(|e| format!("Failed to look up user: {e}"))?
            .ok_or_else(|| format!("No user with email {email}"))?;
        let role = self
            .roles
            .get_role_by_name(role_name)
            .await
            .map_err(|e| format!("Failed to look up role: {e}"))?
            .ok_or_else(|| format!("No role named {role_name}"))?;
        Ok((user.id, role.id))
    }

    /// Returns `false` when the user already held the role.
    pub async fn assign(&self, email: &str, role_name: &str) -> Result<bool, String> {
        let (user_id, role_id) = self.resolve(email, role_name).await?;
        match self.user_roles.assign_role(&user_id, &role_id).await {
            Ok(()) => {
                tracing::info!(user_id = %user_id, role = role_name, "role assigned");
                Ok(true)
            }
            Err(RbacRepositoryError::UserAlreadyHasRole) => Ok(false),
            Err(e) => Err(format!("Failed to assign role: {e}")),
        }
    }

    pub async fn unassign(&self, email: &str, role_name: &str) -> Result<(), String> {
        let (user_id, role_id) = self.resolve(email, role_name).await?;
        self.user_roles
            .unassign_role(&user_id, &role_id)
            .await
            .map_err(|e| format!("Failed to unassign role: {e}"))?;
        tracing::info!(user_id = %user_id, role = role_name, "role unassigned");
        Ok(())
    }
}
