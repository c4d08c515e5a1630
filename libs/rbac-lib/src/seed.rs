/// Catalog and root user seeding
///
/// Creates the permission catalog, the default roles and, optionally, the root
/// administrative user. Every step is an upsert by name, so the routine can run on
/// each deployment.
use crate::entities::User;
use crate::errors_service::RbacServiceError;
use crate::repository::errors::RbacRepositoryError;
use crate::repository::models::PermissionRow;
use crate::repository::traits::{
    PermissionRepositoryTrait, RoleRepositoryTrait, UserRepositoryTrait, UserRoleRepositoryTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

pub const ADMIN_READ: &str = "admin:read";
pub const ADMIN_WRITE: &str = "admin:write";
pub const ADMIN_ROLE: &str = "admin";

pub const PERMISSION_CATALOG: &[(&str, &str)] = &[
    ("metrics:read", "View dashboards and metrics"),
    ("jobs:read", "View batch job runs"),
    ("jobs:write", "Trigger and cancel batch jobs"),
    ("prompts:read", "View prompt templates"),
    ("prompts:write", "Create and edit prompt templates"),
    ("analysis:use", "Open analysis sessions"),
    (ADMIN_READ, "View roles and permissions"),
    (ADMIN_WRITE, "Manage roles and permissions"),
];

#[derive(Debug, Clone, Copy)]
pub enum DefaultGrant {
    All,
    Only(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct DefaultRole {
    pub name: &'static str,
    pub description: &'static str,
    pub grant: DefaultGrant,
}

pub const DEFAULT_ROLES: &[DefaultRole] = &[
    DefaultRole {
        name: ADMIN_ROLE,
        description: "Full access",
        grant: DefaultGrant::All,
    },
    DefaultRole {
        name: "analyst",
        description: "Dashboards, jobs, prompts and analysis sessions",
        grant: DefaultGrant::Only(&[
            "metrics:read",
            "jobs:read",
            "jobs:write",
            "prompts:read",
            "prompts:write",
            "analysis:use",
        ]),
    },
    DefaultRole {
        name: "viewer",
        description: "Read-only dashboards",
        grant: DefaultGrant::Only(&["metrics:read", "jobs:read"]),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub permissions: usize,
    pub roles: usize,
}

/// Upserts the permission catalog and the default roles.
///
/// Default roles receive any catalog permission they are missing; permissions an
/// administrator added to them are left alone.
pub async fn seed_catalog<R, P>(
    role_repo: &R,
    permission_repo: &P,
) -> Result<SeedSummary, RbacServiceError>
where
    R: RoleRepositoryTrait,
    P: PermissionRepositoryTrait,
{
    let mut by_name: HashMap<String, PermissionRow> = HashMap::new();
    for (name, description) in PERMISSION_CATALOG {
        let row = permission_repo.upsert_permission(name, description).await?;
        by_name.insert(row.name.clone(), row);
    }
    tracing::info!(count = by_name.len(), "permission catalog seeded");

    for role in DEFAULT_ROLES {
        let row = role_repo
            .ensure_role(role.name, Some(role.description.to_string()))
            .await?;
        let role_id = Uuid::parse_str(&row.id)
            .map_err(|e| RbacServiceError::InvalidUuid(e.to_string()))?;

        let permission_ids: Vec<String> = match role.grant {
            DefaultGrant::All => PERMISSION_CATALOG
                .iter()
                .filter_map(|(name, _)| by_name.get(*name))
                .map(|p| p.id.clone())
                .collect(),
            DefaultGrant::Only(names) => names
                .iter()
                .filter_map(|name| by_name.get(*name))
                .map(|p| p.id.clone())
                .collect(),
        };

        role_repo.grant_permissions(role_id, &permission_ids).await?;
        tracing::info!(
            role_id = %role_id,
            role_name = role.name,
            permissions = permission_ids.len(),
            "default role seeded"
        );
    }

    Ok(SeedSummary {
        permissions: by_name.len(),
        roles: DEFAULT_ROLES.len(),
    })
}

/// Configuration for root user initialization
#[derive(Debug, Clone)]
pub struct RootUserConfig {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl RootUserConfig {
    /// Load root user configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let email = lookup("ROOT_USER_EMAIL")
            .ok_or("ROOT_USER_EMAIL environment variable not set")?;
        if email.trim().is_empty() {
            return Err("ROOT_USER_EMAIL cannot be empty".to_string());
        }

        let password = lookup("ROOT_USER_PASSWORD")
            .ok_or("ROOT_USER_PASSWORD environment variable not set")?;
        if password.is_empty() {
            return Err("ROOT_USER_PASSWORD cannot be empty".to_string());
        }

        let name = lookup("ROOT_USER_NAME")
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Root User".to_string());

        Ok(Self {
            email: email.trim().to_string(),
            name,
            password,
        })
    }
}

pub fn hash_password(password: &str) -> Result<String, RbacServiceError> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| RbacServiceError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Initialize the root user and give it the admin role
///
/// Expects [`seed_catalog`] to have run so the admin role exists. An existing user
/// with the same email is kept as is (password untouched) and only gains the role.
pub async fn initialize_root_user<U, R, UR>(
    user_repo: &U,
    role_repo: &R,
    user_role_repo: &UR,
    config: &RootUserConfig,
) -> Result<User, RbacServiceError>
where
    U: UserRepositoryTrait,
    R: RoleRepositoryTrait,
    UR: UserRoleRepositoryTrait,
{
    let admin_role = role_repo
        .get_role_by_name(ADMIN_ROLE)
        .await?
        .ok_or(RbacServiceError::NotFound)?;

    let user_row = match user_repo.get_user_by_email(&config.email).await? {
        Some(existing) => {
            tracing::info!(user_id = %existing.id, email = %existing.email, "root user already exists");
            existing
        }
        None => {
            tracing::info!(email = %config.email, "creating root user");
            let password_hash = hash_password(&config.password)?;
            user_repo
                .create_user(&config.email, &password_hash, &config.name)
                .await?
        }
    };

    match user_role_repo.assign_role(&user_row.id, &admin_role.id).await {
        Ok(()) => tracing::info!(user_id = %user_row.id, "admin role assigned to root user"),
        Err(RbacRepositoryError::UserAlreadyHasRole) => {
            tracing::info!("root user already has admin role")
        }
        Err(e) => return Err(e.into()),
    }

    Ok(User {
        id: Uuid::parse_str(&user_row.id)
            .map_err(|e| RbacServiceError::InvalidUuid(e.to_string()))?,
        email: user_row.email,
        name: user_row.name,
        is_active: user_row.is_active,
    })
}
