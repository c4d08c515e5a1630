use crate::entities::{CreateRole, Permission, Role, UpdateRole};
use crate::errors_service::RbacServiceError;
use crate::repository::errors::RbacRepositoryError;
use crate::repository::models::{PermissionRow, RoleChanges, RolePermissionMapping, RoleRow};
use crate::repository::traits::{
    PermissionRepositoryTrait, RoleRepositoryTrait, UserRoleRepositoryTrait,
};
use crate::repository::{PermissionRepository, RoleRepository, UserRoleRepository};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

fn parse_uuid(s: &str) -> Result<Uuid, RbacServiceError> {
    Uuid::parse_str(s).map_err(|_| RbacServiceError::InvalidUuid(s.to_string()))
}

const MAX_ROLE_NAME_LENGTH: usize = 255;

fn validate_role_name(name: &str) -> Result<&str, RbacServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RbacServiceError::Validation(
            "role name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_ROLE_NAME_LENGTH {
        return Err(RbacServiceError::Validation(format!(
            "role name cannot exceed {MAX_ROLE_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

/// Collapses repeated ids, keeping first-seen order.
fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn permission_from_row(row: PermissionRow) -> Result<Permission, RbacServiceError> {
    Ok(Permission {
        id: parse_uuid(&row.id)?,
        name: row.name,
        description: row.description,
    })
}

fn permission_from_mapping(
    mapping: RolePermissionMapping,
) -> Result<(String, Permission), RbacServiceError> {
    let permission = Permission {
        id: parse_uuid(&mapping.permission_id)?,
        name: mapping.permission_name,
        description: mapping.permission_description,
    };
    Ok((mapping.role_id, permission))
}

fn role_from_row(row: RoleRow, permissions: Vec<Permission>) -> Result<Role, RbacServiceError> {
    Ok(Role {
        id: parse_uuid(&row.id)?,
        name: row.name,
        description: row.description,
        created_at: row.created_at,
        updated_at: row.updated_at,
        permissions,
    })
}

/// Role administration on top of the role, permission and assignment stores.
#[derive(Debug, Clone)]
pub struct RolesService<R = RoleRepository, P = PermissionRepository, UR = UserRoleRepository>
where
    R: RoleRepositoryTrait,
    P: PermissionRepositoryTrait,
    UR: UserRoleRepositoryTrait,
{
    pub role_repo: Arc<R>,
    pub permission_repo: Arc<P>,
    pub user_role_repo: Arc<UR>,
}

impl RolesService<RoleRepository, PermissionRepository, UserRoleRepository> {
    pub fn new(
        role_repo: RoleRepository,
        permission_repo: PermissionRepository,
        user_role_repo: UserRoleRepository,
    ) -> Self {
        Self {
            role_repo: Arc::new(role_repo),
            permission_repo: Arc::new(permission_repo),
            user_role_repo: Arc::new(user_role_repo),
        }
    }
}

impl<R, P, UR> RolesService<R, P, UR>
where
    R: RoleRepositoryTrait,
    P: PermissionRepositoryTrait,
    UR: UserRoleRepositoryTrait,
{
    pub fn with_repos(role_repo: Arc<R>, permission_repo: Arc<P>, user_role_repo: Arc<UR>) -> Self {
        Self {
            role_repo,
            permission_repo,
            user_role_repo,
        }
    }

    async fn build_roles_with_permissions(
        &self,
        role_rows: Vec<RoleRow>,
    ) -> Result<Vec<Role>, RbacServiceError> {
        if role_rows.is_empty() {
            return Ok(vec![]);
        }

        let role_ids: Vec<String> = role_rows.iter().map(|r| r.id.clone()).collect();
        let mappings = self.role_repo.get_permissions_for_roles(&role_ids).await?;

        let mut permissions_by_role: HashMap<String, Vec<Permission>> = HashMap::new();
        for mapping in mappings {
            let (role_id, permission) = permission_from_mapping(mapping)?;
            permissions_by_role.entry(role_id).or_default().push(permission);
        }

        role_rows
            .into_iter()
            .map(|row| {
                let permissions = permissions_by_role.remove(&row.id).unwrap_or_default();
                role_from_row(row, permissions)
            })
            .collect()
    }

    async fn build_role_with_permissions(&self, row: RoleRow) -> Result<Role, RbacServiceError> {
        self.build_roles_with_permissions(vec![row])
            .await?
            .pop()
            .ok_or(RbacServiceError::NotFound)
    }

    /// Returns the distinct ids as stored strings, or every id that does not resolve.
    async fn resolve_permission_ids(
        &self,
        permission_ids: &[Uuid],
    ) -> Result<Vec<String>, RbacServiceError> {
        let requested = dedup_ids(permission_ids);
        let requested_strs: Vec<String> = requested.iter().map(Uuid::to_string).collect();

        let found: HashSet<String> = self
            .permission_repo
            .get_permissions_by_ids(&requested_strs)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect();

        let missing: Vec<Uuid> = requested
            .iter()
            .zip(&requested_strs)
            .filter(|(_, id)| !found.contains(*id))
            .map(|(uuid, _)| *uuid)
            .collect();

        if !missing.is_empty() {
            return Err(RbacServiceError::InvalidPermissionIds(missing));
        }
        Ok(requested_strs)
    }

    async fn ensure_name_available(
        &self,
        name: &str,
        current_role: Option<&str>,
    ) -> Result<(), RbacServiceError> {
        match self.role_repo.get_role_by_name(name).await? {
            Some(existing) if Some(existing.id.as_str()) != current_role => {
                Err(RbacServiceError::RoleNameAlreadyExists)
            }
            _ => Ok(()),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<Role>, RbacServiceError> {
        let rows = self.role_repo.get_roles().await?;
        self.build_roles_with_permissions(rows).await
    }

    pub async fn find_by_id(&self, role_id: Uuid) -> Result<Role, RbacServiceError> {
        let row = self
            .role_repo
            .get_role(role_id)
            .await?
            .ok_or(RbacServiceError::NotFound)?;
        self.build_role_with_permissions(row).await
    }

    pub async fn create(&self, input: CreateRole) -> Result<Role, RbacServiceError> {
        let name = validate_role_name(&input.name)?;
        self.ensure_name_available(name, None).await?;
        let permission_ids = self.resolve_permission_ids(&input.permission_ids).await?;

        let row = self
            .role_repo
            .create_role(name, input.description, &permission_ids)
            .await
            .map_err(|e| match e {
                RbacRepositoryError::UnknownPermission => {
                    RbacServiceError::InvalidPermissionIds(dedup_ids(&input.permission_ids))
                }
                other => RbacServiceError::from(other),
            })?;

        tracing::info!(
            role_id = %row.id,
            role_name = %row.name,
            permissions = permission_ids.len(),
            "role created"
        );
        self.build_role_with_permissions(row).await
    }

    pub async fn update(&self, role_id: Uuid, input: UpdateRole) -> Result<Role, RbacServiceError> {
        let current = self
            .role_repo
            .get_role(role_id)
            .await?
            .ok_or(RbacServiceError::NotFound)?;

        let name = match input.name.as_deref() {
            Some(name) => {
                let name = validate_role_name(name)?;
                self.ensure_name_available(name, Some(current.id.as_str())).await?;
                Some(name.to_string())
            }
            None => None,
        };

        let permission_ids = match &input.permission_ids {
            Some(ids) => Some(self.resolve_permission_ids(ids).await?),
            None => None,
        };
        let replaced = permission_ids.as_ref().map(Vec::len);

        let changes = RoleChanges {
            name,
            description: input.description,
            permission_ids,
        };

        let row = self
            .role_repo
            .update_role(role_id, changes)
            .await
            .map_err(|e| match (e, &input.permission_ids) {
                (RbacRepositoryError::UnknownPermission, Some(ids)) => {
                    RbacServiceError::InvalidPermissionIds(dedup_ids(ids))
                }
                (other, _) => RbacServiceError::from(other),
            })?;

        tracing::info!(
            role_id = %row.id,
            role_name = %row.name,
            replaced_permissions = ?replaced,
            "role updated"
        );
        self.build_role_with_permissions(row).await
    }

    pub async fn delete(&self, role_id: Uuid) -> Result<(), RbacServiceError> {
        if self.role_repo.get_role(role_id).await?.is_none() {
            return Err(RbacServiceError::NotFound);
        }

        let assigned = self.user_role_repo.count_users_with_role(role_id).await?;
        if assigned > 0 {
            return Err(RbacServiceError::RoleInUse(assigned));
        }

        self.role_repo.delete_role(role_id).await?;
        tracing::info!(role_id = %role_id, "role deleted");
        Ok(())
    }

    pub async fn get_permissions(&self) -> Result<Vec<Permission>, RbacServiceError> {
        self.permission_repo
            .get_permissions()
            .await?
            .into_iter()
            .map(permission_from_row)
            .collect()
    }
}
