use chrono::{DateTime, Utc};
use rbac_lib::entities::{CreateRole, Permission, Role, UpdateRole};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub permission_ids: Vec<Uuid>,
}

impl From<CreateRoleRequest> for CreateRole {
    fn from(request: CreateRoleRequest) -> Self {
        CreateRole {
            name: request.name,
            description: request.description,
            permission_ids: request.permission_ids,
        }
    }
}

/// Omitted fields are left unchanged; `permissionIds` replaces the whole set.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Option<Vec<Uuid>>,
}

impl From<UpdateRoleRequest> for UpdateRole {
    fn from(request: UpdateRoleRequest) -> Self {
        UpdateRole {
            name: request.name,
            description: request.description,
            permission_ids: request.permission_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PermissionResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<Permission> for PermissionResponse {
    fn from(permission: Permission) -> Self {
        PermissionResponse {
            id: permission.id,
            name: permission.name,
            description: permission.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub permissions: Vec<PermissionResponse>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        RoleResponse {
            id: role.id,
            name: role.name,
            description: role.description,
            created_at: role.created_at,
            updated_at: role.updated_at,
            permissions: role
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}
