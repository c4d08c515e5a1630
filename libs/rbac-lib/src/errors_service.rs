use uuid::Uuid;

use crate::repository::errors::RbacRepositoryError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RbacServiceError {
    #[error("role name already exists")]
    RoleNameAlreadyExists,

    #[error("permission name already exists")]
    PermissionNameAlreadyExists,

    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("user already has role")]
    UserAlreadyHasRole,

    #[error("resource not found")]
    NotFound,

    #[error("invalid permission ids: {}", join_ids(.0))]
    InvalidPermissionIds(Vec<Uuid>),

    #[error("role is assigned to {0} user(s) and cannot be deleted")]
    RoleInUse(u64),

    #[error("invalid UUID in database: {0}")]
    InvalidUuid(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<RbacRepositoryError> for RbacServiceError {
    fn from(err: RbacRepositoryError) -> Self {
        match err {
            RbacRepositoryError::RoleNameAlreadyExists => RbacServiceError::RoleNameAlreadyExists,
            RbacRepositoryError::PermissionNameAlreadyExists => {
                RbacServiceError::PermissionNameAlreadyExists
            }
            RbacRepositoryError::EmailAlreadyExists => RbacServiceError::EmailAlreadyExists,
            RbacRepositoryError::UserAlreadyHasRole => RbacServiceError::UserAlreadyHasRole,
            // The store only knows an assignment still exists, not how many.
            RbacRepositoryError::RoleInUse => RbacServiceError::RoleInUse(1),
            RbacRepositoryError::UnknownPermission => RbacServiceError::InvalidPermissionIds(vec![]),
            RbacRepositoryError::NotFound => RbacServiceError::NotFound,
            RbacRepositoryError::Sqlx(e) => RbacServiceError::Internal(e.into()),
        }
    }
}
