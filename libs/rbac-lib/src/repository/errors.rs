#[derive(Debug)]
pub enum RbacRepositoryError {
    RoleNameAlreadyExists,
    PermissionNameAlreadyExists,
    EmailAlreadyExists,
    UserAlreadyHasRole,
    RoleInUse,
    UnknownPermission,
    NotFound,
    Sqlx(sqlx::Error),
}

impl std::fmt::Display for RbacRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RbacRepositoryError::RoleNameAlreadyExists => write!(f, "role name already exists"),
            RbacRepositoryError::PermissionNameAlreadyExists => {
                write!(f, "permission name already exists")
            }
            RbacRepositoryError::EmailAlreadyExists => write!(f, "email already exists"),
            RbacRepositoryError::UserAlreadyHasRole => write!(f, "user already has role"),
            RbacRepositoryError::RoleInUse => write!(f, "role is still assigned to users"),
            RbacRepositoryError::UnknownPermission => write!(f, "unknown permission"),
            RbacRepositoryError::NotFound => write!(f, "not found"),
            RbacRepositoryError::Sqlx(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RbacRepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RbacRepositoryError::Sqlx(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for RbacRepositoryError {
    fn from(value: sqlx::Error) -> Self {
        map_sqlx_error(value)
    }
}

const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";
// RESTRICT actions are enforced through SQLite's trigger machinery.
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";
const FOREIGN_KEY_FAILED: &str = "FOREIGN KEY constraint failed";

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };
    if db_err.is_foreign_key_violation() {
        return true;
    }
    let code = db_err.code();
    matches!(
        code.as_deref(),
        Some(SQLITE_CONSTRAINT_FOREIGNKEY | SQLITE_CONSTRAINT_TRIGGER)
    ) && db_err.message().contains(FOREIGN_KEY_FAILED)
}

/// Classifies SQLite unique violations by the column named in the message.
///
/// SQLite reports `UNIQUE constraint failed: <table>.<column>[, ...]` and drops the
/// constraint name, so the table-qualified column is the stable key.
pub fn map_sqlx_error(err: sqlx::Error) -> RbacRepositoryError {
    const USER_ROLES_PK: &str = "user_roles.user_id";
    const ROLE_NAME_UNIQUE: &str = "roles.name";
    const PERMISSION_NAME_UNIQUE: &str = "permissions.name";
    const USER_EMAIL_UNIQUE: &str = "users.email";

    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let msg = db_err.message().to_lowercase();

            // user_roles first: "user_roles.role_id" would otherwise read as a roles column.
            if msg.contains(USER_ROLES_PK) {
                return RbacRepositoryError::UserAlreadyHasRole;
            }
            if msg.contains(PERMISSION_NAME_UNIQUE) {
                return RbacRepositoryError::PermissionNameAlreadyExists;
            }
            if msg.contains(ROLE_NAME_UNIQUE) {
                return RbacRepositoryError::RoleNameAlreadyExists;
            }
            if msg.contains(USER_EMAIL_UNIQUE) {
                return RbacRepositoryError::EmailAlreadyExists;
            }
        }
    }

    RbacRepositoryError::Sqlx(err)
}
