pub mod user_repository;
pub mod role_repository;
pub mod permission_repository;
pub mod user_role_repository;
pub mod models;
pub mod errors;
pub mod traits;

pub use user_repository::UserRepository;
pub use role_repository::RoleRepository;
pub use permission_repository::PermissionRepository;
pub use user_role_repository::UserRoleRepository;
pub use errors::RbacRepositoryError;
