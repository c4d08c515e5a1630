pub mod routes;
pub mod entities;
pub mod health_check;
pub mod get_roles;
pub mod get_role_by_id;
pub mod create_role;
pub mod update_role;
pub mod delete_role;
pub mod get_permissions;
