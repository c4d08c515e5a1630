pub mod entities;
pub mod repository;
pub mod util;
pub mod roles_service;
pub mod authorization;
pub mod errors_service;
pub mod seed;

pub use entities::*;
pub use roles_service::*;
pub use authorization::*;
pub use errors_service::*;
pub use seed::*;
pub use util::MIGRATOR;
