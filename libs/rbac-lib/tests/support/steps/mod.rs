pub mod given;
pub mod then_role;
pub mod when_role;
