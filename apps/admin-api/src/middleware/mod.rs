pub mod authorization;
pub mod ip_filter;
