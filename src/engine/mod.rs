pub mod exec;
pub mod page;
pub mod plugin;
pub mod types;
