pub mod record_factory;
pub mod schema_factory;
pub mod session_factory;

#[cfg(test)]
mod record_factory_test;
#[cfg(test)]
mod schema_factory_test;

pub use record_factory::RecordFactory;
pub use schema_factory::SchemaFactory;
pub use session_factory::SessionFactory;
