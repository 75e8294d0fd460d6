//! Value kinds, columns and schemas shared by every pipeline stage.

mod accessor;
mod column;
mod errors;
mod schema;
mod timestamp;
mod type_tag;
mod value;
mod visitor;


pub use accessor::{ColumnReader, ColumnWriter};
pub use column::{Column, ColumnConfig};
pub use errors::TypeError;
pub use schema::{Schema, SchemaBuilder};
pub use timestamp::{NANOS_PER_SECOND, Timestamp};
pub use type_tag::TypeTag;
pub use value::Value;
pub use visitor::ColumnVisitor;
