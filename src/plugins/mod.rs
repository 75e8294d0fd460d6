//! Standard plugins shipped with the engine.

mod inline_input;
mod null_output;
mod remove_columns;
mod rename;


pub use inline_input::InlineInputPlugin;
pub use null_output::NullOutputPlugin;
pub use remove_columns::RemoveColumnsFilterPlugin;
pub use rename::RenameFilterPlugin;
