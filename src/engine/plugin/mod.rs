mod chain;
mod errors;
mod filter;
mod input;
mod output;


pub use chain::{FilterChain, FilterStage};
pub use errors::PluginError;
pub use filter::{FilterPlugin, FilterTransaction};
pub use input::{InputPlugin, InputTransaction};
pub use output::{OutputPlugin, TransactionalPageOutput};
