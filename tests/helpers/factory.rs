pub use super::factories::{RecordFactory, SchemaFactory, SessionFactory};
pub use super::plugins::{CollectingOutput, InputFailure, OutputFailure, ScriptedInput};

pub struct Factory;

impl Factory {
    pub fn schema() -> SchemaFactory {
        SchemaFactory::new()
    }

    pub fn records() -> RecordFactory {
        RecordFactory::new()
    }

    pub fn session() -> SessionFactory {
        SessionFactory::new()
    }
}
