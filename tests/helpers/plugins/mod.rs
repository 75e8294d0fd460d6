pub mod collecting_output;
pub mod scripted_input;

pub use collecting_output::{CollectingOutput, OutputFailure};
pub use scripted_input::{InputFailure, ScriptedInput};
