use serde::Deserialize;
use serde_json::Value;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct TestScenario {
    pub name: String,
    /// Pipeline document with `in`, `filters` and `out` sections. Every
    /// section names its plugin under `type`.
    pub pipeline: Value,
    pub expect: Expectation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Expectation {
    Committed {
        records_per_partition: Vec<u64>,
        last_row_count: u64,
    },
    Rejected {
        stage: String,
        message_contains: String,
    },
}

pub fn load_scenarios_from_json(path: &str) -> Vec<TestScenario> {
    let content = fs::read_to_string(path).expect("Failed to read scenario file");
    serde_json::from_str(&content).expect("Invalid JSON format")
}
