use bulk_flow::engine::exec::{ExecSession, ExecutionError, LocalExecutor, Pipeline};
use bulk_flow::shared::config::{ConfigSource, Settings};
use tracing::info;

use crate::integration::registry;
use crate::integration::scenarios::{Expectation, TestScenario};

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.page.page_size = 128;
    settings.page.pool_capacity = 8;
    settings.executor.channel_capacity = 2;
    settings
}

fn resolve(document: &ConfigSource) -> Pipeline {
    let input = registry::input(&document.nested("in").expect("scenario has an 'in' section"));
    let output = registry::output(&document.nested("out").expect("scenario has an 'out' section"));
    let filters = document
        .get_or::<Vec<ConfigSource>>("filters", Vec::new())
        .expect("'filters' is a list of sections")
        .iter()
        .map(registry::filter)
        .collect();
    Pipeline::from_config(document, input, filters, output).expect("pipeline resolves")
}

pub async fn run_scenario(scenario: &TestScenario) {
    info!("▶ Running scenario: {}", scenario.name);
    let document =
        ConfigSource::from_json(scenario.pipeline.clone()).expect("pipeline is a JSON object");
    let pipeline = resolve(&document);
    let executor = LocalExecutor::new(ExecSession::new(&settings()));

    match (&scenario.expect, executor.run(&pipeline).await) {
        (
            Expectation::Committed {
                records_per_partition,
                last_row_count,
            },
            Ok(result),
        ) => {
            let written: Vec<u64> = result
                .output_reports()
                .iter()
                .map(|r| r.get::<u64>("records").expect("null output reports records"))
                .collect();
            assert_eq!(&written, records_per_partition, "scenario '{}'", scenario.name);

            let read = result
                .config_diff()
                .nested("in")
                .and_then(|diff| diff.get::<u64>("last_row_count"))
                .expect("inline input reports its row count");
            assert_eq!(read, *last_row_count, "scenario '{}'", scenario.name);
        }
        (
            Expectation::Rejected {
                stage,
                message_contains,
            },
            Err(ExecutionError::Transaction { stage: actual, source }),
        ) => {
            assert_eq!(actual.as_str(), stage, "scenario '{}'", scenario.name);
            assert!(
                source.to_string().contains(message_contains.as_str()),
                "scenario '{}': '{source}' does not mention '{message_contains}'",
                scenario.name
            );
        }
        (expected, actual) => panic!(
            "scenario '{}': expected {expected:?}, got {actual:?}",
            scenario.name
        ),
    }
    info!("✔ Scenario passed: {}", scenario.name);
}
