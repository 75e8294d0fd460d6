use std::sync::Arc;

use serde_json::json;

use super::Pipeline;
use crate::engine::plugin::{FilterPlugin, PluginError};
use crate::plugins::{InlineInputPlugin, NullOutputPlugin, RenameFilterPlugin};
use crate::shared::config::{ConfigError, ConfigSource};

fn document() -> ConfigSource {
    ConfigSource::from_json(json!({
        "in": {"columns": [{"name": "id", "type": "long"}], "rows": [[1]]},
        "filters": [{"columns": {"id": "key"}}],
        "out": {"mode": "discard"}
    }))
    .unwrap()
}

#[test]
fn splits_pipeline_document() {
    let filters: Vec<Arc<dyn FilterPlugin>> = vec![Arc::new(RenameFilterPlugin::new())];
    let pipeline = Pipeline::from_config(
        &document(),
        Arc::new(InlineInputPlugin::new()),
        filters,
        Arc::new(NullOutputPlugin::new()),
    )
    .unwrap();

    assert!(pipeline.input_config().has("rows"));
    assert_eq!(pipeline.output_config().get::<String>("mode").unwrap(), "discard");
    assert_eq!(pipeline.filters().len(), 1);
    assert!(pipeline.filters()[0].1.has("columns"));
    assert_eq!(
        format!("{pipeline:?}"),
        r#"Pipeline { input: "inline", filters: ["rename"], output: "null" }"#
    );
}

#[test]
fn filter_plugins_must_match_sections() {
    let err = Pipeline::from_config(
        &document(),
        Arc::new(InlineInputPlugin::new()),
        Vec::new(),
        Arc::new(NullOutputPlugin::new()),
    )
    .unwrap_err();
    assert!(matches!(err, PluginError::Config(ConfigError::Message(_))));
}

#[test]
fn input_section_is_required() {
    let err = Pipeline::from_config(
        &ConfigSource::from_json(json!({"out": {}})).unwrap(),
        Arc::new(InlineInputPlugin::new()),
        Vec::new(),
        Arc::new(NullOutputPlugin::new()),
    )
    .unwrap_err();
    assert!(matches!(err, PluginError::Config(ConfigError::MissingKey(_))));
}
