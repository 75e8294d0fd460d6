use std::sync::Arc;

use bulk_flow::engine::plugin::{FilterPlugin, InputPlugin, OutputPlugin};
use bulk_flow::plugins::{
    InlineInputPlugin, NullOutputPlugin, RemoveColumnsFilterPlugin, RenameFilterPlugin,
};
use bulk_flow::shared::config::ConfigSource;

fn plugin_type(section: &ConfigSource) -> String {
    section
        .get::<String>("type")
        .expect("every section names its plugin type")
}

pub fn input(section: &ConfigSource) -> Arc<dyn InputPlugin> {
    match plugin_type(section).as_str() {
        "inline" => Arc::new(InlineInputPlugin::new()),
        other => panic!("unknown input plugin '{other}'"),
    }
}

pub fn filter(section: &ConfigSource) -> Arc<dyn FilterPlugin> {
    match plugin_type(section).as_str() {
        "rename" => Arc::new(RenameFilterPlugin::new()),
        "remove_columns" => Arc::new(RemoveColumnsFilterPlugin::new()),
        other => panic!("unknown filter plugin '{other}'"),
    }
}

pub fn output(section: &ConfigSource) -> Arc<dyn OutputPlugin> {
    match plugin_type(section).as_str() {
        "null" => Arc::new(NullOutputPlugin::new()),
        other => panic!("unknown output plugin '{other}'"),
    }
}
