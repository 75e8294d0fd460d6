use super::Settings;

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::default();
    assert_eq!(settings.page.page_size, 32 * 1024);
    assert_eq!(settings.page.pool_capacity, 64);
    assert_eq!(settings.page.max_allocated_bytes, None);
    assert_eq!(settings.executor.channel_capacity, 4);
    assert_eq!(settings.logging.stdout_level, "info");
}

#[test]
fn sections_fill_missing_fields_with_defaults() {
    let raw = r#"
        [page]
        page_size = 4096

        [executor]
        channel_capacity = 1
    "#;
    let settings: Settings = config::Config::builder()
        .add_source(config::File::from_str(raw, config::FileFormat::Toml))
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    assert_eq!(settings.page.page_size, 4096);
    assert_eq!(settings.page.pool_capacity, 64);
    assert_eq!(settings.executor.channel_capacity, 1);
    assert_eq!(settings.logging.file_level, "debug");
}
