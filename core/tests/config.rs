use poi_analytics_core::{EngineConfig, SearchField, StateField};
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn shipped_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/engine_config.json");
    let loaded = EngineConfig::load(path).unwrap();
    let defaults = EngineConfig::default();

    assert_eq!(loaded.default_page_size, defaults.default_page_size);
    assert_eq!(loaded.max_page_size, defaults.max_page_size);
    assert_eq!(loaded.autocomplete_limit, defaults.autocomplete_limit);
    assert_eq!(loaded.state_field, defaults.state_field);
    assert_eq!(loaded.search_fields, defaults.search_fields);
}

#[test]
fn partial_config_falls_back_to_defaults() {
    let file = config_file(r#"{ "state_field": "name", "search_fields": ["name", "state_name"] }"#);
    let config = EngineConfig::load(&file.path().to_string_lossy()).unwrap();

    assert_eq!(config.state_field, StateField::Name);
    assert_eq!(config.search_fields, vec![SearchField::Name, SearchField::StateName]);
    assert_eq!(config.max_page_size, 100);
}

#[test]
fn inconsistent_page_sizes_are_rejected() {
    let file = config_file(r#"{ "default_page_size": 50, "max_page_size": 10 }"#);
    assert!(EngineConfig::load(&file.path().to_string_lossy()).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let err = EngineConfig::load("/nonexistent/engine_config.json").unwrap_err();
    assert!(err.to_string().contains("Cannot read"), "got: {err}");
}
