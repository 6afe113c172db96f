use crate::{ConfigError, LogLevel};

use std::str::FromStr;

use googletest::assert_that;
use googletest::prelude::eq;
use log::LevelFilter;

#[test]
fn given_known_level_when_parse_then_maps_to_filter() {
    assert_that!(*LogLevel::from_str("debug").unwrap(), eq(LevelFilter::Debug));
    assert_that!(*LogLevel::from_str("WARN").unwrap(), eq(LevelFilter::Warn));
    assert_that!(*LogLevel::from_str(" off ").unwrap(), eq(LevelFilter::Off));
}

#[test]
fn given_warning_alias_when_parse_then_warn() {
    assert_that!(*LogLevel::from_str("Warning").unwrap(), eq(LevelFilter::Warn));
}

#[test]
fn given_unknown_level_when_parse_then_config_error_lists_levels() {
    // When
    let result = LogLevel::from_str("verbose");

    // Then
    assert!(matches!(
        result,
        Err(ConfigError::Generic { ref message, .. })
            if message.contains("'verbose'") && message.contains("trace")
    ));
}

#[test]
fn given_level_in_toml_when_deserialize_then_parsed() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        level: LogLevel,
    }

    let wrapper: Wrapper = toml::from_str("level = \"trace\"").unwrap();

    assert_that!(LevelFilter::from(wrapper.level), eq(LevelFilter::Trace));
}

#[test]
fn given_misspelled_level_in_toml_when_deserialize_then_rejected() {
    #[derive(Debug, serde::Deserialize)]
    struct Wrapper {
        #[allow(dead_code)]
        level: LogLevel,
    }

    let result = toml::from_str::<Wrapper>("level = \"debgu\"");

    assert!(result.unwrap_err().to_string().contains("unknown log level"));
}

#[test]
fn given_level_when_displayed_then_lowercase_name() {
    assert_that!(LogLevel(LevelFilter::Warn).to_string(), eq("warn"));
}
