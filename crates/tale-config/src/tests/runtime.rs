use crate::{HeapSize, RuntimeConfig};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};

#[test]
fn given_heap_sizes_when_parse_then_bytes_account_for_unit() {
    assert_that!("128m".parse::<HeapSize>().unwrap().bytes(), eq(128 << 20));
    assert_that!("2G".parse::<HeapSize>().unwrap().bytes(), eq(2 << 30));
    assert_that!("512k".parse::<HeapSize>().unwrap().bytes(), eq(512 << 10));
    assert_that!("4096".parse::<HeapSize>().unwrap().bytes(), eq(4096));
}

#[test]
fn given_heap_size_when_display_then_round_trips_normalized_text() {
    let size: HeapSize = "256M".parse().unwrap();

    assert_that!(size.to_string(), eq("256m"));
}

#[test]
fn given_bad_heap_sizes_when_parse_then_error() {
    assert_that!("".parse::<HeapSize>(), err(anything()));
    assert_that!("m".parse::<HeapSize>(), err(anything()));
    assert_that!("12t".parse::<HeapSize>(), err(anything()));
    assert_that!("0m".parse::<HeapSize>(), err(anything()));
    assert_that!("-5m".parse::<HeapSize>(), err(anything()));
}

#[test]
fn given_min_above_max_when_validate_then_error() {
    let config = RuntimeConfig {
        heap_min: "1g".into(),
        heap_max: "512m".into(),
        ..RuntimeConfig::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_equal_min_and_max_in_different_units_when_validate_then_ok() {
    let config = RuntimeConfig {
        heap_min: "1024m".into(),
        heap_max: "1g".into(),
        ..RuntimeConfig::default()
    };

    assert_that!(config.validate(), ok(anything()));
}

#[test]
fn given_absolute_runtime_log_when_validate_then_error() {
    let config = RuntimeConfig {
        log_file: "/var/log/tale.log".into(),
        ..RuntimeConfig::default()
    };

    assert_that!(config.validate(), err(anything()));
}
