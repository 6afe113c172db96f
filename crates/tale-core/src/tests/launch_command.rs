use crate::LaunchCommand;

use googletest::assert_that;
use googletest::prelude::eq;
use tale_config::RuntimeConfig;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

#[test]
fn given_default_runtime_when_new_then_fixed_heap_invocation() {
    // When
    let launch = LaunchCommand::new(&RuntimeConfig::default(), "tale-1.0.jar").unwrap();

    // Then
    assert_that!(launch.program(), eq("java"));
    assert_that!(
        launch.args(),
        eq(argv(&["-Xms128m", "-Xmx128m", "-jar", "tale-1.0.jar"]).as_slice())
    );
    assert_that!(
        launch.to_string(),
        eq("java -Xms128m -Xmx128m -jar tale-1.0.jar")
    );
}

#[test]
fn given_identical_argv_when_matches_then_true() {
    let launch = LaunchCommand::new(&RuntimeConfig::default(), "tale-1.0.jar").unwrap();

    assert!(launch.matches(&argv(&["java", "-Xms128m", "-Xmx128m", "-jar", "tale-1.0.jar"])));
    assert!(launch.matches(&argv(&[
        "/usr/lib/jvm/bin/java",
        "-Xms128m",
        "-Xmx128m",
        "-jar",
        "tale-1.0.jar"
    ])));
}

#[test]
fn given_substring_lookalikes_when_matches_then_false() {
    let launch = LaunchCommand::new(&RuntimeConfig::default(), "tale-1.0.jar").unwrap();

    // An editor or pager with the artifact name in its arguments
    assert!(!launch.matches(&argv(&["vim", "tale-1.0.jar"])));
    assert!(!launch.matches(&argv(&["grep", "tale-1.0.jar"])));
    // Different heap or extra arguments
    assert!(!launch.matches(&argv(&["java", "-Xms256m", "-Xmx128m", "-jar", "tale-1.0.jar"])));
    assert!(!launch.matches(&argv(&[
        "java",
        "-Xms128m",
        "-Xmx128m",
        "-jar",
        "tale-1.0.jar",
        "--debug"
    ])));
    // Another artifact
    assert!(!launch.matches(&argv(&["java", "-Xms128m", "-Xmx128m", "-jar", "tale-0.9.jar"])));
    assert!(!launch.matches(&[]));
}
