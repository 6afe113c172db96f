use crate::tests::write_file;
use crate::{ArtifactPattern, Installation, TaleError, locate};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, none, ok, some};
use tempfile::TempDir;

#[test]
fn given_empty_directory_when_locate_then_none() {
    // Given
    let temp = TempDir::new().unwrap();

    // When
    let result = locate(temp.path(), &ArtifactPattern::default());

    // Then
    assert_that!(result, ok(none()));
}

#[test]
fn given_single_match_when_locate_then_returns_it() {
    // Given
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("tale-1.0.jar"), "jar");
    write_file(&temp.path().join("other.jar"), "jar");
    write_file(&temp.path().join("tale.log"), "log");

    // When
    let result = locate(temp.path(), &ArtifactPattern::default());

    // Then
    assert_that!(result, ok(some(eq("tale-1.0.jar"))));
}

#[test]
fn given_multiple_matches_when_locate_then_lexically_first() {
    // Given
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("tale-2.0.jar"), "jar");
    write_file(&temp.path().join("tale-1.0.jar"), "jar");

    // When
    let result = locate(temp.path(), &ArtifactPattern::default());

    // Then
    assert_that!(result, ok(some(eq("tale-1.0.jar"))));
}

#[test]
fn given_matching_directory_when_locate_then_ignored() {
    // Given
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("tale-backup.jar")).unwrap();

    // When
    let result = locate(temp.path(), &ArtifactPattern::default());

    // Then
    assert_that!(result, ok(none()));
}

#[test]
fn given_nested_match_when_locate_then_not_found() {
    // Given
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("lib/tale-core.jar"), "jar");

    // When
    let result = locate(temp.path(), &ArtifactPattern::default());

    // Then
    assert_that!(result, ok(none()));
}

#[test]
fn given_missing_directory_when_locate_then_filesystem_error() {
    // Given
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    // When
    let result = locate(&missing, &ArtifactPattern::default());

    // Then
    assert!(matches!(result, Err(TaleError::FileSystem { .. })));
}

#[test]
fn given_custom_pattern_when_matches_then_prefix_and_suffix_checked() {
    let pattern = ArtifactPattern::new("blog", ".war");

    assert!(pattern.matches("blog-3.war"));
    assert!(!pattern.matches("blog-3.jar"));
    assert!(!pattern.matches("my-blog.war"));
}

#[test]
fn given_relative_home_when_open_then_canonical() {
    // Given
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("home")).unwrap();
    let indirect = temp.path().join("home").join("..").join("home");

    // When
    let installation = Installation::open(&indirect, ArtifactPattern::default()).unwrap();

    // Then
    assert_that!(
        installation.home(),
        eq(temp.path().join("home").canonicalize().unwrap().as_path())
    );
    assert_that!(
        installation.resources_dir(),
        eq(&installation.home().join("resources"))
    );
}

#[test]
fn given_missing_home_when_open_then_error() {
    // Given
    let temp = TempDir::new().unwrap();

    // When
    let result = Installation::open(&temp.path().join("nope"), ArtifactPattern::default());

    // Then
    assert_that!(result, err(anything()));
}
