use crate::tests::{read_file, write_file};
use crate::{TaleError, compress, extract};

use googletest::assert_that;
use googletest::prelude::{anything, eq, ok};
use tempfile::TempDir;

#[test]
fn given_directory_tree_when_compress_and_extract_then_contents_identical() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = temp.path().join("resources");
    write_file(&resources.join("app.properties"), "site.title=blog");
    write_file(&resources.join("templates/admin/index.html"), "<html/>");
    std::fs::create_dir_all(resources.join("empty")).unwrap();
    let archive = temp.path().join("backup.zip");

    // When
    let files = compress(&[resources.as_path()], &archive);
    let target = temp.path().join("restored");
    let extracted = extract(&archive, &target);

    // Then
    assert_that!(files.unwrap(), eq(2));
    assert_that!(extracted, ok(anything()));
    assert_that!(
        read_file(&target.join("resources/app.properties")).as_str(),
        eq("site.title=blog")
    );
    assert_that!(
        read_file(&target.join("resources/templates/admin/index.html")).as_str(),
        eq("<html/>")
    );
    assert!(target.join("resources/empty").is_dir());
}

#[test]
fn given_existing_destination_when_compress_then_refused() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = temp.path().join("resources");
    write_file(&resources.join("a.txt"), "a");
    let archive = temp.path().join("backup.zip");
    std::fs::write(&archive, "previous backup").unwrap();

    // When
    let result = compress(&[resources.as_path()], &archive);

    // Then
    assert!(matches!(result, Err(TaleError::FileSystem { .. })));
    assert_that!(read_file(&archive).as_str(), eq("previous backup"));
}

#[test]
fn given_not_a_zip_when_extract_then_archive_error() {
    // Given
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("release.zip");
    std::fs::write(&archive, "<html>404</html>").unwrap();

    // When
    let result = extract(&archive, &temp.path().join("staging"));

    // Then
    assert!(matches!(result, Err(TaleError::Archive { .. })));
}

#[cfg(unix)]
#[test]
fn given_executable_file_when_round_trip_then_mode_kept() {
    use std::os::unix::fs::PermissionsExt;

    // Given
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("bin");
    write_file(&bin.join("run.sh"), "#!/bin/sh\n");
    std::fs::set_permissions(bin.join("run.sh"), std::fs::Permissions::from_mode(0o755)).unwrap();
    let archive = temp.path().join("bin.zip");

    // When
    compress(&[bin.as_path()], &archive).unwrap();
    extract(&archive, &temp.path().join("out")).unwrap();

    // Then
    let mode = std::fs::metadata(temp.path().join("out/bin/run.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_that!(mode & 0o777, eq(0o755));
}

#[cfg(unix)]
#[test]
fn given_symlink_in_tree_when_round_trip_then_stored_as_link() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = temp.path().join("resources");
    write_file(&resources.join("static/site.css"), "p {}");
    std::os::unix::fs::symlink("site.css", resources.join("static/theme.css")).unwrap();
    let archive = temp.path().join("backup.zip");

    // When
    let files = compress(&[resources.as_path()], &archive).unwrap();
    extract(&archive, &temp.path().join("out")).unwrap();

    // Then
    assert_that!(files, eq(2));
    let mut zip = zip::ZipArchive::new(std::fs::File::open(&archive).unwrap()).unwrap();
    assert!(zip.by_name("resources/static/theme.css").unwrap().is_symlink());
    let restored = temp.path().join("out/resources/static/theme.css");
    assert_that!(
        std::fs::read_link(&restored).unwrap(),
        eq(&std::path::PathBuf::from("site.css"))
    );
}

#[cfg(unix)]
#[test]
fn given_fifo_in_tree_when_compress_then_fails() {
    use nix::sys::stat::Mode;

    // Given
    let temp = TempDir::new().unwrap();
    let resources = temp.path().join("resources");
    write_file(&resources.join("app.properties"), "x=1");
    nix::unistd::mkfifo(&resources.join("pipe"), Mode::S_IRUSR | Mode::S_IWUSR).unwrap();

    // When
    let result = compress(&[resources.as_path()], &temp.path().join("backup.zip"));

    // Then
    assert!(matches!(
        result,
        Err(TaleError::FileSystem { ref source, .. }) if source.kind() == std::io::ErrorKind::Unsupported
    ));
}
