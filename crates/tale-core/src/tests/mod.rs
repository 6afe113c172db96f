mod archive;
mod installation;
mod launch_command;

use crate::{Fetcher, ProcessEntry, ProcessTable, TaleResult, compress};

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Process table returning a fixed set of rows.
pub(crate) struct FakeTable(pub Vec<ProcessEntry>);

impl ProcessTable for FakeTable {
    fn snapshot(&self) -> TaleResult<Vec<ProcessEntry>> {
        Ok(self.0.clone())
    }
}

/// Fetcher that copies a local archive instead of downloading one.
pub(crate) struct CopyFetcher {
    pub source: PathBuf,
}

impl Fetcher for CopyFetcher {
    fn fetch(&self, _url: &str, dest: &Path) -> TaleResult<u64> {
        Ok(std::fs::copy(&self.source, dest)?)
    }
}

pub(crate) fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub(crate) fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Installation holding `tale-1.0.jar`, `lib/` and user-owned resources.
pub(crate) fn setup_installation() -> TempDir {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    write_file(&home.join("tale-1.0.jar"), "old jar");
    write_file(&home.join("lib/old-dep.jar"), "old dep");
    write_file(&home.join("resources/app.properties"), "db.url=jdbc:user");
    write_file(&home.join("resources/static/a.css"), "old css");
    write_file(&home.join("resources/templates/admin/index.html"), "old admin");
    write_file(&home.join("resources/templates/themes/mine.html"), "user theme");

    temp
}

/// Build a release zip wrapped in a `tale/` directory, the way upstream
/// packages it. `files` are paths relative to the release root.
pub(crate) fn build_release(workdir: &Path, files: &[(&str, &str)]) -> PathBuf {
    let root = workdir.join("tale");
    for (path, content) in files {
        write_file(&root.join(path), content);
    }

    let archive = workdir.join("release.zip");
    compress(&[root.as_path()], &archive).unwrap();
    archive
}

/// The standard 1.1 release.
pub(crate) fn standard_release(workdir: &Path) -> PathBuf {
    build_release(
        workdir,
        &[
            ("tale-1.1.jar", "new jar"),
            ("lib/new-dep.jar", "new dep"),
            ("resources/static/b.css", "new css"),
            ("resources/app.properties", "db.url=jdbc:release"),
            ("resources/templates/themes/default.html", "release theme"),
        ],
    )
}
