//! Zip compression and extraction of directory trees.

use crate::{TaleError, TaleResult};

use std::fs::File;
use std::io::{BufWriter, ErrorKind};
use std::path::Path;

use log::debug;
use walkdir::WalkDir;
use zip::ZipArchive;
use zip::write::SimpleFileOptions;

/// Compress `sources` into a new zip archive at `dest`.
///
/// Each source keeps its own name as the top-level entry, so compressing
/// `<home>/resources` yields entries under `resources/`. The archive is
/// created with create-new semantics and never overwrites an existing
/// file. Symbolic links are stored as links, never followed. Any other
/// special file fails the whole archive. Returns the number of file and
/// link entries written.
pub fn compress(sources: &[&Path], dest: &Path) -> TaleResult<u64> {
    let file = File::create_new(dest).map_err(|e| TaleError::fs("create archive", dest, e))?;
    let mut zip = zip::ZipWriter::new(BufWriter::new(file));

    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut files = 0u64;
    for &source in sources {
        let base = source.parent().unwrap_or(Path::new(""));

        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                TaleError::fs("walk", &path, e.into())
            })?;
            let path = entry.path();

            let name = entry_name(base, path).ok_or_else(|| {
                let source = std::io::Error::new(ErrorKind::InvalidData, "non UTF-8 file name");
                TaleError::fs("compress", path, source)
            })?;

            if entry.file_type().is_dir() {
                zip.add_directory(name.as_str(), options)
                    .map_err(|e| TaleError::archive(dest, e))?;
            } else if entry.file_type().is_file() {
                zip.start_file(name.as_str(), file_options(options, path))
                    .map_err(|e| TaleError::archive(dest, e))?;
                let mut input =
                    File::open(path).map_err(|e| TaleError::fs("read", path, e))?;
                std::io::copy(&mut input, &mut zip)
                    .map_err(|e| TaleError::fs("compress", path, e))?;
                files += 1;
            } else if entry.file_type().is_symlink() {
                let link = std::fs::read_link(path).map_err(|e| TaleError::fs("read link", path, e))?;
                let link = link.to_str().ok_or_else(|| {
                    let source =
                        std::io::Error::new(ErrorKind::InvalidData, "non UTF-8 link target");
                    TaleError::fs("compress", path, source)
                })?;
                zip.add_symlink(name.as_str(), link, options)
                    .map_err(|e| TaleError::archive(dest, e))?;
                files += 1;
            } else {
                let source = std::io::Error::new(ErrorKind::Unsupported, "special file");
                return Err(TaleError::fs("compress", path, source));
            }
        }
    }

    zip.finish().map_err(|e| TaleError::archive(dest, e))?;
    debug!("Wrote {files} files to {}", dest.display());

    Ok(files)
}

/// Extract every entry of `archive` under `target`, creating it if needed.
///
/// Entries that would escape `target` are rejected by the zip reader.
pub fn extract(archive: &Path, target: &Path) -> TaleResult<()> {
    std::fs::create_dir_all(target).map_err(|e| TaleError::fs("create", target, e))?;

    let file = File::open(archive).map_err(|e| TaleError::fs("open archive", archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| TaleError::archive(archive, e))?;

    debug!(
        "Extracting {} entries from {} into {}",
        zip.len(),
        archive.display(),
        target.display()
    );

    zip.extract(target)
        .map_err(|e| TaleError::archive(archive, e))
}

/// Archive entry name of `path` relative to `base`, `/`-separated.
fn entry_name(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

#[cfg(unix)]
fn file_options(options: SimpleFileOptions, path: &Path) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => options.unix_permissions(meta.permissions().mode()),
        Err(_) => options,
    }
}

#[cfg(not(unix))]
fn file_options(options: SimpleFileOptions, _path: &Path) -> SimpleFileOptions {
    options
}
