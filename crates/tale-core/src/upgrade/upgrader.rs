//! Backup, fetch, extract, staged merge and cleanup of a release.

use crate::{
    Fetcher, Installation, PRESERVED_SUBPATHS, TaleError, TaleResult, UpgradeMarker,
    UpgradeReport, UpgradeStep, compress, extract, locate,
};

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tale_config::UpgradeConfig;

const LIB_DIR: &str = "lib";
const RETIRED_DIR: &str = ".retired";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// An extracted release, validated before anything is replaced.
#[derive(Debug)]
struct Release {
    staging: PathBuf,
    root: PathBuf,
    artifact: String,
    shipped: Vec<&'static str>,
}

/// Runs the upgrade procedure against one installation.
///
/// Steps are strictly sequential and each depends on the previous one
/// succeeding. Nothing is retried and nothing is rolled back: a failure
/// during the merge leaves the upgrade marker behind, and the backup
/// archive is the way back.
pub struct Upgrader<'a, F: Fetcher> {
    installation: &'a Installation,
    config: &'a UpgradeConfig,
    state_dir: &'a Path,
    fetcher: F,
}

impl<'a, F: Fetcher> Upgrader<'a, F> {
    pub fn new(
        installation: &'a Installation,
        config: &'a UpgradeConfig,
        state_dir: &'a Path,
        fetcher: F,
    ) -> Self {
        Self {
            installation,
            config,
            state_dir,
            fetcher,
        }
    }

    pub fn run(&self) -> TaleResult<UpgradeReport> {
        self.run_with(|_| {})
    }

    /// Run the upgrade, calling `progress` as each step begins.
    pub fn run_with(&self, mut progress: impl FnMut(UpgradeStep)) -> TaleResult<UpgradeReport> {
        UpgradeMarker::ensure_absent(self.state_dir)?;

        progress(UpgradeStep::Backup);
        let backup = self.backup()?;

        progress(UpgradeStep::Fetch);
        let (archive, downloaded_bytes) = self.fetch()?;

        progress(UpgradeStep::Extract);
        let release = self.extract(&archive)?;

        progress(UpgradeStep::Merge);
        let backup_name = backup
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (previous_artifact, replaced) = self.merge(&release, &backup_name)?;

        progress(UpgradeStep::Cleanup);
        self.cleanup(&release)?;

        let kept = PRESERVED_SUBPATHS
            .into_iter()
            .filter(|sub| !release.shipped.contains(sub))
            .map(|sub| sub.to_string())
            .collect();

        info!(
            "Upgraded {} -> {}",
            previous_artifact.as_deref().unwrap_or("<none>"),
            release.artifact
        );

        Ok(UpgradeReport {
            backup,
            downloaded_bytes,
            previous_artifact,
            new_artifact: release.artifact,
            replaced,
            kept,
        })
    }

    /// Snapshot `resources` into a timestamped zip in the installation root.
    fn backup(&self) -> TaleResult<PathBuf> {
        let resources = self.installation.resources_dir();
        if !resources.is_dir() {
            return Err(TaleError::fs(
                "back up",
                &resources,
                std::io::Error::new(ErrorKind::NotFound, "resources directory missing"),
            ));
        }

        let timestamp = chrono::Local::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup = self
            .installation
            .home()
            .join(format!("{}{timestamp}.zip", self.config.backup_prefix));

        compress(&[resources.as_path()], &backup).inspect_err(|e| {
            // Never leave a half-written backup behind, but keep one that
            // was already there
            let existed = matches!(
                e,
                TaleError::FileSystem { source, .. } if source.kind() == ErrorKind::AlreadyExists
            );
            if !existed {
                std::fs::remove_file(&backup).ok();
            }
        })?;

        info!("Backed up {} to {}", resources.display(), backup.display());
        Ok(backup)
    }

    /// Replace any stale release archive with a fresh download.
    fn fetch(&self) -> TaleResult<(PathBuf, u64)> {
        let archive = self.installation.home().join(&self.config.archive_name);

        remove_path(&archive)?;

        let bytes = self.fetcher.fetch(&self.config.download_url, &archive)?;
        Ok((archive, bytes))
    }

    /// Unpack into the staging directory and check the release is complete.
    fn extract(&self, archive: &Path) -> TaleResult<Release> {
        let staging = self.installation.home().join(&self.config.staging_dir);

        remove_path(&staging)?;
        extract(archive, &staging)?;

        let pattern = self.installation.pattern();
        let root = release_root(&staging, pattern)?;

        if !root.join(LIB_DIR).is_dir() {
            return Err(TaleError::invalid_release(format!(
                "{} has no {LIB_DIR}/ directory",
                archive.display()
            )));
        }

        let artifact = locate(&root, pattern)?.ok_or_else(|| {
            TaleError::invalid_release(format!(
                "{} contains no runnable artifact",
                archive.display()
            ))
        })?;

        let shipped = PRESERVED_SUBPATHS
            .into_iter()
            .filter(|sub| root.join(sub).symlink_metadata().is_ok())
            .collect();

        debug!("Release root {} ships {artifact}", root.display());

        Ok(Release {
            staging,
            root,
            artifact,
            shipped,
        })
    }

    /// Swap each replaced entry for the release's copy.
    ///
    /// Every entry is first renamed into the retired directory and the
    /// release copy renamed into its place, so each swap is two atomic
    /// renames on the same filesystem. The marker records the entry in
    /// flight.
    fn merge(
        &self,
        release: &Release,
        backup_name: &str,
    ) -> TaleResult<(Option<String>, Vec<String>)> {
        let home = self.installation.home();
        let previous = self.installation.locate_artifact()?;
        let retired = release.staging.join(RETIRED_DIR);

        let mut marker = UpgradeMarker::new(backup_name, previous.clone(), &release.artifact);
        marker.write(self.state_dir)?;

        std::fs::create_dir_all(&retired).map_err(|e| TaleError::fs("create", &retired, e))?;

        let mut replaced = Vec::new();

        self.swap(
            &mut marker,
            LIB_DIR,
            &release.root.join(LIB_DIR),
            &self.installation.lib_dir(),
            &retired.join(LIB_DIR),
        )?;
        replaced.push(LIB_DIR.to_string());

        // The new artifact usually carries a different version in its name,
        // so the old one is retired on its own.
        marker.step = release.artifact.clone();
        marker.write(self.state_dir)?;
        if let Some(old) = &previous {
            retire(&home.join(old), &retired.join(old))?;
        }
        place(&release.root.join(&release.artifact), &home.join(&release.artifact))?;
        replaced.push(release.artifact.clone());

        for sub in &release.shipped {
            self.swap(
                &mut marker,
                sub,
                &release.root.join(sub),
                &home.join(sub),
                &retired.join(sub),
            )?;
            replaced.push(sub.to_string());
        }

        Ok((previous, replaced))
    }

    fn swap(
        &self,
        marker: &mut UpgradeMarker,
        label: &str,
        replacement: &Path,
        target: &Path,
        retired: &Path,
    ) -> TaleResult<()> {
        marker.step = label.to_string();
        marker.write(self.state_dir)?;

        retire(target, retired)?;
        place(replacement, target)?;

        debug!("Replaced {label}");
        Ok(())
    }

    fn cleanup(&self, release: &Release) -> TaleResult<()> {
        std::fs::remove_dir_all(&release.staging)
            .map_err(|e| TaleError::fs("remove", &release.staging, e))?;
        UpgradeMarker::clear(self.state_dir)
    }
}

/// Directory holding the release content. Upstream archives wrap
/// everything in one top-level directory; descend into it when the
/// staging directory holds nothing else.
fn release_root(staging: &Path, pattern: &crate::ArtifactPattern) -> TaleResult<PathBuf> {
    if locate(staging, pattern)?.is_some() {
        return Ok(staging.to_path_buf());
    }

    let mut entries = std::fs::read_dir(staging)
        .map_err(|e| TaleError::fs("list", staging, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TaleError::fs("list", staging, e))?;

    if entries.len() == 1 {
        let only = entries.remove(0).path();
        if only.is_dir() {
            return Ok(only);
        }
    }

    Ok(staging.to_path_buf())
}

/// Move an existing entry out of the way. Missing entries are fine.
fn retire(target: &Path, retired: &Path) -> TaleResult<()> {
    if target.symlink_metadata().is_err() {
        return Ok(());
    }

    if let Some(parent) = retired.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TaleError::fs("create", parent, e))?;
    }

    std::fs::rename(target, retired).map_err(|e| TaleError::fs("retire", target, e))
}

fn place(replacement: &Path, target: &Path) -> TaleResult<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TaleError::fs("create", parent, e))?;
    }

    std::fs::rename(replacement, target).map_err(|e| {
        warn!(
            "Installation may be in a mixed state: {} could not be moved into place",
            target.display()
        );
        TaleError::fs("install", target, e)
    })
}

fn remove_path(path: &Path) -> TaleResult<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };

    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    removed.map_err(|e| TaleError::fs("remove", path, e))?;

    debug!("Removed stale {}", path.display());
    Ok(())
}
