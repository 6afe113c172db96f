//! Download of the release archive.

use crate::{TaleError, TaleResult};

use std::fs::File;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use error_location::ErrorLocation;
use log::{debug, info};

/// Retrieves a remote resource into a local file.
pub trait Fetcher {
    /// Write the resource at `url` to `dest`, returning the byte count.
    fn fetch(&self, url: &str, dest: &Path) -> TaleResult<u64>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str, dest: &Path) -> TaleResult<u64> {
        (**self).fetch(url, dest)
    }
}

/// Blocking HTTP fetcher. Bytes are streamed into `<dest>.part` and only
/// renamed to `dest` once the body is complete.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> TaleResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tale-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> TaleResult<u64> {
        info!("Downloading {url}");

        let mut response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaleError::DownloadStatus {
                url: url.to_string(),
                status: status.as_u16(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let partial = partial_path(dest);

        match write_body(&mut response, &partial, dest) {
            Ok(bytes) => {
                debug!("Downloaded {bytes} bytes to {}", dest.display());
                Ok(bytes)
            }
            Err(e) => {
                std::fs::remove_file(&partial).ok();
                Err(e)
            }
        }
    }
}

fn write_body(
    response: &mut reqwest::blocking::Response,
    partial: &Path,
    dest: &Path,
) -> TaleResult<u64> {
    let mut file = File::create(partial).map_err(|e| TaleError::fs("create", partial, e))?;
    let bytes = response.copy_to(&mut file)?;
    file.sync_all()
        .map_err(|e| TaleError::fs("sync", partial, e))?;
    std::fs::rename(partial, dest).map_err(|e| TaleError::fs("rename", partial, e))?;
    Ok(bytes)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
