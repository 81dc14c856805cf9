//! Downloading tarballs to local files.

use crate::error::{EsfetchError, Result};
use crate::progress::DownloadProgress;
use byte_unit::{Byte, UnitType};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Retrieves the bytes behind a URL into `dest`. The installer goes through
/// this for every network access.
#[cfg_attr(test, mockall::automock)]
pub trait Fetcher {
    /// Returns the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    /// `None` disables the overall request timeout.
    pub timeout: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: concat!("esfetch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

/// Blocking HTTP(S) downloads plus `file://` copies for local mirrors.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .build()?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &Url, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| EsfetchError::download(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EsfetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let label = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or(url.as_str())
            .to_string();
        let progress = DownloadProgress::new(&label, response.content_length());

        let mut writer = BufWriter::new(File::create(dest)?);
        let mut reader = progress.bar.wrap_read(response);
        io::copy(&mut reader, &mut writer).map_err(|e| EsfetchError::download(url.as_str(), e))?;
        writer.flush()?;

        let stats = progress.finish();
        debug!("Downloaded {label} at {:.2} MB/s", stats.speed_mb());
        Ok(stats.bytes)
    }

    fn fetch_file(url: &Url, dest: &Path) -> Result<u64> {
        let source = url
            .to_file_path()
            .map_err(|_| EsfetchError::download(url.as_str(), "not a local file path"))?;
        fs::copy(&source, dest).map_err(|e| EsfetchError::download(url.as_str(), e))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        let parsed = Url::parse(url)?;
        info!("Downloading {url}");

        let bytes = match parsed.scheme() {
            "http" | "https" => self.fetch_http(&parsed, dest)?,
            "file" => Self::fetch_file(&parsed, dest)?,
            other => {
                return Err(EsfetchError::UnsupportedScheme {
                    scheme: other.to_string(),
                    url: url.to_string(),
                })
            }
        };

        let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
        info!(
            "Fetched {:.2} {} from {url}",
            adjusted.get_value(),
            adjusted.get_unit()
        );
        Ok(bytes)
    }
}
