use crate::error::Result;
use crate::fetch::Fetcher;
use crate::installation::{Distribution, Installation, DEFAULT_EXECUTABLE};
use crate::unpack::unpack_stripped;
use crate::version::{query_version, VersionQuery};
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tempfile::{Builder, NamedTempFile};

const STAGING_PREFIX: &str = ".esfetch-staging-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the error and move on to the next entry.
    #[default]
    Continue,
    /// Stop at the first download or extraction error.
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyPresent,
    Pruned,
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Installed => write!(f, "installed"),
            InstallOutcome::AlreadyPresent => write!(f, "already present"),
            InstallOutcome::Pruned => write!(f, "pruned"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstallReport {
    pub name: String,
    pub path: PathBuf,
    pub outcome: InstallOutcome,
    pub fetched: bool,
    pub version: Option<VersionQuery>,
}

impl InstallReport {
    pub fn is_valid(&self) -> bool {
        self.outcome != InstallOutcome::Pruned
    }
}

pub struct Installer<F: Fetcher> {
    root: PathBuf,
    executable: String,
    version_flag: String,
    fetcher: F,
}

impl<F: Fetcher> Installer<F> {
    pub fn new(root: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            root: root.into(),
            executable: DEFAULT_EXECUTABLE.to_string(),
            version_flag: "--version".to_string(),
            fetcher,
        }
    }

    pub fn executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn version_flag(mut self, flag: impl Into<String>) -> Self {
        self.version_flag = flag.into();
        self
    }

    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn install(&self, distribution: &Distribution) -> Result<InstallReport> {
        let installation = Installation::new(&self.root, distribution)?;

        let fetched = if installation.is_present() {
            info!(
                "{} already present at {}, skipping download",
                installation.name,
                installation.path.display()
            );
            false
        } else {
            self.materialize(&installation)?;
            true
        };

        info!("{} -> {}", installation.name, installation.path.display());
        let version = self.smoke_test(&installation);

        let outcome = if installation.is_valid(&self.executable) {
            if fetched {
                InstallOutcome::Installed
            } else {
                InstallOutcome::AlreadyPresent
            }
        } else {
            warn!(
                "{} is missing, removing {}",
                installation.executable_path(&self.executable).display(),
                installation.path.display()
            );
            fs::remove_dir_all(&installation.path)?;
            InstallOutcome::Pruned
        };

        Ok(InstallReport {
            name: installation.name,
            path: installation.path,
            outcome,
            fetched,
            version,
        })
    }

    /// Runs `install` for every entry after creating the root. Results come
    /// back in input order; with `FailFast` the list ends at the first error.
    pub fn install_all(
        &self,
        distributions: &[Distribution],
        policy: FailurePolicy,
    ) -> Result<Vec<(Distribution, Result<InstallReport>)>> {
        self.ensure_root()?;

        let mut results = Vec::with_capacity(distributions.len());
        for distribution in distributions {
            let result = self.install(distribution);
            if let Err(e) = &result {
                warn!("Failed to install {}: {e}", distribution.name);
            }
            let failed = result.is_err();
            results.push((distribution.clone(), result));
            if failed && policy == FailurePolicy::FailFast {
                break;
            }
        }
        Ok(results)
    }

    /// Download and extract into a staging area inside the root, then move
    /// the finished tree into place. Nothing lands at the target path on error.
    fn materialize(&self, installation: &Installation) -> Result<()> {
        let download = NamedTempFile::new()?;
        self.fetcher.fetch(&installation.url, download.path())?;

        let staging = Builder::new().prefix(STAGING_PREFIX).tempdir_in(&self.root)?;
        let work = staging.path().join(&installation.name);
        fs::create_dir(&work)?;

        let entries = unpack_stripped(download.path(), &work, 1)?;
        debug!("Extracted {entries} entries for {}", installation.name);

        fs::rename(&work, &installation.path)?;
        Ok(())
    }

    fn smoke_test(&self, installation: &Installation) -> Option<VersionQuery> {
        let executable = installation.executable_path(&self.executable);
        match query_version(&executable, &self.version_flag) {
            Ok(query) => {
                match query.version {
                    Some(version) if !version.is_supported() => warn!(
                        "{} reports version {version}, which is not supported",
                        installation.name
                    ),
                    Some(version) => debug!("{} reports version {version}", installation.name),
                    None => warn!(
                        "{} printed no recognizable version: {}",
                        installation.name,
                        query.output.trim()
                    ),
                }
                Some(query)
            }
            Err(e) => {
                warn!("Version check failed for {}: {e}", installation.name);
                None
            }
        }
    }
}
