use crate::error::{EsfetchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXECUTABLE: &str = "elasticsearch";

const ARTIFACTS: &str = "https://artifacts.elastic.co/downloads/elasticsearch";

/// A tarball location paired with the directory name it installs into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub name: String,
    pub url: String,
}

impl Distribution {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

pub fn default_distributions() -> Vec<Distribution> {
    [
        ("elasticsearch-6.8", "elasticsearch-6.8.23.tar.gz"),
        (
            "elasticsearch-7.10",
            "elasticsearch-7.10.2-linux-x86_64.tar.gz",
        ),
        (
            "elasticsearch-7.13",
            "elasticsearch-7.13.4-linux-x86_64.tar.gz",
        ),
        (
            "elasticsearch-7.17",
            "elasticsearch-7.17.9-linux-x86_64.tar.gz",
        ),
        ("elasticsearch-8.6", "elasticsearch-8.6.2-linux-x86_64.tar.gz"),
    ]
    .into_iter()
    .map(|(name, file)| Distribution::new(name, format!("{ARTIFACTS}/{file}")))
    .collect()
}

/// Rejects anything that would not land as exactly one directory under the root.
pub fn validate_name(name: &str) -> Result<()> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(EsfetchError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// One versioned install under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub name: String,
    pub url: String,
    pub path: PathBuf,
}

impl Installation {
    pub fn new(root: &Path, distribution: &Distribution) -> Result<Self> {
        validate_name(&distribution.name)?;
        Ok(Self {
            name: distribution.name.clone(),
            url: distribution.url.clone(),
            path: root.join(&distribution.name),
        })
    }

    pub fn executable_path(&self, executable: &str) -> PathBuf {
        executable_path(&self.path, executable)
    }

    pub fn is_present(&self) -> bool {
        self.path.is_dir()
    }

    pub fn is_valid(&self, executable: &str) -> bool {
        is_executable(&self.executable_path(executable))
    }
}

pub fn executable_path(install_path: &Path, executable: &str) -> PathBuf {
    install_path.join("bin").join(executable)
}

#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
