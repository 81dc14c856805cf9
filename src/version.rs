use crate::error::{EsfetchError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::process::Command;

lazy_static! {
    static ref VERSION_LINE: Regex =
        Regex::new(r"Version: (?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)")
            .expect("version pattern is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Oldest release whose command line the tooling still understands.
pub const MIN_SUPPORTED: EsVersion = EsVersion {
    major: 6,
    minor: 0,
    patch: 0,
};

impl EsVersion {
    pub fn is_supported(&self) -> bool {
        *self >= MIN_SUPPORTED
    }
}

impl fmt::Display for EsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

pub fn parse_version(output: &str) -> Option<EsVersion> {
    let caps = VERSION_LINE.captures(output)?;
    Some(EsVersion {
        major: caps["major"].parse().ok()?,
        minor: caps["minor"].parse().ok()?,
        patch: caps["patch"].parse().ok()?,
    })
}

/// Output of running an installed executable with its version flag.
#[derive(Debug, Clone)]
pub struct VersionQuery {
    pub output: String,
    pub success: bool,
    pub version: Option<EsVersion>,
}

/// Spawning failures are errors; a non-zero exit is only recorded.
pub fn query_version(executable: &Path, flag: &str) -> Result<VersionQuery> {
    let out = Command::new(executable)
        .arg(flag)
        .output()
        .map_err(|source| EsfetchError::VersionQuery {
            path: executable.to_path_buf(),
            source,
        })?;

    let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&out.stderr);
    if !stderr.trim().is_empty() {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&stderr);
    }

    Ok(VersionQuery {
        version: parse_version(&output),
        success: out.status.success(),
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typical_output() {
        let output = "Version: 7.10.2, Build: default/tar/747e1cc71def077253878a59143c1f785afa92b9/2021-01-13T00:42:12.435326Z, JVM: 15.0.1\n";
        assert_eq!(
            parse_version(output),
            Some(EsVersion {
                major: 7,
                minor: 10,
                patch: 2
            })
        );
    }

    #[test]
    fn parses_multi_digit_major() {
        let v = parse_version("Version: 10.0.1").unwrap();
        assert_eq!(v.to_string(), "10.0.1");
    }

    #[test]
    fn unrecognised_output_yields_none() {
        assert_eq!(parse_version("elasticsearch 7.10"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn support_threshold() {
        assert!(!parse_version("Version: 5.6.16").unwrap().is_supported());
        assert!(parse_version("Version: 6.0.0").unwrap().is_supported());
        assert!(parse_version("Version: 8.6.2").unwrap().is_supported());
    }

    #[test]
    fn missing_executable_is_an_error() {
        let err = query_version(Path::new("/nonexistent/bin/elasticsearch"), "--version")
            .unwrap_err();
        assert!(matches!(err, EsfetchError::VersionQuery { .. }), "{err}");
    }
}
