pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod installation;
pub mod installer;
pub mod list;
mod progress;
pub mod unpack;
pub mod version;

pub use crate::error::{EsfetchError, Result};
pub use clap::Parser;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use fetch::{FetchOptions, Fetcher, HttpFetcher};
pub use installation::{default_distributions, validate_name, Distribution, Installation};
pub use installer::{FailurePolicy, InstallOutcome, InstallReport, Installer};
pub use list::{list_installations, InstalledEntry};
pub use version::{parse_version, query_version, EsVersion, VersionQuery};

/// Narrow `all` to the requested target names, keeping configuration order.
pub fn select_distributions(all: &[Distribution], names: &[String]) -> Result<Vec<Distribution>> {
    if names.is_empty() {
        return Ok(all.to_vec());
    }
    if let Some(unknown) = names.iter().find(|n| !all.iter().any(|d| &d.name == *n)) {
        return Err(EsfetchError::UnknownTarget(unknown.clone()));
    }
    Ok(all
        .iter()
        .filter(|d| names.contains(&d.name))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_keeps_order_and_rejects_unknown() {
        let all = default_distributions();
        let picked = select_distributions(
            &all,
            &["elasticsearch-8.6".to_string(), "elasticsearch-6.8".to_string()],
        )
        .unwrap();
        let names: Vec<_> = picked.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["elasticsearch-6.8", "elasticsearch-8.6"]);

        assert_eq!(select_distributions(&all, &[]).unwrap().len(), 5);
        assert!(matches!(
            select_distributions(&all, &["solr".to_string()]),
            Err(EsfetchError::UnknownTarget(name)) if name == "solr"
        ));
    }
}
