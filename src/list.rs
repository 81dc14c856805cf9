use crate::error::Result;
use crate::installation::{executable_path, is_executable};
use crate::version::{query_version, VersionQuery};
use colored::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct InstalledEntry {
    pub name: String,
    pub path: PathBuf,
    pub valid: bool,
    pub configured: bool,
    pub version: Option<VersionQuery>,
}

/// Every non-hidden directory directly under `root`, sorted by name.
pub fn list_installations(
    root: &Path,
    executable: &str,
    configured: &[String],
) -> Result<Vec<InstalledEntry>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !entry.file_type().is_dir() || name.starts_with('.') {
            continue;
        }
        let path = entry.into_path();
        entries.push(InstalledEntry {
            valid: is_executable(&executable_path(&path, executable)),
            configured: configured.contains(&name),
            name,
            path,
            version: None,
        });
    }
    Ok(entries)
}

pub fn attach_versions(entries: &mut [InstalledEntry], executable: &str, flag: &str) {
    for entry in entries.iter_mut().filter(|e| e.valid) {
        match query_version(&executable_path(&entry.path, executable), flag) {
            Ok(query) => entry.version = Some(query),
            Err(e) => log::warn!("Version check failed for {}: {e}", entry.name),
        }
    }
}

pub fn print_listing(root: &Path, entries: &[InstalledEntry]) {
    if entries.is_empty() {
        println!("{} {}", "Nothing installed under".yellow(), root.display());
        return;
    }

    for entry in entries {
        let status = if entry.valid {
            "ok".green()
        } else {
            "invalid".red()
        };
        let version = entry
            .version
            .as_ref()
            .and_then(|q| q.version)
            .map(|v| v.to_string())
            .unwrap_or_default();
        println!(
            "{:<24} {:<8} {:<10} {}{}",
            entry.name,
            status,
            version,
            entry.path.display(),
            if entry.configured { "" } else { " (unmanaged)" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_root_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let entries = list_installations(&dir.path().join("es"), "elasticsearch", &[]).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn lists_directories_sorted_and_skips_hidden() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("b/bin")).unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join(".esfetch-staging-x")).unwrap();
        fs::write(dir.path().join("stray.tar.gz"), b"").unwrap();

        let exe = dir.path().join("b/bin/elasticsearch");
        fs::write(&exe, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let entries =
            list_installations(dir.path(), "elasticsearch", &["b".to_string()]).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(!entries[0].valid);
        assert!(!entries[0].configured);
        assert!(entries[1].valid);
        assert!(entries[1].configured);
    }
}
