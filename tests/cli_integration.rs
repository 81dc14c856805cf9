use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tar::{Builder, EntryType, Header};
use tempfile::TempDir;
use url::Url;

const SCRIPT: &[u8] = b"#!/bin/sh\necho 'Version: 7.10.2, Build: default/tar, JVM: 15.0.1'\n";

fn write_tarball(path: &Path, entries: &[(&str, &[u8], u32)]) -> String {
    let mut builder = Builder::new(Vec::new());
    for (name, data, mode) in entries {
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_entry_type(EntryType::Regular);
        builder.append_data(&mut header, name, *data).unwrap();
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(&builder.into_inner().unwrap()).unwrap();
    fs::write(path, encoder.finish().unwrap()).unwrap();
    Url::from_file_path(path).unwrap().to_string()
}

/// A fake home directory holding a mirror of tarballs and a config file
/// pointing at them.
struct Sandbox {
    home: TempDir,
    config: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        let mirror = home.path().join("mirror");
        fs::create_dir_all(&mirror).unwrap();

        let good = write_tarball(
            &mirror.join("good.tar.gz"),
            &[
                ("elasticsearch-7.10.2/bin/elasticsearch", SCRIPT, 0o755),
                ("elasticsearch-7.10.2/config/elasticsearch.yml", b"", 0o644),
            ],
        );
        let broken = write_tarball(
            &mirror.join("broken.tar.gz"),
            &[("elasticsearch-5.0.0/README", b"no binary", 0o644)],
        );

        let config = home.path().join("esfetch.toml");
        fs::write(
            &config,
            format!(
                r#"
[[distribution]]
name = "es-good"
url = "{good}"

[[distribution]]
name = "es-broken"
url = "{broken}"
"#
            ),
        )
        .unwrap();

        Sandbox { home, config }
    }

    fn root(&self) -> PathBuf {
        self.home.path().join("es")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("esfetch").unwrap();
        cmd.current_dir(self.home.path())
            .env("HOME", self.home.path())
            .env_remove("XDG_CONFIG_HOME")
            .env("RUST_LOG", "info")
            .env("NO_COLOR", "1")
            .env_remove("CLICOLOR_FORCE")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn installed(&self) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(self.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[test]
fn installs_into_home_es_and_prunes_broken() {
    let sandbox = Sandbox::new();
    assert!(!sandbox.root().exists());

    sandbox
        .cmd()
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("es-good: installed"))
        .stdout(predicate::str::contains("es-broken: pruned"))
        .stdout(predicate::str::contains("Version: 7.10.2"));

    assert_eq!(sandbox.installed(), vec!["es-good"]);
    assert!(sandbox.root().join("es-good/bin/elasticsearch").is_file());
}

#[test]
fn second_run_skips_download() {
    let sandbox = Sandbox::new();
    sandbox.cmd().assert().success();

    // Remove the mirror: a second run must not need it.
    fs::remove_dir_all(sandbox.home.path().join("mirror")).unwrap();

    sandbox
        .cmd()
        .args(["install", "es-good"])
        .assert()
        .success()
        .stdout(predicate::str::contains("es-good: already present"))
        .stderr(predicate::str::contains("skipping download"));

    assert_eq!(sandbox.installed(), vec!["es-good"]);
}

#[test]
fn download_failure_sets_exit_code() {
    let sandbox = Sandbox::new();
    fs::remove_file(sandbox.home.path().join("mirror/good.tar.gz")).unwrap();

    sandbox
        .cmd()
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("es-good"))
        .stdout(predicate::str::contains("es-broken: pruned"));

    assert!(sandbox.installed().is_empty());
}

#[test]
fn fail_fast_stops_after_first_error() {
    let sandbox = Sandbox::new();
    fs::remove_file(sandbox.home.path().join("mirror/good.tar.gz")).unwrap();

    sandbox
        .cmd()
        .args(["install", "--fail-fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not attempted"))
        .stdout(predicate::str::contains("es-broken").not());
}

#[test]
fn unknown_target_is_rejected() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["install", "solr-9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnknownTarget"));
    assert!(!sandbox.root().exists());
}

#[test]
fn root_flag_overrides_home() {
    let sandbox = Sandbox::new();
    let custom = sandbox.home.path().join("elsewhere");

    sandbox
        .cmd()
        .arg("--root")
        .arg(&custom)
        .args(["install", "es-good"])
        .assert()
        .success();

    assert!(custom.join("es-good/bin/elasticsearch").is_file());
    assert!(!sandbox.root().exists());
}

#[test]
fn list_shows_installed_targets() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing installed"));

    sandbox.cmd().assert().success();

    sandbox
        .cmd()
        .args(["list", "--versions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("es-good"))
        .stdout(predicate::str::contains("7.10.2"))
        .stdout(predicate::str::contains("es-broken").not());
}

#[test]
fn completions_are_generated() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("esfetch"));
}
