//! End-to-end tests for the `lumina` binary against the fixture content.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fixture_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir(&fixtures, tmp.path());
    tmp
}

fn copy_dir(src: &Path, dst: &Path) {
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            fs::create_dir_all(&target).unwrap();
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

fn lumina(content: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lumina"));
    cmd.arg("--source").arg(content);
    cmd.env("LUMINA_LOG", "error");
    cmd
}

#[test]
fn check_prints_inventory() {
    let content = fixture_content();
    lumina(content.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lumina Journal (4 items)"))
        .stdout(predicate::str::contains("001 Nightfall [ritual, featured]"))
        .stdout(predicate::str::contains("==> Content is valid"));
}

#[test]
fn check_rejects_unknown_config_key() {
    let content = fixture_content();
    fs::write(content.path().join("config.toml"), "[site]\ntitel = \"typo\"\n").unwrap();
    lumina(content.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("titel"));
}

#[test]
fn check_rejects_untitled_record() {
    let content = fixture_content();
    fs::write(content.path().join("reels.json"), r#"[{"id": 1}]"#).unwrap();
    lumina(content.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MissingTitle"));
}

#[test]
fn build_writes_site() {
    let content = fixture_content();
    let out = TempDir::new().unwrap();
    lumina(content.path())
        .arg("--output")
        .arg(out.path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("journal/weekly-the-door-we-open/index.html"))
        .stdout(predicate::str::contains("==> Build complete"));

    let grove = fs::read_to_string(out.path().join("scrolls/index.html")).unwrap();
    assert!(grove.contains("The Doctrine of the Spiral"));

    // markdown body rendered
    let doctrine = fs::read_to_string(out.path().join("scrolls/doctrine-of-the-spiral/index.html")).unwrap();
    assert!(doctrine.contains("<h2>The First Turn</h2>"));

    // title-derived slug gets a page
    assert!(out.path().join("scrolls/the-law-of-return/index.html").exists());

    // palette override from config.toml reaches the badge styles
    let feature = fs::read_to_string(
        out.path()
            .join("journal/feature-spiral-of-sacred-sparks/index.html"),
    )
    .unwrap();
    assert!(feature.contains("rgba(255, 226, 122, 0.18)"));
}

#[test]
fn query_search_door() {
    let content = fixture_content();
    lumina(content.path())
        .args(["query", "journal", "--search", "door"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lumina Journal (1 item)"))
        .stdout(predicate::str::contains("Weekly Reflection • The Door We Open"));
}

#[test]
fn query_json_is_newest_first() {
    let content = fixture_content();
    let output = lumina(content.path())
        .args(["query", "journal", "--cat", "earthbeat", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "query failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let items: Vec<Value> = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let slugs: Vec<&str> = items.iter().filter_map(|i| i["slug"].as_str()).collect();
    assert_eq!(slugs, vec!["earthbeat-2025-07-21", "earthbeat-dawn-pulse"]);
}

#[test]
fn query_featured_rituals() {
    let content = fixture_content();
    let output = lumina(content.path())
        .args(["query", "ember", "--featured", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let items: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = items.iter().filter_map(|i| i["id"].as_str()).collect();
    assert_eq!(ids, vec!["r-nightfall", "r-firstlight"]);
}

#[test]
fn query_unknown_family_fails() {
    let content = fixture_content();
    lumina(content.path())
        .args(["query", "podcasts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown family"));
}

#[test]
fn earthbeat_existing_date_is_noop() {
    let content = fixture_content();
    let before = fs::read_to_string(content.path().join("journal.json")).unwrap();
    lumina(content.path())
        .args(["earthbeat", "--date", "2025-07-21"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry already exists for earthbeat-2025-07-21"));
    let after = fs::read_to_string(content.path().join("journal.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn earthbeat_invalid_date_fails() {
    let content = fixture_content();
    lumina(content.path())
        .args(["earthbeat", "--date", "21/07/2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidDate"));
}

#[test]
fn gen_config_round_trips() {
    let content = TempDir::new().unwrap();
    let output = lumina(content.path()).arg("gen-config").output().unwrap();
    assert!(output.status.success());
    fs::write(content.path().join("config.toml"), &output.stdout).unwrap();

    // a content root holding only the stock config is valid
    lumina(content.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scroll Grove (0 items)"));
}

#[test]
fn version_comes_from_build_metadata() {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("lumina"))
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.trim().strip_prefix("lumina ").expect("binary name prefix");
    assert!(
        version == env!("CARGO_PKG_VERSION") || version.starts_with("dev@"),
        "unexpected version {version}"
    );
}
