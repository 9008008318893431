use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

fn fonts_dir() -> Option<PathBuf> {
    if let Ok(env_override) = env::var("GLYPHLENS_TEST_FONTS") {
        let path = PathBuf::from(env_override);
        if let Ok(dir) = path.canonicalize() {
            return Some(dir);
        }
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.join("..").join("test-fonts").canonicalize().ok()
}

fn dejavu_sans() -> Option<PathBuf> {
    let path = fonts_dir()?.join("DejaVuSans.ttf");
    path.exists().then_some(path)
}

#[test]
fn describe_rejects_files_that_are_not_fonts() {
    let tmp = tempdir().expect("tempdir");
    let bogus = tmp.path().join("bogus.ttf");
    fs::write(&bogus, b"definitely not sfnt").expect("write");

    let output = Command::new(env!("CARGO_BIN_EXE_glyphlens"))
        .arg("describe")
        .arg(&bogus)
        .arg("U+0041")
        .output()
        .expect("run glyphlens");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error:"), "stderr: {stderr}");
    assert!(stderr.contains("bogus.ttf"), "stderr: {stderr}");
}

#[test]
fn features_on_empty_directory_prints_empty_json_array() {
    let tmp = tempdir().expect("tempdir");

    let output = Command::new(env!("CARGO_BIN_EXE_glyphlens"))
        .args(["features", "--json"])
        .arg(tmp.path())
        .output()
        .expect("run glyphlens");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("parse json output");
    assert_eq!(parsed.as_array().map(Vec::len), Some(0));
}

#[test]
fn zero_jobs_is_rejected() {
    let tmp = tempdir().expect("tempdir");

    let output = Command::new(env!("CARGO_BIN_EXE_glyphlens"))
        .args(["features", "--jobs", "0"])
        .arg(tmp.path())
        .output()
        .expect("run glyphlens");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--jobs"));
}

#[test]
fn features_json_lists_sentinel_first() {
    let fonts = match fonts_dir() {
        Some(dir) => dir,
        None => return, // skip when fixtures are unavailable
    };

    let output = Command::new(env!("CARGO_BIN_EXE_glyphlens"))
        .args(["features", "--json", "--jobs", "1"])
        .arg(&fonts)
        .output()
        .expect("run glyphlens");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parsed: Value = serde_json::from_slice(&output.stdout).expect("parse json output");
    let arr = parsed.as_array().expect("features --json returns a JSON array");
    assert!(!arr.is_empty(), "expected at least one face");

    for entry in arr {
        let features = entry["features"].as_array().expect("features array");
        assert_eq!(features[0]["display_name"], "None", "{entry}");
        assert!(features[0]["tag"].is_null());
    }
}

#[test]
fn scripts_ndjson_emits_one_object_per_line() {
    let fonts = match fonts_dir() {
        Some(dir) => dir,
        None => return, // skip when fixtures are unavailable
    };

    let output = Command::new(env!("CARGO_BIN_EXE_glyphlens"))
        .args(["scripts", "--ndjson", "--color", "always"])
        .arg(&fonts)
        .output()
        .expect("run glyphlens");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.lines().count() > 0);
    assert!(!stdout.contains("\u{1b}["), "JSON output should never be colorized");
    for line in stdout.lines() {
        let entry: Value = serde_json::from_str(line).expect("parse ndjson line");
        assert!(entry["segments"].is_array());
    }
}

#[test]
fn describe_and_search_latin_capital_a() {
    let font = match dejavu_sans() {
        Some(path) => path,
        None => return, // skip when fixtures are unavailable
    };

    let describe = Command::new(env!("CARGO_BIN_EXE_glyphlens"))
        .arg("describe")
        .arg(&font)
        .arg("U+0041")
        .output()
        .expect("run describe");
    assert!(
        describe.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&describe.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&describe.stdout).trim_end(),
        "U+0041\tLatin Capital Letter A"
    );

    let search = Command::new(env!("CARGO_BIN_EXE_glyphlens"))
        .args(["search", "--json", "--limit", "1"])
        .arg(&font)
        .arg("41")
        .output()
        .expect("run search");
    assert!(
        search.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&search.stderr)
    );
    let hits: Value = serde_json::from_slice(&search.stdout).expect("parse search json");
    let hits = hits.as_array().expect("search --json returns array");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["code_point"], 0x41);
    assert_eq!(hits[0]["hex"], "0041");
}
