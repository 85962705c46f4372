use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_manifest(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp manifest");
    tmp.write_all(xml.as_bytes()).expect("write manifest");
    tmp
}

#[test]
fn cli_simulates_frames_and_prints_final_state() {
    let manifest = write_manifest(
        r#"<scene>
  <starfield>
    <count>120</count>
  </starfield>
  <link>
    <name>projects</name>
    <url>https://example.dev/projects</url>
    <position>-4 1 -10</position>
  </link>
</scene>
"#,
    );

    let mut cmd = Command::cargo_bin("starfield-runtime").expect("binary exists");
    cmd.arg(manifest.path())
        .arg("--summary-only")
        .arg("--frames")
        .arg("120");
    cmd.assert()
        .success()
        .stdout(contains("Loaded landing scene: 1 links, 120 stars"))
        .stdout(contains(" - projects -> https://example.dev/projects"))
        .stdout(contains("Simulated 120 frames"))
        .stdout(contains("stars=120"))
        .stdout(contains("camera=(0.05, 0.00, 2.50)"))
        .stdout(contains("decor_x=-7.50"));
}

#[test]
fn cli_runs_with_the_built_in_scene() {
    let mut cmd = Command::cargo_bin("starfield-runtime").expect("binary exists");
    cmd.arg("--summary-only").arg("--frames").arg("30");
    cmd.assert()
        .success()
        .stdout(contains("Loaded landing scene: 2 links, 200 stars"))
        .stdout(contains("stars=200"));
}

#[test]
fn cli_rejects_a_manifest_without_a_url() {
    let manifest = write_manifest("<scene><link><name>broken</name></link></scene>");
    let mut cmd = Command::cargo_bin("starfield-runtime").expect("binary exists");
    cmd.arg(manifest.path()).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("<url> tag is missing"));
}

#[test]
fn cli_rejects_unknown_flags() {
    let mut cmd = Command::cargo_bin("starfield-runtime").expect("binary exists");
    cmd.arg("--bogus");
    cmd.assert().failure().stderr(contains("Unknown argument"));
}
