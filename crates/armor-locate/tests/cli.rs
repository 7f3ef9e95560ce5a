#![cfg(all(feature = "cli", feature = "image"))]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

use armor_locate::core::{CameraIntrinsics, DepthMap, RgbImage};
use armor_locate::io::CycleReport;
use armor_locate::replay::{save_frame_pair, ReplayManifest};
use armor_locate::{FramePair, MissReason};

const W: usize = 120;
const H: usize = 90;

/// Two frames: a red plate at 1.8 m, then an empty scene.
fn write_sequence(dir: &Path) -> PathBuf {
    let mut color = RgbImage::filled(W, H, [10, 10, 10]);
    let mut depth = DepthMap::filled(W, H, 4000, 0.001);
    for y in 30..=60 {
        for x in 40..=80 {
            color.put_pixel(x, y, [230, 20, 20]);
            depth.set(x, y, 1800);
        }
    }
    let plate = FramePair::new(0, color, depth).unwrap();
    let empty = FramePair::new(
        1,
        RgbImage::filled(W, H, [10, 10, 10]),
        DepthMap::filled(W, H, 4000, 0.001),
    )
    .unwrap();

    let manifest = ReplayManifest {
        intrinsics: CameraIntrinsics::pinhole(W as u32, H as u32, 100.0, 100.0, 60.0, 45.0),
        depth_units: 0.001,
        frames: vec![
            save_frame_pair(dir, "a", &plate).unwrap(),
            save_frame_pair(dir, "b", &empty).unwrap(),
        ],
    };
    let path = dir.join("manifest.json");
    manifest.write_json(&path).unwrap();
    path
}

fn bin() -> Command {
    Command::cargo_bin("armor-locate").unwrap()
}

#[test]
fn prints_caption_per_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_sequence(dir.path());
    bin()
        .arg("--sequence")
        .arg(&manifest)
        .args(["--log-level", "off"])
        .assert()
        .success()
        .stdout(predicate::str::contains("frame 0 RED: distance: 1.80m"))
        .stdout(predicate::str::contains("frame 1: no detection (no target)"));
}

#[test]
fn writes_json_lines_report() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_sequence(dir.path());
    let report = dir.path().join("report.jsonl");
    bin()
        .arg("--sequence")
        .arg(&manifest)
        .arg("--output")
        .arg(&report)
        .args(["--json", "--log-level", "off"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""detected":true"#));

    let reports = CycleReport::read_json_lines(&report).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].detected);
    assert_eq!(reports[0].detection.as_ref().unwrap().raw_depth, 1800);
    assert_eq!(reports[1].miss, Some(MissReason::NoTarget));
}

#[test]
fn blue_target_and_cycle_limit() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_sequence(dir.path());
    bin()
        .arg("--sequence")
        .arg(&manifest)
        .args(["--color", "blue", "--max-cycles", "1", "--log-level", "off"])
        .assert()
        .success()
        .stdout(predicate::str::contains("frame 0: no detection (no target)"))
        .stdout(predicate::str::contains("frame 1").not());
}

#[test]
fn config_file_supplies_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_sequence(dir.path());
    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        format!(
            r#"{{ "sequence_path": {:?}, "localizer": {{ "shrink_ratio": 0.5 }} }}"#,
            manifest.to_string_lossy()
        ),
    )
    .unwrap();
    bin()
        .arg("--config")
        .arg(&config)
        .args(["--log-level", "off"])
        .assert()
        .success()
        .stdout(predicate::str::contains("distance: 1.80m"));
}

#[test]
fn rejects_invalid_shrink_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_sequence(dir.path());
    bin()
        .arg("--sequence")
        .arg(&manifest)
        .args(["--shrink-ratio", "1.2", "--log-level", "off"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("shrink_ratio"));
}

#[test]
fn missing_sequence_fails() {
    bin()
        .args(["--log-level", "off"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sequence given"));
}

#[test]
fn rejects_unknown_log_level() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_sequence(dir.path());
    bin()
        .arg("--sequence")
        .arg(&manifest)
        .args(["--log-level", "loud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown log level `loud`"));
}
