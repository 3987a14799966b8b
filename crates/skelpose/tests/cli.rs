use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use skelpose::overlay::write_png;
use skelpose::RgbImage;

const RIG: &str = r#"{
    "joints": [
        { "name": "bone", "head": [0, 0, 0], "tail": [0, 0, 1] }
    ]
}"#;

fn blobs(dir: &Path, name: &str, centres: &[(i64, i64)]) -> PathBuf {
    let mut img = RgbImage::new(100, 100);
    for &(cx, cy) in centres {
        for y in cy - 2..cy + 2 {
            for x in cx - 2..cx + 2 {
                img.put_pixel(x, y, [255, 0, 0]);
            }
        }
    }
    let path = dir.join(name);
    write_png(&path, &img).expect("write png");
    path
}

struct Fixture {
    dir: tempfile::TempDir,
    rig: PathBuf,
    images: [PathBuf; 4],
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let rig = dir.path().join("rig.json");
    fs::write(&rig, RIG).expect("rig");
    let rest = [(50, 20), (50, 80)];
    let target = [(30, 30), (70, 70)];
    let images = [
        blobs(dir.path(), "front_rest.png", &rest),
        blobs(dir.path(), "side_rest.png", &rest),
        blobs(dir.path(), "front_target.png", &target),
        blobs(dir.path(), "side_target.png", &target),
    ];
    Fixture { dir, rig, images }
}

fn process_cmd(rig: &Path, images: &[PathBuf; 4], report: &Path) -> Command {
    let mut cmd = Command::cargo_bin("skelpose").expect("binary");
    cmd.arg("process")
        .arg("--rig")
        .arg(rig)
        .arg("--front-rest")
        .arg(&images[0])
        .arg("--side-rest")
        .arg(&images[1])
        .arg("--front-target")
        .arg(&images[2])
        .arg("--side-target")
        .arg(&images[3])
        .arg("--output")
        .arg(report);
    cmd
}

#[test]
fn process_writes_report_with_final_pose() {
    let f = fixture();
    let report = f.dir.path().join("report.json");
    process_cmd(&f.rig, &f.images, &report)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok: detections 2/2/2/2"));

    let raw = fs::read_to_string(&report).expect("report");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["result"]["success"], serde_json::Value::Bool(true));
    assert_eq!(json["result"]["rotations"]["bone"]["source"], "solved");
    assert!(json["pose"]["bone"].is_array());
}

#[test]
fn zero_influence_keeps_rest_pose() {
    let f = fixture();
    let report = f.dir.path().join("report.json");
    process_cmd(&f.rig, &f.images, &report)
        .args(["--influence", "0"])
        .assert()
        .success();

    let raw = fs::read_to_string(&report).expect("report");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    // Quaternions serialize as [i, j, k, w].
    let q = json["pose"]["bone"].as_array().expect("quaternion");
    assert_eq!(q[3].as_f64(), Some(1.0));
}

#[test]
fn nearest_rest_flag_keeps_config_margin() {
    let f = fixture();
    let report = f.dir.path().join("report.json");
    let config = f.dir.path().join("run.json");
    let cfg = serde_json::json!({
        "front_rest": f.images[0],
        "side_rest": f.images[1],
        "front_target": f.images[2],
        "side_target": f.images[3],
        "rig_path": f.rig,
        "output_path": report,
        "params": { "correspondence": { "kind": "nearest_rest", "margin": 1.5 } }
    });
    fs::write(&config, cfg.to_string()).expect("config");

    Command::cargo_bin("skelpose")
        .expect("binary")
        .args(["process", "--correspondence", "nearest-rest", "--config"])
        .arg(&config)
        .assert()
        .success();

    let raw = fs::read_to_string(&report).expect("report");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let corr = &json["params"]["correspondence"];
    assert_eq!(corr["kind"], "nearest_rest");
    assert_eq!(corr["margin"].as_f64(), Some(1.5));
}

#[test]
fn missing_image_fails_and_leaves_report() {
    let f = fixture();
    let report = f.dir.path().join("report.json");
    let mut images = f.images.clone();
    images[3] = f.dir.path().join("nope.png");
    process_cmd(&f.rig, &images, &report)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open"));

    let raw = fs::read_to_string(&report).expect("report");
    assert!(raw.contains("nope.png"));
}

#[test]
fn process_without_inputs_explains_what_is_missing() {
    Command::cargo_bin("skelpose")
        .expect("binary")
        .arg("process")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing --front-rest"));
}

#[test]
fn render_writes_front_and_side_png() {
    let f = fixture();
    let out = f.dir.path().join("overlays");
    Command::cargo_bin("skelpose")
        .expect("binary")
        .args(["render", "--resolution", "128", "--rig"])
        .arg(&f.rig)
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("front.png"));
    assert!(out.join("front.png").is_file());
    assert!(out.join("side.png").is_file());
}
