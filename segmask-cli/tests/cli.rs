// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;

const LABELS: &str = "ignore-class\nbackground-class\nlens\ncornea\n";

const ANNOTATION: &str = r#"{
    "version": "5.2.1",
    "flags": {},
    "shapes": [
        {"label": "lens", "points": [[0, 0], [4, 0], [4, 4], [0, 4]], "shape_type": "polygon"},
        {"label": "cornea", "points": [[2, 2], [8, 8]], "shape_type": "rectangle"}
    ],
    "imagePath": "scan.png",
    "imageData": null,
    "imageWidth": 8,
    "imageHeight": 8
}"#;

/// Fresh fixture directory with a label list and one folder per sample
fn fixture(name: &str, annotations: &[(&str, &str)]) -> PathBuf {
    let root = std::env::temp_dir().join(format!("segmask_{}_{}", name, std::process::id()));

    if root.exists() {
        std::fs::remove_dir_all(&root).unwrap();
    }

    std::fs::create_dir_all(root.join("input")).unwrap();
    std::fs::write(root.join("labels.txt"), LABELS).unwrap();

    for (sample, annotation) in annotations {
        let dir = root.join("input").join(sample);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.json", sample)), annotation).unwrap();
        GrayImage::from_pixel(8, 8, Luma([90]))
            .save(dir.join("scan.png"))
            .unwrap();
    }

    root
}

fn segmask() -> Command {
    Command::cargo_bin("segmask").unwrap()
}

fn path(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_rasterize_then_extract() {
    let root = fixture(
        "rasterize_then_extract",
        &[("sample_001", ANNOTATION), ("sample_002", ANNOTATION)],
    );

    segmask()
        .args([
            "rasterize",
            "-i",
            path(&root.join("input")),
            "-o",
            path(&root.join("rasterized")),
            "-l",
            path(&root.join("labels.txt")),
            "-t",
            "2",
        ])
        .assert()
        .success();

    for sample in ["sample_001", "sample_002"] {
        let dir = root.join("rasterized").join(sample);
        assert!(dir.join("JPEGImages").join(format!("{}.jpg", sample)).is_file());
        assert!(dir.join("SegmentationClass").join(format!("{}.npy", sample)).is_file());
        assert!(dir.join("SegmentationClassPNG").join(format!("{}.png", sample)).is_file());
        assert!(
            dir.join("SegmentationClassVisualization")
                .join(format!("{}.jpg", sample))
                .is_file()
        );
    }

    assert!(!root.join("rasterized").join("errors.tsv").exists());

    segmask()
        .args([
            "extract",
            "-i",
            path(&root.join("rasterized")),
            "-o",
            path(&root.join("masks")),
            "-l",
            path(&root.join("labels.txt")),
            "--verify",
        ])
        .assert()
        .success();

    let lens = image::open(root.join("masks/Mask_lens/sample_001.png"))
        .unwrap()
        .to_luma8();
    let cornea = image::open(root.join("masks/Mask_cornea/sample_002.png"))
        .unwrap()
        .to_luma8();

    std::fs::remove_dir_all(&root).unwrap();

    // Cornea is painted after lens and wins the overlap
    assert_eq!(lens.get_pixel(0, 0).0[0], 255);
    assert_eq!(lens.get_pixel(3, 3).0[0], 0);
    assert_eq!(lens.get_pixel(5, 5).0[0], 0);
    assert_eq!(cornea.get_pixel(3, 3).0[0], 255);
    assert_eq!(cornea.get_pixel(7, 7).0[0], 255);
    assert_eq!(cornea.get_pixel(0, 0).0[0], 0);
    assert!(lens.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
}

#[test]
fn test_rasterize_reports_failed_samples() {
    let unknown = ANNOTATION.replace("\"cornea\"", "\"retina\"");
    let root = fixture(
        "rasterize_failed_samples",
        &[("sample_001", ANNOTATION), ("sample_002", unknown.as_str())],
    );

    let rasterize = || {
        segmask()
            .args([
                "rasterize",
                "-i",
                path(&root.join("input")),
                "-o",
                path(&root.join("rasterized")),
                "-l",
                path(&root.join("labels.txt")),
            ])
            .assert()
            .success()
    };

    let failed = rasterize();
    let report = std::fs::read_to_string(root.join("rasterized").join("errors.tsv"));
    let written = root
        .join("rasterized/sample_001/SegmentationClassPNG/sample_001.png")
        .is_file();

    // A clean rerun into the same output removes the previous report
    std::fs::write(root.join("input/sample_002/sample_002.json"), ANNOTATION).unwrap();
    rasterize();
    let stale = root.join("rasterized").join("errors.tsv").exists();

    std::fs::remove_dir_all(&root).unwrap();

    failed
        .stderr(predicate::str::contains("WARNING:"))
        .stderr(predicate::str::contains("sample_002: [segmask::UnknownClass]"));

    let report = report.unwrap();
    assert!(report.starts_with("sample_002\t"));
    assert!(report.contains("retina"));
    assert!(written);
    assert!(!stale);
}

#[test]
fn test_invalid_label_file() {
    let root = fixture("invalid_label_file", &[("sample_001", ANNOTATION)]);
    std::fs::write(
        root.join("labels.txt"),
        "ignore-class\nbackground-class\nlens\nlens\n",
    )
    .unwrap();

    let assert = segmask()
        .args([
            "rasterize",
            "-i",
            path(&root.join("input")),
            "-o",
            path(&root.join("rasterized")),
            "-l",
            path(&root.join("labels.txt")),
        ])
        .assert();

    let written = root.join("rasterized").exists();
    std::fs::remove_dir_all(&root).unwrap();

    assert
        .failure()
        .stderr(predicate::str::contains("InvalidLabelFile"));
    assert!(!written);
}

#[test]
fn test_custom_markers() {
    let root = fixture("custom_markers", &[("sample_001", ANNOTATION)]);
    std::fs::write(
        root.join("labels.txt"),
        "__ignore__\n_background_\nlens\ncornea\n",
    )
    .unwrap();

    let assert = segmask()
        .args([
            "rasterize",
            "-i",
            path(&root.join("input")),
            "-o",
            path(&root.join("rasterized")),
            "-l",
            path(&root.join("labels.txt")),
            "--ignore-marker",
            "__ignore__",
            "--background-marker",
            "_background_",
        ])
        .assert();

    let written = root
        .join("rasterized/sample_001/SegmentationClassPNG/sample_001.png")
        .is_file();
    std::fs::remove_dir_all(&root).unwrap();

    assert.success();
    assert!(written);
}

#[test]
fn test_palette_overflow() {
    let root = fixture("palette_overflow", &[("sample_001", ANNOTATION)]);

    let mut labels = vec!["ignore-class".to_string(), "background-class".to_string()];
    labels.extend((1..=255).map(|i| format!("class_{}", i)));
    std::fs::write(root.join("labels.txt"), labels.join("\n")).unwrap();

    let assert = segmask()
        .args([
            "rasterize",
            "-i",
            path(&root.join("input")),
            "-o",
            path(&root.join("rasterized")),
            "-l",
            path(&root.join("labels.txt")),
        ])
        .assert();

    std::fs::remove_dir_all(&root).unwrap();

    assert
        .failure()
        .stderr(predicate::str::contains("ClassIdOverflow"));
}

#[test]
fn test_missing_input() {
    let root = fixture("missing_input", &[]);

    let assert = segmask()
        .args([
            "extract",
            "-i",
            path(&root.join("does_not_exist")),
            "-o",
            path(&root.join("masks")),
            "-l",
            path(&root.join("labels.txt")),
        ])
        .assert();

    std::fs::remove_dir_all(&root).unwrap();

    assert
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_extract_without_classes() {
    let root = fixture("extract_without_classes", &[]);
    std::fs::write(root.join("labels.txt"), "ignore-class\nbackground-class\n").unwrap();

    let assert = segmask()
        .args([
            "extract",
            "-i",
            path(&root.join("input")),
            "-o",
            path(&root.join("masks")),
            "-l",
            path(&root.join("labels.txt")),
        ])
        .assert();

    std::fs::remove_dir_all(&root).unwrap();

    assert
        .failure()
        .stderr(predicate::str::contains("no extractable classes"));
}
