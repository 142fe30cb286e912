// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Runs of the `docuhub` binary against a throwaway data directory.

use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use predicates::prelude::*;
use tempfile::TempDir;

fn docuhub(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docuhub").unwrap();
    cmd.env("DOCUHUB_DATA_DIR", data).env("RUST_LOG", "off");
    cmd
}

fn write_pdf(path: &Path, labels: &[&str]) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for label in labels {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tj", vec![Object::string_literal(*label)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => labels.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn pages(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

#[test]
fn help_lists_the_tools() {
    let dir = TempDir::new().unwrap();
    docuhub(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("compress"))
        .stdout(predicate::str::contains("to-pdf"))
        .stdout(predicate::str::contains("page-numbers"));
}

#[test]
fn merge_then_split_round_trip() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    write_pdf(&a, &["a1", "a2"]);
    write_pdf(&b, &["b1", "b2", "b3"]);

    let merged = dir.path().join("merged.pdf");
    docuhub(&data)
        .args(["merge"])
        .arg(&a)
        .arg(&b)
        .arg("-o")
        .arg(&merged)
        .assert()
        .success();
    assert_eq!(pages(&merged), 5);

    let part = dir.path().join("part.pdf");
    docuhub(&data)
        .arg("split")
        .arg(&merged)
        .args(["--pages", "2-3", "-o"])
        .arg(&part)
        .assert()
        .success();
    assert_eq!(pages(&part), 2);

    docuhub(&data)
        .arg("split")
        .arg(&merged)
        .args(["--pages", "6", "-o"])
        .arg(dir.path().join("nope.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid page range"));
}

#[test]
fn to_pdf_names_output_after_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "hello from the command line").unwrap();

    docuhub(&dir.path().join("data"))
        .arg("to-pdf")
        .arg(&input)
        .assert()
        .success();
    assert_eq!(pages(&dir.path().join("notes.pdf")), 1);
}

#[test]
fn wrong_file_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "not a pdf").unwrap();

    docuhub(&dir.path().join("data"))
        .arg("compress")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("isn't supported"));
}

#[test]
fn history_tracks_runs() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let input = dir.path().join("doc.pdf");
    write_pdf(&input, &["one", "two"]);

    docuhub(&data)
        .arg("page-numbers")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("numbered.pdf"))
        .assert()
        .success();
    docuhub(&data)
        .arg("compress")
        .arg(&input)
        .args(["--target", "500KB", "-o"])
        .arg(dir.path().join("small.pdf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("% smaller"));

    docuhub(&data)
        .arg("recent")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. small.pdf"))
        .stdout(predicate::str::contains("2. numbered.pdf"));

    docuhub(&data)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"\* pdf-compress\s").unwrap());

    docuhub(&data)
        .args(["recent", "--remove", "1"])
        .assert()
        .success();
    docuhub(&data)
        .args(["recent", "--deleted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("small.pdf"));

    let prefs: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(data.join("preferences.json")).unwrap())
            .unwrap();
    assert_eq!(prefs["targetSize"], "500KB");
    assert_eq!(prefs["lastTool"], "pdf-compress");
}

#[test]
fn metadata_prints_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("info.pdf");
    write_pdf(&input, &["x", "y", "z"]);

    let output = docuhub(&dir.path().join("data"))
        .arg("metadata")
        .arg(&input)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "info.pdf");
    assert_eq!(json["mimeType"], "application/pdf");
    assert_eq!(json["pdf"]["pageCount"], 3);
}
