use std::io::Cursor;
use std::path::Path;

use clap::Parser as ClapParser;
use gds21::{GdsBoundary, GdsElement, GdsLibrary, GdsPoint, GdsStruct};
use reticle::library::LibraryExt;
use reticle::report::MergeReport;
use test_log::test;

use crate::prompt::Prompter;
use crate::{Args, reticlemerge};

fn rect(layer: i16, left: i32, bot: i32, right: i32, top: i32) -> GdsElement {
    GdsBoundary {
        layer,
        xy: GdsPoint::vec(&[
            (left, bot),
            (right, bot),
            (right, top),
            (left, top),
            (left, bot),
        ]),
        ..Default::default()
    }
    .into()
}

fn write_inputs(dir: &Path, design_tops: &[&str]) {
    let mut template = GdsLibrary::new("template");
    let mut target = GdsStruct::new("asml_template");
    target.elems.push(rect(1, -1000, -1000, 1000, 1000));
    template.structs.push(target);
    template.save(dir.join("template.gds")).unwrap();

    let mut design = GdsLibrary::new("design");
    for (i, name) in design_tops.iter().enumerate() {
        let mut top = GdsStruct::new(*name);
        let offset = 100 * i as i32;
        top.elems.push(rect(1, offset, 0, offset + 40, 20));
        design.structs.push(top);
    }
    design.save(dir.join("design.gds")).unwrap();
}

fn args(dir: &Path, extra: &[&str]) -> Args {
    let template = dir.join("template.gds");
    let design = dir.join("design.gds");
    let out = dir.join("merged");
    let mut argv = vec![
        "reticlemerge".to_string(),
        template.to_string_lossy().into_owned(),
        design.to_string_lossy().into_owned(),
        "--out".to_string(),
        out.to_string_lossy().into_owned(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    Args::try_parse_from(argv).unwrap()
}

fn no_input() -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
    Prompter::new(Cursor::new(Vec::new()), Vec::new())
}

#[test]
fn merges_without_prompting_when_fully_specified() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &["chip"]);
    let report_path = dir.path().join("report.json");
    let args = args(
        dir.path(),
        &[
            "--scale",
            "reticle",
            "--no-mirror",
            "--barcode",
            "lot7",
            "--report",
            report_path.to_str().unwrap(),
        ],
    );

    let out = reticlemerge(args, &mut no_input()).unwrap();
    assert_eq!(out, dir.path().join("merged.gds"));

    let merged = GdsLibrary::load(&out).unwrap();
    assert!(merged.struct_named("chip").is_some());

    let report: MergeReport =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report.design_cell, "chip");
    assert_eq!(report.barcode.as_deref(), Some("LOT7"));
    // Template layer 1 pushes the design's layer 1 onto the first free layer.
    assert_eq!(report.layer_map[0].from, 1);
    assert_eq!(report.layer_map[0].to, 0);
}

#[test]
fn missing_decisions_are_prompted_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &["chip", "test_structure"]);
    let args = args(dir.path(), &[]);

    let input = "2\nw\nrun1\ny\n";
    let mut prompter = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
    let out = reticlemerge(args, &mut prompter).unwrap();

    let merged = GdsLibrary::load(out).unwrap();
    let target = merged.struct_named("asml_template").unwrap();
    let placed: Vec<_> = target
        .elems
        .iter()
        .filter_map(|e| match e {
            GdsElement::GdsStructRef(x) => Some(x.name.as_str()),
            _ => None,
        })
        .collect();
    assert!(placed.contains(&"test_structure"));
    assert!(!placed.contains(&"chip"));
}

#[test]
fn closed_input_fails_instead_of_guessing() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &["chip"]);
    let args = args(dir.path(), &["--no-barcode", "--mirror"]);

    assert!(reticlemerge(args, &mut no_input()).is_err());
    assert!(!dir.path().join("merged.gds").exists());
}

#[test]
fn invalid_barcode_argument_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &["chip"]);
    let args = args(
        dir.path(),
        &["--scale", "wafer", "--no-mirror", "--barcode", "bad_label"],
    );

    let err = reticlemerge(args, &mut no_input()).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid barcode"));
}

#[test]
fn missing_template_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let args = args(dir.path(), &["--scale", "wafer", "--no-mirror", "--no-barcode"]);

    let err = reticlemerge(args, &mut no_input()).unwrap_err();
    assert!(format!("{err:#}").contains("template.gds"));
}
