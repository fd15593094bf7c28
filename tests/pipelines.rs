use std::io::{Cursor, Write};
use std::path::Path;
use std::process::Command;

use docx_legal::akn::{extract_to_akn, ExtractOptions};
use docx_legal::cover::{cover_values, generate_cover};
use docx_legal::docx::package::{DocxPackage, DOCUMENT_PART};
use docx_legal::progress::ConsoleProgress;
use docx_legal::DocxToolError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    )
}

fn para(style: Option<&str>, text: &str) -> String {
    let ppr = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
        .unwrap_or_default();
    format!("<w:p>{ppr}<w:r><w:t>{text}</w:t></w:r></w:p>")
}

fn write_docx(path: &Path, document_xml: &str) {
    let mut zout = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data, opts) in [
        ("[Content_Types].xml", br#"<Types/>"#.to_vec(), deflated),
        ("_rels/.rels", br#"<Relationships/>"#.to_vec(), deflated),
        ("word/document.xml", document_xml.as_bytes().to_vec(), deflated),
        ("word/styles.xml", br#"<w:styles/>"#.to_vec(), deflated),
        ("word/media/seal.png", vec![0x89, b'P', b'N', b'G', 9, 8, 7], stored),
    ] {
        zout.start_file(name, opts).unwrap();
        zout.write_all(&data).unwrap();
    }
    std::fs::write(path, zout.finish().unwrap().into_inner()).unwrap();
}

fn cover_template() -> String {
    document(
        &[
            para(Some("Caption"), "No. 6461"),
            para(Some("Caption"), "APPELLANTS OPENING BRIEF"),
            para(None, "Appeal from the District Court"),
            para(None, "Hon. Stacy Beckerman"),
        ]
        .concat(),
    )
}

#[test]
fn cover_round_trip_preserves_other_entries() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("cover_template.docx");
    write_docx(&template, &cover_template());
    let output = dir.path().join("filled/cover.docx");

    let values = cover_values("No. 24-1234", "REPLY BRIEF & EXCERPTS", "Hon. A. Judge");
    let outcome = generate_cover(
        &template,
        &output,
        &values,
        false,
        &ConsoleProgress::disabled(),
    )
    .unwrap();
    assert!(outcome.written);
    for e in &outcome.report.entries {
        assert_eq!(e.matches, 1, "{}", e.key);
    }

    let src = DocxPackage::read(&template).unwrap();
    let dst = DocxPackage::read(&output).unwrap();
    assert_eq!(src.entries.len(), dst.entries.len());
    for (a, b) in src.entries.iter().zip(&dst.entries) {
        assert_eq!(a.name, b.name);
        if a.name != DOCUMENT_PART {
            assert_eq!(a.data, b.data, "{}", a.name);
        }
    }
    let xml = dst.part_text(DOCUMENT_PART, "template").unwrap();
    assert!(xml.contains("<w:t>REPLY BRIEF &amp; EXCERPTS</w:t>"));

    // The placeholders are gone, so a second pass cannot find them.
    let again = dir.path().join("again.docx");
    let err = generate_cover(&output, &again, &values, false, &ConsoleProgress::disabled())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DocxToolError>(),
        Some(DocxToolError::PlaceholderNotFound { .. })
    ));
    assert!(!again.exists());
}

#[test]
fn headings_become_nested_sections() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("brief.docx");
    let body = [
        para(None, "Case No. 24-1234"),
        para(Some("Heading1"), "H1_a"),
        para(None, "alpha"),
        para(Some("Heading2"), "H2_a"),
        para(None, "12 of 45"),
        para(Some("Heading1"), "H1_b"),
        para(Some("Heading3"), "H3_a"),
        para(None, "beta"),
    ]
    .concat();
    write_docx(&input, &document(&body));
    let output = dir.path().join("brief.akn.xml");

    let root = extract_to_akn(
        &input,
        &output,
        &ExtractOptions::default(),
        &ConsoleProgress::disabled(),
    )
    .unwrap();
    let titles: Vec<_> = root.children.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["H1_a", "H1_b"]);
    assert_eq!(root.children[0].children[0].title, "H2_a");
    assert_eq!(root.children[1].children[0].title, "H3_a");

    let xml = std::fs::read_to_string(&output).unwrap();
    assert!(xml.contains(
        r#"<body><section id="h1-a" level="1"><heading>H1_a</heading><p>alpha</p><section id="h2-a" level="2"><heading>H2_a</heading></section></section><section id="h1-b" level="1"><heading>H1_b</heading><section id="h3-a" level="3"><heading>H3_a</heading><p>beta</p></section></section></body>"#
    ));
    assert!(!xml.contains("12 of 45"));
    assert!(!xml.contains("Case No."));
}

#[test]
fn no_headings_gives_empty_body() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.docx");
    write_docx(&input, &document(&[para(None, "one"), para(None, "two")].concat()));
    let output = dir.path().join("plain.xml");

    extract_to_akn(
        &input,
        &output,
        &ExtractOptions::default(),
        &ConsoleProgress::disabled(),
    )
    .unwrap();
    let xml = std::fs::read_to_string(&output).unwrap();
    assert!(xml.contains("<body></body>"));
    assert!(!xml.contains("<section"));
}

#[test]
fn cover_cli_reports_errors_with_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("cover_template.docx");
    write_docx(&template, &cover_template());

    let out = Command::new(env!("CARGO_BIN_EXE_docx-cover"))
        .arg(&template)
        .arg(&template)
        .args(["--case-number", "No. 1", "--filing-name", "BRIEF", "--judge", "J"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("Error: output path must differ from template"));

    let out = Command::new(env!("CARGO_BIN_EXE_docx-cover"))
        .arg(&template)
        .arg(dir.path().join("cover.docx"))
        .args(["--case-number", "No. 1", "--filing-name", "BRIEF", "--judge", "J", "--dry-run"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("- judge: 'Hon. Stacy Beckerman' -> 'J' (matches: 1)"));
    assert!(!dir.path().join("cover.docx").exists());
}

#[test]
fn akn_cli_prints_outline_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("brief.docx");
    let body = [
        para(Some("H1"), "Argument"),
        para(Some("H4a"), "Sub point"),
    ]
    .concat();
    write_docx(&input, &document(&body));
    let output = dir.path().join("brief.xml");
    let config = dir.path().join("empty.toml");
    std::fs::write(&config, "").unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_docx-akn"))
        .arg(&input)
        .arg(&output)
        .arg("--toc")
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("H1: Argument\n  H4: Sub point\n"));
    assert!(stdout.contains("Akoma Ntoso XML written to"));
    assert!(output.exists());

    let out = Command::new(env!("CARGO_BIN_EXE_docx-akn"))
        .arg(dir.path().join("missing.docx"))
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("Error: input DOCX not found: "));
}
