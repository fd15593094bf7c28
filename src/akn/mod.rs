//! Heading-structure extraction from a DOCX into Akoma Ntoso XML.

pub mod classify;
pub mod emit;
pub mod sections;

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;

use crate::config::ExtractSection;
use crate::docx::package::{DocxPackage, DOCUMENT_PART};
use crate::docx::paragraphs::extract_paragraphs;
use crate::docx::xml::parse_xml_part;
use crate::error::DocxToolError;
use crate::progress::ConsoleProgress;

pub use classify::Classifier;
pub use emit::EmitOptions;
pub use sections::{build_sections, Section};

#[derive(Clone, Debug, Default)]
pub struct ExtractOptions {
    pub classifier: Classifier,
    pub emit: EmitOptions,
}

impl ExtractOptions {
    pub fn from_config(section: &ExtractSection) -> anyhow::Result<Self> {
        Ok(Self {
            classifier: Classifier::from_config(section).context("invalid [extract] config")?,
            emit: EmitOptions {
                unique_ids: section.unique_ids.unwrap_or(false),
                emit_preamble: section.emit_preamble.unwrap_or(false),
            },
        })
    }
}

/// Indented `H<level>: <title>` lines for every section below the root.
pub fn render_outline(root: &Section) -> String {
    fn walk(s: &Section, depth: usize, out: &mut String) {
        let _ = writeln!(out, "{}H{}: {}", "  ".repeat(depth), s.level, s.title);
        for c in &s.children {
            walk(c, depth + 1, out);
        }
    }
    let mut out = String::new();
    for c in &root.children {
        walk(c, 0, &mut out);
    }
    out
}

/// Reads the DOCX at `input` and returns its section tree.
pub fn read_sections(
    input: &Path,
    opts: &ExtractOptions,
    progress: &ConsoleProgress,
) -> anyhow::Result<Section> {
    if !input.exists() {
        return Err(DocxToolError::InputNotFound {
            what: "input DOCX",
            path: input.to_path_buf(),
        }
        .into());
    }
    let pkg = DocxPackage::read(input)?;
    let xml = pkg.part_text(DOCUMENT_PART, "DOCX")?;
    let part = parse_xml_part(DOCUMENT_PART, xml.as_bytes())
        .with_context(|| format!("parse xml: {DOCUMENT_PART}"))?;

    let paragraphs = extract_paragraphs(&part);
    let root = build_sections(&paragraphs, &opts.classifier);
    progress.info(format!(
        "{} paragraph(s), {} section(s)",
        paragraphs.len(),
        root.descendant_count()
    ));
    Ok(root)
}

/// Writes `root` to `output` as Akoma Ntoso XML, noting dropped preamble
/// paragraphs and repeated section ids on the progress stream.
pub fn write_sections(
    root: &Section,
    output: &Path,
    opts: &ExtractOptions,
    progress: &ConsoleProgress,
) -> anyhow::Result<()> {
    if !root.content.is_empty() && !opts.emit.emit_preamble {
        progress.warn(format!(
            "{} paragraph(s) before the first heading are not emitted",
            root.content.len()
        ));
    }
    if !opts.emit.unique_ids {
        for (id, n) in emit::duplicate_ids(root) {
            progress.warn(format!("section id '{id}' is used {n} times"));
        }
    }

    emit::write_akn(root, output, opts.emit)?;
    progress.info(format!("wrote {}", output.display()));
    Ok(())
}

/// Full pipeline: DOCX in, Akoma Ntoso XML file out.
pub fn extract_to_akn(
    input: &Path,
    output: &Path,
    opts: &ExtractOptions,
    progress: &ConsoleProgress,
) -> anyhow::Result<Section> {
    let root = read_sections(input, opts, progress)?;
    write_sections(&root, output, opts, progress)?;
    Ok(root)
}
