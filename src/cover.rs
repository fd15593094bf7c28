//! Cover-page generation: swaps fixed placeholder texts inside `w:t` nodes of
//! a template's `word/document.xml` and repackages the archive.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use quick_xml::escape::escape;
use regex::{Captures, Regex};

use crate::docx::package::{DocxPackage, DOCUMENT_PART};
use crate::docx::xml::check_well_formed;
use crate::error::DocxToolError;
use crate::progress::ConsoleProgress;

#[derive(Clone, Copy, Debug)]
pub struct Placeholder {
    pub key: &'static str,
    pub text: &'static str,
}

/// The template's placeholders, in substitution order.
pub const PLACEHOLDERS: [Placeholder; 3] = [
    Placeholder {
        key: "case_number",
        text: "No. 6461",
    },
    Placeholder {
        key: "filing_name",
        text: "APPELLANTS OPENING BRIEF",
    },
    Placeholder {
        key: "judge",
        text: "Hon. Stacy Beckerman",
    },
];

pub fn cover_values(case_number: &str, filing_name: &str, judge: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("case_number".to_string(), case_number.to_string()),
        ("filing_name".to_string(), filing_name.to_string()),
        ("judge".to_string(), judge.to_string()),
    ])
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    pub key: String,
    pub placeholder: String,
    pub replacement: String,
    pub matches: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    pub entries: Vec<Substitution>,
}

impl SubstitutionReport {
    pub fn matches_for(&self, key: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.matches)
    }

    pub fn render_dry_run(&self) -> String {
        let mut out = String::from("Dry run: proposed replacements\n");
        for e in &self.entries {
            let _ = writeln!(
                out,
                "- {}: '{}' -> '{}' (matches: {})",
                e.key, e.placeholder, e.replacement, e.matches
            );
        }
        out.push_str("No files were written (dry run).\n");
        out
    }
}

/// Replaces every `w:t` element whose entire text is `placeholder` with the
/// escaped `replacement`. Returns the new XML and the number of nodes touched.
pub fn scoped_replace(
    xml: &str,
    placeholder: &str,
    replacement: &str,
) -> anyhow::Result<(String, usize)> {
    let pattern = format!(r"(<w:t(?:\s[^>]*)?>){}(</w:t>)", regex::escape(placeholder));
    let re = Regex::new(&pattern).context("build placeholder regex")?;

    let count = re.find_iter(xml).count();
    if count == 0 {
        return Err(DocxToolError::PlaceholderNotFound {
            placeholder: placeholder.to_string(),
        }
        .into());
    }

    let escaped = escape(replacement);
    let updated = re.replace_all(xml, |caps: &Captures<'_>| {
        format!("{}{}{}", &caps[1], escaped, &caps[2])
    });
    Ok((updated.into_owned(), count))
}

/// Applies every placeholder in table order, re-validating the XML after each.
/// Nothing is returned unless all of them succeed.
pub fn apply_replacements(
    xml: &str,
    values: &BTreeMap<String, String>,
) -> anyhow::Result<(String, SubstitutionReport)> {
    let mut updated = xml.to_string();
    let mut report = SubstitutionReport::default();
    for ph in PLACEHOLDERS {
        let replacement = values
            .get(ph.key)
            .ok_or_else(|| DocxToolError::MissingReplacement {
                key: ph.key.to_string(),
            })?;

        let (next, matches) = scoped_replace(&updated, ph.text, replacement)?;
        check_well_formed(&next).map_err(|e| DocxToolError::InvalidXml {
            placeholder: ph.text.to_string(),
            reason: format!("{e:#}"),
        })?;
        updated = next;
        report.entries.push(Substitution {
            key: ph.key.to_string(),
            placeholder: ph.text.to_string(),
            replacement: replacement.clone(),
            matches,
        });
    }
    Ok((updated, report))
}

#[derive(Debug)]
pub struct CoverOutcome {
    pub report: SubstitutionReport,
    pub written: bool,
}

/// Reads `template`, substitutes the placeholders and, unless `dry_run`,
/// writes the new archive to `output`.
pub fn generate_cover(
    template: &Path,
    output: &Path,
    values: &BTreeMap<String, String>,
    dry_run: bool,
    progress: &ConsoleProgress,
) -> anyhow::Result<CoverOutcome> {
    if !template.exists() {
        return Err(DocxToolError::InputNotFound {
            what: "template",
            path: template.to_path_buf(),
        }
        .into());
    }

    let pkg = DocxPackage::read(template)?;
    progress.info(format!(
        "read template {} ({} entries)",
        template.display(),
        pkg.entries.len()
    ));
    let xml = pkg.part_text(DOCUMENT_PART, "template")?;

    let (updated, report) = apply_replacements(&xml, values)?;
    for e in &report.entries {
        progress.info(format!("{}: {} match(es)", e.key, e.matches));
    }

    if dry_run {
        return Ok(CoverOutcome {
            report,
            written: false,
        });
    }

    let mut replacements = HashMap::new();
    replacements.insert(DOCUMENT_PART.to_string(), updated.into_bytes());
    pkg.write_with_replacements(output, &replacements)?;
    progress.info(format!("wrote {}", output.display()));
    Ok(CoverOutcome {
        report,
        written: true,
    })
}
