use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "docx-legal.toml";
pub const CONFIG_ENV: &str = "DOCX_LEGAL_CONFIG";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub extract: ExtractSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ExtractSection {
    /// Emit paragraphs that precede the first heading as a `<header>` block.
    #[serde(default)]
    pub emit_preamble: Option<bool>,

    /// Suffix repeated section ids with `-2`, `-3`, ... in document order.
    #[serde(default)]
    pub unique_ids: Option<bool>,

    /// Extra exact style-name aliases, e.g. `title = 1`. Keys are matched
    /// case-insensitively; levels above 4 are clamped.
    #[serde(default)]
    pub heading_styles: BTreeMap<String, u8>,

    /// Extra regexes; a paragraph whose trimmed text matches any of them is
    /// left out of section content.
    #[serde(default)]
    pub skip_patterns: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct LogSection {
    #[serde(default)]
    pub verbose: Option<bool>,
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text)
        .with_context(|| format!("parse config toml: {}", path.display()))?;
    Ok(cfg)
}

/// Resolves the config file: explicit path, then `$DOCX_LEGAL_CONFIG`, then
/// `docx-legal.toml` searched upwards from the current directory. An explicit
/// path must exist; otherwise a missing file means defaults.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<(AppConfig, Option<PathBuf>)> {
    if let Some(p) = explicit {
        return Ok((load_config(p)?, Some(p.to_path_buf())));
    }
    let discovered = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .filter(|p| p.is_file())
        .or_else(|| {
            std::env::current_dir()
                .ok()
                .and_then(|cwd| find_file_upwards(&cwd, CONFIG_FILENAME, 8))
        });
    match discovered {
        Some(p) => Ok((load_config(&p)?, Some(p))),
        None => Ok((AppConfig::default(), None)),
    }
}
