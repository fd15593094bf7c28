use std::collections::HashMap;

use anyhow::{anyhow, Context};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractSection;

pub const MAX_HEADING_LEVEL: u8 = 4;

const HEADING_STYLE_LEVELS: [(&str, u8); 10] = [
    ("heading1", 1),
    ("h1", 1),
    ("heading2", 2),
    ("h2", 2),
    ("heading3", 3),
    ("h3", 3),
    ("heading4", 4),
    ("heading4a", 4),
    ("h4", 4),
    ("h4a", 4),
];

static HEADING_FALLBACK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:heading\s*|h)([1-4])a?$").expect("heading style regex"));
static CASE_NO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^case\s+no\.?\s+[\w-]+$").expect("case no regex"));
static PAGE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d+(\s+of\s+\d+)?$").expect("page number regex"));

/// Heading level for a raw paragraph style, or `None` for body text.
pub fn heading_level(style: Option<&str>) -> Option<u8> {
    let style = style?;
    if style.is_empty() {
        return None;
    }
    let lower = style.to_lowercase();
    if let Some((_, level)) = HEADING_STYLE_LEVELS.iter().find(|(name, _)| *name == lower) {
        return Some(*level);
    }
    let caps = HEADING_FALLBACK_RE.captures(style)?;
    let level: u8 = caps[1].parse().ok()?;
    Some(level.min(MAX_HEADING_LEVEL))
}

/// Boilerplate that never becomes section content: blank lines, "Case No. …"
/// banners and bare page numbers ("12", "12 of 34").
pub fn should_skip(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || CASE_NO_RE.is_match(text) || PAGE_NUMBER_RE.is_match(text)
}

/// Heading and boilerplate rules with the built-in tables plus any aliases and
/// skip patterns from `[extract]` in the config file.
#[derive(Clone, Debug, Default)]
pub struct Classifier {
    extra_styles: HashMap<String, u8>,
    extra_skips: Vec<Regex>,
}

impl Classifier {
    pub fn from_config(section: &ExtractSection) -> anyhow::Result<Self> {
        let mut extra_styles = HashMap::new();
        for (name, level) in &section.heading_styles {
            if *level == 0 {
                return Err(anyhow!(
                    "heading style '{name}' maps to level 0; levels start at 1"
                ));
            }
            extra_styles.insert(name.to_lowercase(), (*level).min(MAX_HEADING_LEVEL));
        }
        let extra_skips = section
            .skip_patterns
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("invalid skip pattern: {p}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            extra_styles,
            extra_skips,
        })
    }

    pub fn heading_level(&self, style: Option<&str>) -> Option<u8> {
        let style = style?;
        if let Some(level) = heading_level(Some(style)) {
            return Some(level);
        }
        self.extra_styles.get(&style.to_lowercase()).copied()
    }

    pub fn should_skip(&self, text: &str) -> bool {
        if should_skip(text) {
            return true;
        }
        let text = text.trim();
        self.extra_skips.iter().any(|re| re.is_match(text))
    }
}
