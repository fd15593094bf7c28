use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a cover or extraction run.
///
/// These are raised through `anyhow` so call sites can attach context; use
/// `anyhow::Error::downcast_ref::<DocxToolError>()` to recover the kind.
#[derive(Error, Debug)]
pub enum DocxToolError {
    #[error("{what} not found: {}", path.display())]
    InputNotFound { what: &'static str, path: PathBuf },

    #[error("{part} not found in {context}")]
    MissingPart { part: String, context: &'static str },

    #[error("placeholder '{placeholder}' not found in any <w:t> node")]
    PlaceholderNotFound { placeholder: String },

    #[error("missing replacement value for {key}")]
    MissingReplacement { key: String },

    #[error("XML became invalid after replacing {placeholder}: {reason}")]
    InvalidXml { placeholder: String, reason: String },

    #[error("output path must differ from template to preserve the source file: {}", path.display())]
    PathCollision { path: PathBuf },
}
