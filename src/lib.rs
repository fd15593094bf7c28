//! DOCX utilities for legal filings: a cover-page placeholder filler and a
//! heading-structure extractor that emits Akoma Ntoso XML.

pub mod akn;
pub mod config;
pub mod cover;
pub mod docx;
pub mod error;
pub mod progress;
pub mod textutil;

pub use error::DocxToolError;
