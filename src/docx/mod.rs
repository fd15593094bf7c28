pub mod package;
pub mod paragraphs;
pub mod xml;
