//! Minimal XML reader/writer for POM documents

pub mod cursor;
pub mod model;
pub mod parser;
pub mod writer;

pub use model::{Content, Document, Element};
pub use parser::Parser;
pub use writer::{write_document, Layout};

use crate::error::Result;

/// Parse a document from a string
pub fn from_str(input: &str) -> Result<Document> {
    Parser::new(input.as_bytes()).parse()
}

/// Parse a document from bytes
pub fn from_bytes(input: &[u8]) -> Result<Document> {
    Parser::new(input).parse()
}
