//! Error types for pomtidy

use std::fmt;
use thiserror::Error;

/// Position in the XML source; `line` and `col` start at 1
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed markup in the input document
    InvalidToken,
    UnexpectedEof,
    MismatchedTag { expected: String, found: String },
    DuplicateAttribute { name: String },
    InvalidEntity { entity: String },
    InvalidUtf8,
    TrailingContent,
    /// A path expression that cannot be parsed or used for the requested operation
    InvalidPath { path: String },
    /// Inconsistent pipeline configuration
    InvalidConfig,
    /// The bundled prototype document could not be used
    InvalidPrototype,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid token"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidEntity { entity } => write!(f, "invalid xml entity: &{entity};"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::TrailingContent => write!(f, "content after the root element"),
            Self::InvalidPath { path } => write!(f, "invalid path: {path}"),
            Self::InvalidConfig => write!(f, "invalid configuration"),
            Self::InvalidPrototype => write!(f, "invalid prototype document"),
        }
    }
}

/// Main error type for pomtidy
///
/// Parse errors carry the input position they were detected at; path,
/// configuration and prototype errors have none.
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    position: Option<Pos>,
    message: String,
}

impl Error {
    /// Error at an input position, described by its kind
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            position: Some(pos),
            message,
        }
    }

    /// Malformed markup at `pos` with a specific description
    pub fn syntax(pos: Pos, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidToken,
            position: Some(pos),
            message: message.into(),
        }
    }

    fn detached(kind: ErrorKind, message: String) -> Self {
        Self {
            kind,
            position: None,
            message,
        }
    }

    pub fn invalid_path(path: &str, reason: &str) -> Self {
        Self::detached(
            ErrorKind::InvalidPath {
                path: path.to_string(),
            },
            format!("invalid path '{path}': {reason}"),
        )
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::detached(ErrorKind::InvalidConfig, message.into())
    }

    pub fn invalid_prototype(message: impl Into<String>) -> Self {
        Self::detached(ErrorKind::InvalidPrototype, message.into())
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn position(&self) -> Option<Pos> {
        self.position
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{pos}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Result type alias for pomtidy
pub type Result<T> = std::result::Result<T, Error>;
