//! pomtidy - rule-based rewriting of Maven POM files
//!
//! The library parses a POM, runs a fixed pipeline of idempotent rewrite
//! rules over it and serializes the result:
//!
//! 1. insert common properties (source/reporting encodings)
//! 2. normalize dependency children (canonical order, default elision)
//! 3. sort dependency sections
//! 4. normalize plugin children
//! 5. promote literal versions to `${...}` properties
//! 6. optionally reorder the whole document to the prototype layout
//!
//! # Quick Start
//!
//! ```
//! use pomtidy::{tidy, PipelineConfig};
//! # fn main() -> Result<(), pomtidy::Error> {
//! let pom = "<project><dependencies><dependency>\
//!     <groupId>junit</groupId><artifactId>junit</artifactId>\
//!     <version>4.10</version><scope>test</scope>\
//!     </dependency></dependencies></project>";
//! let output = tidy(pom, &PipelineConfig::default())?;
//! assert!(output.contains("<junit.version>4.10</junit.version>"));
//! assert!(output.contains("<version>${junit.version}</version>"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod document;
pub mod error;
pub mod gav;
pub mod path;
pub mod pipeline;
pub mod rules;
pub mod xml;

pub use config::{PipelineConfig, PromotionConfig, SortConfig};
pub use document::{PomDocument, PropertyTable};
pub use error::{Error, ErrorKind, Pos, Result};
pub use gav::{Artifact, Gav};
pub use path::{NodeHandle, Path};
pub use pipeline::Pipeline;
pub use rules::{promote_versions, PromotionSummary};
pub use xml::Layout;

/// Run the full pipeline over a POM given as a string
pub fn tidy(input: &str, config: &PipelineConfig) -> Result<String> {
    Pipeline::new(config.clone())?.process_str(input)
}
