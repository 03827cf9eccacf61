//! Whole-document reordering against the bundled prototype POM

use tracing::debug;

use crate::config::PipelineConfig;
use crate::document::PomDocument;
use crate::error::{Error, Result};
use crate::rules::reorder_children;
use crate::xml;

const PROTOTYPE: &str = include_str!("../../resources/prototype-pom.xml");

/// Top-level element names in prototype order
pub fn prototype_order() -> Result<Vec<String>> {
    let prototype = xml::from_str(PROTOTYPE).map_err(|err| {
        Error::invalid_prototype(format!("bundled prototype POM does not parse: {err}"))
    })?;
    Ok(prototype
        .root
        .elements()
        .map(|element| element.local_name().to_string())
        .collect())
}

/// Reorder the project's top-level children; unknown elements go last
pub fn apply(doc: &mut PomDocument, config: &PipelineConfig) -> Result<()> {
    if !config.organize {
        return Ok(());
    }

    let order = prototype_order()?;
    reorder_children(doc.root_mut(), &order);
    debug!(sections = doc.root().children.len(), "organized document");
    Ok(())
}
