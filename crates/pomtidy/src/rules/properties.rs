//! Common project properties

use tracing::debug;

use crate::config::PipelineConfig;
use crate::document::PomDocument;
use crate::error::Result;

/// Properties every project should declare, with their default values
pub const COMMON_PROPERTIES: &[(&str, &str)] = &[
    ("project.build.sourceEncoding", "UTF-8"),
    ("project.reporting.outputEncoding", "UTF-8"),
];

/// Add missing common properties; declared values are left alone
pub fn apply(doc: &mut PomDocument, config: &PipelineConfig) -> Result<()> {
    if !config.insert_common_properties {
        return Ok(());
    }

    for (name, value) in COMMON_PROPERTIES {
        if !doc.has_property(name) {
            debug!(property = name, value, "adding common property");
            doc.set_property(name, value);
        }
    }
    Ok(())
}
