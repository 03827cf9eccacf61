//! Canonical child order for dependencies

use tracing::debug;

use crate::config::PipelineConfig;
use crate::document::PomDocument;
use crate::error::Result;
use crate::gav::{DEFAULT_PACKAGING, DEFAULT_SCOPE};
use crate::rules::{dependency_paths, plugin_dependency_paths, remove_default, reorder_children};
use crate::xml::Element;

/// Canonical order of `<dependency>` children
pub const DEPENDENCY_ORDER: &[&str] = &[
    "groupId",
    "artifactId",
    "version",
    "type",
    "classifier",
    "scope",
    "systemPath",
    "exclusions",
    "optional",
];

/// Normalize every project, managed and plugin dependency
pub fn apply(doc: &mut PomDocument, config: &PipelineConfig) -> Result<()> {
    if !config.normalize_dependencies {
        return Ok(());
    }

    let mut count = 0usize;
    for path in dependency_paths().iter().chain(&plugin_dependency_paths()) {
        for handle in doc.select_all_handles(path)? {
            if let Some(dependency) = doc.get_mut(&handle) {
                normalize_dependency(dependency);
                count += 1;
            }
        }
    }
    debug!(count, "normalized dependencies");
    Ok(())
}

/// Drop default `scope`/`type` values and put children in canonical order
pub fn normalize_dependency(dependency: &mut Element) {
    remove_default(dependency, "scope", DEFAULT_SCOPE);
    remove_default(dependency, "type", DEFAULT_PACKAGING);
    reorder_children(dependency, DEPENDENCY_ORDER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    #[test]
    fn test_normalize_dependency_order_and_defaults() -> Result<()> {
        let mut doc = xml::from_str(
            "<dependency><!-- pinned --><optional>true</optional><scope>compile</scope>\
             <version>1.0</version><type>jar</type><artifactId>a</artifactId>\
             <extra>x</extra><groupId>g</groupId></dependency>",
        )?;
        normalize_dependency(&mut doc.root);
        let names: Vec<&str> = doc.root.elements().map(Element::local_name).collect();
        assert_eq!(names, vec!["groupId", "artifactId", "version", "optional", "extra"]);
        assert_eq!(doc.root.children.len(), 5);
        Ok(())
    }

    #[test]
    fn test_non_default_scope_and_type_are_kept() -> Result<()> {
        let mut doc = xml::from_str(
            "<dependency><scope>test</scope><type>test-jar</type><artifactId>a</artifactId></dependency>",
        )?;
        normalize_dependency(&mut doc.root);
        let names: Vec<&str> = doc.root.elements().map(Element::local_name).collect();
        assert_eq!(names, vec!["artifactId", "type", "scope"]);
        Ok(())
    }

    #[test]
    fn test_disabled_rule_is_noop() -> Result<()> {
        let input = "<project><dependencies><dependency><scope>compile</scope></dependency></dependencies></project>";
        let mut doc = PomDocument::parse(input)?;
        let before = doc.clone();
        let config = PipelineConfig {
            normalize_dependencies: false,
            ..PipelineConfig::default()
        };
        apply(&mut doc, &config)?;
        assert_eq!(doc, before);
        Ok(())
    }
}
