//! Canonical child order for plugins

use tracing::debug;

use crate::config::PipelineConfig;
use crate::document::PomDocument;
use crate::error::Result;
use crate::rules::{plugin_paths, reorder_children};
use crate::xml::{Content, Element};

/// Group id Maven assumes for plugins that omit it
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// Canonical order of `<plugin>` children
pub const PLUGIN_ORDER: &[&str] = &[
    "groupId",
    "artifactId",
    "version",
    "extensions",
    "executions",
    "dependencies",
    "goals",
    "inherited",
    "configuration",
];

pub fn apply(doc: &mut PomDocument, config: &PipelineConfig) -> Result<()> {
    if !config.normalize_plugins {
        return Ok(());
    }

    let mut count = 0usize;
    for path in plugin_paths() {
        for handle in doc.select_all_handles(&path)? {
            if let Some(plugin) = doc.get_mut(&handle) {
                normalize_plugin(plugin);
                count += 1;
            }
        }
    }
    debug!(count, "normalized plugins");
    Ok(())
}

/// Fill in a missing `groupId` and put children in canonical order
pub fn normalize_plugin(plugin: &mut Element) {
    if plugin.child("groupId").is_none() {
        let group = Element::with_text(plugin.qualified("groupId"), DEFAULT_PLUGIN_GROUP);
        plugin.children.insert(0, Content::Element(group));
    }
    reorder_children(plugin, PLUGIN_ORDER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    #[test]
    fn test_missing_group_is_synthesized() -> Result<()> {
        let mut doc = xml::from_str(
            "<plugin><configuration><source>8</source></configuration>\
             <version>3.1</version><artifactId>maven-compiler-plugin</artifactId></plugin>",
        )?;
        normalize_plugin(&mut doc.root);
        let names: Vec<&str> = doc.root.elements().map(Element::local_name).collect();
        assert_eq!(names, vec!["groupId", "artifactId", "version", "configuration"]);
        assert_eq!(
            doc.root.child_text("groupId").as_deref(),
            Some(DEFAULT_PLUGIN_GROUP)
        );
        Ok(())
    }

    #[test]
    fn test_existing_group_is_kept() -> Result<()> {
        let mut doc = xml::from_str(
            "<plugin><artifactId>x</artifactId><groupId>org.codehaus.mojo</groupId></plugin>",
        )?;
        normalize_plugin(&mut doc.root);
        assert_eq!(doc.root.child_text("groupId").as_deref(), Some("org.codehaus.mojo"));
        assert_eq!(doc.root.elements().count(), 2);
        Ok(())
    }

    #[test]
    fn test_apply_reaches_plugin_management_and_reporting() -> Result<()> {
        let mut doc = PomDocument::parse(
            "<project><build><pluginManagement><plugins><plugin><artifactId>a</artifactId>\
             </plugin></plugins></pluginManagement></build><reporting><plugins><plugin>\
             <artifactId>b</artifactId></plugin></plugins></reporting></project>",
        )?;
        apply(&mut doc, &PipelineConfig::default())?;
        let groups: Vec<String> = doc
            .select_all("//plugin/groupId")?
            .into_iter()
            .map(Element::text)
            .collect();
        assert_eq!(groups, vec![DEFAULT_PLUGIN_GROUP, DEFAULT_PLUGIN_GROUP]);
        Ok(())
    }
}
