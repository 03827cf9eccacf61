//! Rewrite rules
//!
//! Each rule is a stateless pass over the document with the signature of
//! [`Rule`]. A rule checks its own switch in [`PipelineConfig`] and does
//! nothing when disabled, and tolerates any section being absent.

pub mod dependencies;
pub mod organize;
pub mod plugins;
pub mod properties;
pub mod sort;
pub mod versions;

use crate::config::PipelineConfig;
use crate::document::PomDocument;
use crate::error::Result;
use crate::xml::{Content, Element};

pub use dependencies::normalize_dependency;
pub use organize::prototype_order;
pub use plugins::normalize_plugin;
pub use sort::sort_section;
pub use versions::{promote_versions, PromotionSummary};

/// A rewrite pass over the document
pub type Rule = fn(&mut PomDocument, &PipelineConfig) -> Result<()>;

/// Elements that hold sections: the project itself and each profile
const SECTION_OWNERS: &[&str] = &["/*", "/*/profiles/profile"];

/// Sections holding `<dependency>` children, relative to a section owner
const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "dependencyManagement/dependencies"];

/// Sections holding `<plugin>` children, relative to a section owner
const PLUGIN_SECTIONS: &[&str] = &[
    "build/plugins",
    "build/pluginManagement/plugins",
    "reporting/plugins",
];

/// Paths of the direct and managed dependency sections
pub(crate) fn dependency_section_paths() -> Vec<String> {
    SECTION_OWNERS
        .iter()
        .flat_map(|owner| {
            DEPENDENCY_SECTIONS
                .iter()
                .map(move |section| format!("{owner}/{section}"))
        })
        .collect()
}

/// Paths of project dependencies (direct and managed)
pub(crate) fn dependency_paths() -> Vec<String> {
    dependency_section_paths()
        .into_iter()
        .map(|section| format!("{section}/dependency"))
        .collect()
}

/// Paths of plugins in build, plugin management and reporting
pub(crate) fn plugin_paths() -> Vec<String> {
    SECTION_OWNERS
        .iter()
        .flat_map(|owner| {
            PLUGIN_SECTIONS
                .iter()
                .map(move |section| format!("{owner}/{section}/plugin"))
        })
        .collect()
}

/// Paths of dependencies declared inside plugins
pub(crate) fn plugin_dependency_paths() -> Vec<String> {
    plugin_paths()
        .into_iter()
        .map(|plugin| format!("{plugin}/dependencies/dependency"))
        .collect()
}

/// Rebuild `element`'s children in `canonical` order.
///
/// Children with names outside `canonical` follow in their original
/// relative order. Comments and text are dropped.
pub(crate) fn reorder_children<S: AsRef<str>>(element: &mut Element, canonical: &[S]) {
    let mut known: Vec<Vec<Element>> = canonical.iter().map(|_| Vec::new()).collect();
    let mut extras = Vec::new();

    for child in std::mem::take(&mut element.children) {
        let Content::Element(child) = child else {
            continue;
        };
        let slot = canonical
            .iter()
            .position(|name| name.as_ref() == child.local_name())
            .and_then(|index| known.get_mut(index));
        match slot {
            Some(slot) => slot.push(child),
            None => extras.push(child),
        }
    }

    element.children = known
        .into_iter()
        .flatten()
        .chain(extras)
        .map(Content::Element)
        .collect();
}

/// Remove `name` children whose trimmed text equals `default`
pub(crate) fn remove_default(element: &mut Element, name: &str, default: &str) -> bool {
    let before = element.children.len();
    element.children.retain(|content| match content {
        Content::Element(child) => {
            !(child.local_name() == name && child.text().trim() == default)
        }
        _ => true,
    });
    before != element.children.len()
}
