//! Dependency sorting

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::document::PomDocument;
use crate::error::Result;
use crate::gav::{scope_rank, Artifact, Gav};
use crate::rules::dependency_section_paths;
use crate::xml::{Content, Element};

/// Map key for one dependency; fields compare in declaration order
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    scope_rank: Option<u8>,
    gav: Gav,
    classifier: Option<String>,
    packaging: String,
}

impl SortKey {
    fn new<R>(dependency: &Element, by_scope: bool, resolve: &R) -> Self
    where
        R: Fn(&str) -> String,
    {
        let artifact = Artifact::from_element(dependency);
        let gav = artifact.gav();
        Self {
            scope_rank: by_scope.then(|| scope_rank(artifact.scope())),
            gav: Gav::new(gav.group(), gav.artifact(), resolve(gav.version())),
            classifier: artifact.classifier().map(ToString::to_string),
            packaging: artifact.packaging().to_string(),
        }
    }
}

/// Sort the direct and managed dependency sections independently
pub fn apply(doc: &mut PomDocument, config: &PipelineConfig) -> Result<()> {
    if !config.sort.enabled {
        return Ok(());
    }

    for path in dependency_section_paths() {
        for handle in doc.select_all_handles(&path)? {
            // detach the section so versions can be resolved against the rest of the document
            let Some(mut section) = doc.get_mut(&handle).map(std::mem::take) else {
                continue;
            };
            sort_section_by(&mut section, config.sort.by_scope, |version| {
                doc.resolve_properties_with(version, |_| None)
            });
            if let Some(slot) = doc.get_mut(&handle) {
                *slot = section;
            }
        }
    }
    Ok(())
}

/// Order `<dependency>` children by coordinates, optionally grouped by scope.
///
/// Sections without dependencies are left untouched. Of several
/// dependencies with identical coordinates only the first is kept. Other
/// elements follow the sorted dependencies; comments are dropped.
pub fn sort_section(section: &mut Element, by_scope: bool) {
    sort_section_by(section, by_scope, |version| version.to_string());
}

/// Like [`sort_section`], comparing versions after `resolve` has expanded
/// their property references so promoted and literal versions sort alike
pub fn sort_section_by<R>(section: &mut Element, by_scope: bool, resolve: R)
where
    R: Fn(&str) -> String,
{
    if !section.elements().any(|child| child.local_name() == "dependency") {
        return;
    }

    let mut sorted = BTreeMap::new();
    let mut others = Vec::new();
    for child in std::mem::take(&mut section.children) {
        match child {
            Content::Element(child) if child.local_name() == "dependency" => {
                match sorted.entry(SortKey::new(&child, by_scope, &resolve)) {
                    Entry::Vacant(entry) => {
                        entry.insert(child);
                    }
                    Entry::Occupied(entry) => {
                        warn!(
                            dependency = %entry.key().gav,
                            "dropping duplicate dependency declaration"
                        );
                    }
                }
            }
            Content::Element(child) => others.push(child),
            Content::Text(_) | Content::Comment(_) => {}
        }
    }

    debug!(count = sorted.len(), by_scope, "sorted dependency section");
    section.children = sorted
        .into_values()
        .chain(others)
        .map(Content::Element)
        .collect();
}
