//! Promotion of literal versions to `${...}` properties
//!
//! Dependencies are named `<groupId>.version`, plugins
//! `plugin.<artifactId>.version`. When the preferred name is already bound
//! to a different version the artifact-qualified name is used instead:
//! `<groupId>.<artifactId>.version` for dependencies and
//! `plugin.<artifactId>-<version>.version` for plugins.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::config::{PipelineConfig, PromotionConfig};
use crate::document::{PomDocument, PropertyTable};
use crate::error::Result;
use crate::path::NodeHandle;
use crate::rules::plugins::DEFAULT_PLUGIN_GROUP;
use crate::rules::{dependency_paths, plugin_dependency_paths, plugin_paths};
use crate::xml::{Content, Element};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateKind {
    Dependency,
    Plugin,
}

/// A version rewritten to a property reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Promotion {
    pub coordinate: String,
    pub property: String,
    pub version: String,
    pub kind: CandidateKind,
}

/// A preferred property name that was already bound to another version
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collision {
    pub coordinate: String,
    pub preferred: String,
    pub existing_value: String,
    /// Fallback name used instead; `None` when the fallback was taken too
    pub chosen: Option<String>,
}

/// What a promotion pass changed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromotionSummary {
    pub promoted: Vec<Promotion>,
    pub collisions: Vec<Collision>,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
}

#[derive(Clone, Debug)]
struct Candidate {
    handle: NodeHandle,
    kind: CandidateKind,
    group: String,
    artifact: String,
    version: String,
    /// Property this version referenced before the replace-existing pass
    replaced: Option<String>,
}

impl Candidate {
    fn coordinate(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    fn preferred_name(&self) -> String {
        match self.kind {
            CandidateKind::Dependency => format!("{}.version", self.group),
            CandidateKind::Plugin => format!("plugin.{}.version", self.artifact),
        }
    }

    fn qualified_name(&self) -> String {
        match self.kind {
            CandidateKind::Dependency => format!("{}.{}.version", self.group, self.artifact),
            CandidateKind::Plugin => format!("plugin.{}-{}.version", self.artifact, self.version),
        }
    }
}

enum Claim {
    Free,
    Same,
    Taken(String),
}

fn claim(table: &PropertyTable, name: &str, version: &str) -> Claim {
    match table.get(name) {
        None => Claim::Free,
        Some(value) if value == version => Claim::Same,
        Some(value) => Claim::Taken(value.clone()),
    }
}

/// Name of the property in a whole-value reference such as `${junit.version}`
fn reference_name(version: &str) -> Option<&str> {
    version
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty() && !name.contains(['$', '{', '}']))
}

/// Pipeline stage wrapper around [`promote_versions`]
pub fn apply(doc: &mut PomDocument, config: &PipelineConfig) -> Result<()> {
    let summary = promote_versions(doc, config)?;
    if !summary.promoted.is_empty() {
        info!(
            promoted = summary.promoted.len(),
            added = summary.added.len(),
            deleted = summary.deleted.len(),
            "promoted versions to properties"
        );
    }
    Ok(())
}

/// Replace literal versions with property references, adding the properties
pub fn promote_versions(
    doc: &mut PomDocument,
    config: &PipelineConfig,
) -> Result<PromotionSummary> {
    let settings = &config.promotion;
    let mut summary = PromotionSummary::default();
    if !settings.enabled {
        return Ok(summary);
    }

    let mut table = doc.properties();
    let mut candidates = collect_candidates(doc, settings.convert_plugins)?;

    if settings.replace_existing {
        for candidate in &mut candidates {
            let Some(name) = reference_name(&candidate.version) else {
                continue;
            };
            if !table.contains_key(name) {
                continue;
            }
            let value = doc.resolve_properties(&candidate.version);
            if value.contains("${") || value.trim().is_empty() {
                continue;
            }
            debug!(property = name, value = %value, "resolving existing version reference");
            candidate.replaced = Some(name.to_string());
            candidate.version = value;
        }
    }

    let mut added_regular = BTreeMap::new();
    let mut added_plugins = BTreeMap::new();

    for candidate in &candidates {
        // any placeholder, whole or partial, means the version is not a literal
        if candidate.version.is_empty() || candidate.version.contains("${") {
            continue;
        }
        let Some(name) = choose_name(candidate, &table, settings, &mut summary) else {
            continue;
        };

        if !matches!(claim(&table, &name, &candidate.version), Claim::Same) {
            table.insert(name.clone(), candidate.version.clone());
            let added = match candidate.kind {
                CandidateKind::Dependency => &mut added_regular,
                CandidateKind::Plugin => &mut added_plugins,
            };
            added.insert(name.clone(), candidate.version.clone());
        }

        if let Some(version) = doc
            .get_mut(&candidate.handle)
            .and_then(|element| element.child_mut("version"))
        {
            version.set_text(format!("${{{name}}}"));
        }

        summary.promoted.push(Promotion {
            coordinate: candidate.coordinate(),
            property: name,
            version: candidate.version.clone(),
            kind: candidate.kind,
        });
    }

    // plugin properties go after all others
    for (name, value) in added_regular.iter().chain(&added_plugins) {
        doc.set_property(name, value);
        summary.added.push(name.clone());
    }

    let replaced: BTreeSet<&str> = candidates
        .iter()
        .filter_map(|candidate| candidate.replaced.as_deref())
        .collect();
    for name in replaced {
        if !references_property(doc.root(), name) {
            debug!(property = name, "deleting replaced property");
            doc.delete_property(name);
            summary.deleted.push(name.to_string());
        }
    }

    Ok(summary)
}

fn choose_name(
    candidate: &Candidate,
    table: &PropertyTable,
    settings: &PromotionConfig,
    summary: &mut PromotionSummary,
) -> Option<String> {
    let qualified = candidate.qualified_name();
    let always_qualify = candidate.kind == CandidateKind::Dependency
        && settings.qualified_groups.contains(&candidate.group);
    let preferred = if always_qualify {
        qualified.clone()
    } else {
        candidate.preferred_name()
    };

    let existing_value = match claim(table, &preferred, &candidate.version) {
        Claim::Free | Claim::Same => return Some(preferred),
        Claim::Taken(existing) => existing,
    };

    let chosen = if preferred == qualified {
        None
    } else {
        match claim(table, &qualified, &candidate.version) {
            Claim::Free | Claim::Same => Some(qualified),
            Claim::Taken(_) => None,
        }
    };

    match &chosen {
        Some(fallback) => warn!(
            coordinate = %candidate.coordinate(),
            property = %preferred,
            existing = %existing_value,
            version = %candidate.version,
            "property already bound to another version, using {fallback}"
        ),
        None => warn!(
            coordinate = %candidate.coordinate(),
            property = %preferred,
            existing = %existing_value,
            version = %candidate.version,
            "no free property name, leaving version as is"
        ),
    }

    summary.collisions.push(Collision {
        coordinate: candidate.coordinate(),
        preferred,
        existing_value,
        chosen: chosen.clone(),
    });
    chosen
}

fn collect_candidates(doc: &PomDocument, include_plugins: bool) -> Result<Vec<Candidate>> {
    let mut sources = dependency_paths()
        .into_iter()
        .map(|path| (path, CandidateKind::Dependency))
        .collect::<Vec<_>>();
    if include_plugins {
        sources.extend(
            plugin_dependency_paths()
                .into_iter()
                .map(|path| (path, CandidateKind::Dependency)),
        );
        sources.extend(
            plugin_paths()
                .into_iter()
                .map(|path| (path, CandidateKind::Plugin)),
        );
    }

    let mut candidates = Vec::new();
    for (path, kind) in sources {
        for handle in doc.select_all_handles(&path)? {
            let Some(element) = doc.get(&handle) else {
                continue;
            };
            let Some(version) = element.child_text("version").filter(|v| !v.is_empty()) else {
                continue;
            };
            let group = match (element.child_text("groupId"), kind) {
                (Some(group), _) if !group.is_empty() => group,
                (_, CandidateKind::Plugin) => DEFAULT_PLUGIN_GROUP.to_string(),
                (_, CandidateKind::Dependency) => continue,
            };
            let Some(artifact) = element.child_text("artifactId").filter(|a| !a.is_empty()) else {
                continue;
            };
            candidates.push(Candidate {
                handle,
                kind,
                group,
                artifact,
                version,
                replaced: None,
            });
        }
    }
    Ok(candidates)
}

/// True if any text or attribute in the tree still contains `${name}`
fn references_property(element: &Element, name: &str) -> bool {
    let needle = format!("${{{name}}}");
    contains_reference(element, &needle)
}

fn contains_reference(element: &Element, needle: &str) -> bool {
    element.attributes.values().any(|value| value.contains(needle))
        || element.children.iter().any(|content| match content {
            Content::Element(child) => contains_reference(child, needle),
            Content::Text(text) => text.contains(needle),
            Content::Comment(_) => false,
        })
}
