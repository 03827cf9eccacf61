//! Artifact coordinates

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::xml::Element;

pub const DEFAULT_PACKAGING: &str = "jar";
pub const DEFAULT_SCOPE: &str = "compile";

/// Sort rank of each known scope; anything else ranks after `system`
const SCOPE_RANKS: &[(&str, u8)] = &[
    ("compile", 0),
    ("test", 1),
    ("runtime", 2),
    ("provided", 3),
    ("system", 4),
];

/// Rank of a scope when grouping dependencies by scope
pub fn scope_rank(scope: &str) -> u8 {
    SCOPE_RANKS
        .iter()
        .find(|(name, _)| *name == scope)
        .map_or(5, |(_, rank)| *rank)
}

/// Group, artifact and version, ordered lexicographically in that order
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gav {
    group: String,
    artifact: String,
    version: String,
}

impl Gav {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Read `groupId`, `artifactId` and `version` children; missing ones are empty
    pub fn from_element(element: &Element) -> Self {
        Self::new(
            element.child_text("groupId").unwrap_or_default(),
            element.child_text("artifactId").unwrap_or_default(),
            element.child_text("version").unwrap_or_default(),
        )
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// A [`Gav`] with scope, packaging and classifier.
///
/// Equality, hashing and the natural ordering only look at the GAV.
#[derive(Clone, Debug)]
pub struct Artifact {
    gav: Gav,
    scope: String,
    packaging: String,
    classifier: Option<String>,
}

impl Artifact {
    pub fn new(gav: Gav) -> Self {
        Self {
            gav,
            scope: DEFAULT_SCOPE.to_string(),
            packaging: DEFAULT_PACKAGING.to_string(),
            classifier: None,
        }
    }

    /// Blank values fall back to the defaults
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = non_blank(scope).unwrap_or(DEFAULT_SCOPE).to_string();
        self
    }

    pub fn with_packaging(mut self, packaging: &str) -> Self {
        self.packaging = non_blank(packaging)
            .unwrap_or(DEFAULT_PACKAGING)
            .to_string();
        self
    }

    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = non_blank(classifier).map(ToString::to_string);
        self
    }

    /// Scan a `<dependency>` or `<plugin>` element
    pub fn from_element(element: &Element) -> Self {
        let text = |name: &str| element.child_text(name).unwrap_or_default();
        Self::new(Gav::from_element(element))
            .with_scope(&text("scope"))
            .with_packaging(&text("type"))
            .with_classifier(&text("classifier"))
    }

    pub fn gav(&self) -> &Gav {
        &self.gav
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Order by scope rank first, then by GAV
    pub fn cmp_scoped(&self, other: &Self) -> Ordering {
        scope_rank(&self.scope)
            .cmp(&scope_rank(&other.scope))
            .then_with(|| self.gav.cmp(&other.gav))
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.gav == other.gav
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.gav.hash(state);
    }
}

impl PartialOrd for Artifact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Artifact {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gav.cmp(&other.gav)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.gav, self.packaging, self.scope)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}
