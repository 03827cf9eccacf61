//! Path expressions for addressing elements
//!
//! A small XPath subset: absolute (`/project/build/plugins/plugin`) or
//! relative (`dependencies/dependency`) location paths built from name
//! tests, the `*` wildcard, `//` descendant steps and 1-based positional
//! predicates (`dependency[2]`). Namespace prefixes in name tests are
//! ignored, so `mvn:dependency` matches `<dependency>` and `<x:dependency>`.

use std::fmt;

use crate::error::{Error, Result};
use crate::xml::Element;

/// Location of an element as child indexes from the root element
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(Vec<usize>);

impl NodeHandle {
    /// Handle of the root element
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Handle of the child stored at `index` in this element's `children`
    pub fn child(&self, index: usize) -> Self {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Self(indexes)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    pub fn resolve<'e>(&self, root: &'e Element) -> Option<&'e Element> {
        self.0
            .iter()
            .try_fold(root, |element, &index| element.element_at(index))
    }

    pub fn resolve_mut<'e>(&self, root: &'e mut Element) -> Option<&'e mut Element> {
        self.0
            .iter()
            .try_fold(root, |element, &index| element.element_at_mut(index))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum NameTest {
    Any,
    Name { prefix: Option<String>, local: String },
}

impl NameTest {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Any => true,
            Self::Name { local, .. } => element.local_name() == local,
        }
    }
}

/// One location step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    axis: Axis,
    test: NameTest,
    position: Option<usize>,
}

impl Step {
    /// Local name of a plain `name` step: child axis, no wildcard, no predicate
    pub fn simple_name(&self) -> Option<&str> {
        match (&self.axis, &self.test, self.position) {
            (Axis::Child, NameTest::Name { local, .. }, None) => Some(local),
            _ => None,
        }
    }

    fn parse(axis: Axis, source: &str, expr: &str) -> Result<Self> {
        let (name, position) = match source.split_once('[') {
            Some((name, predicate)) => {
                let index = predicate
                    .strip_suffix(']')
                    .and_then(|n| n.trim().parse::<usize>().ok())
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| Error::invalid_path(expr, "predicate must be a position >= 1"))?;
                (name, Some(index))
            }
            None => (source, None),
        };

        let test = if name == "*" {
            NameTest::Any
        } else {
            let (prefix, local) = match name.split_once(':') {
                Some((prefix, local)) => (Some(prefix.to_string()), local),
                None => (None, name),
            };
            if !is_valid_name(local) || prefix.as_deref().is_some_and(|p| !is_valid_name(p)) {
                return Err(Error::invalid_path(expr, &format!("bad name test '{name}'")));
            }
            NameTest::Name {
                prefix,
                local: local.to_string(),
            }
        };

        Ok(Self {
            axis,
            test,
            position,
        })
    }

    /// Apply this step to one context element, in document order
    fn select_from(&self, root: &Element, context: &NodeHandle, out: &mut Vec<NodeHandle>) {
        let Some(element) = context.resolve(root) else {
            return;
        };
        let mut matched = Vec::new();
        match self.axis {
            Axis::Child => {
                for (index, child) in element.children.iter().enumerate() {
                    if child.as_element().is_some_and(|c| self.test.matches(c)) {
                        matched.push(context.child(index));
                    }
                }
            }
            Axis::Descendant => collect_descendants(element, context, &self.test, &mut matched),
        }
        self.push_positioned(matched, out);
    }

    fn push_positioned(&self, matched: Vec<NodeHandle>, out: &mut Vec<NodeHandle>) {
        match self.position {
            Some(position) => out.extend(matched.into_iter().nth(position - 1)),
            None => out.extend(matched),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test {
            NameTest::Any => write!(f, "*")?,
            NameTest::Name {
                prefix: Some(prefix),
                local,
            } => write!(f, "{prefix}:{local}")?,
            NameTest::Name {
                prefix: None,
                local,
            } => write!(f, "{local}")?,
        }
        if let Some(position) = self.position {
            write!(f, "[{position}]")?;
        }
        Ok(())
    }
}

/// Parsed location path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    absolute: bool,
    steps: Vec<Step>,
}

impl Path {
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        let (absolute, mut axis, rest) = if let Some(rest) = expr.strip_prefix("//") {
            (true, Axis::Descendant, rest)
        } else if let Some(rest) = expr.strip_prefix('/') {
            (true, Axis::Child, rest)
        } else {
            (false, Axis::Child, expr)
        };

        let mut steps = Vec::new();
        for segment in rest.split('/') {
            if segment.is_empty() {
                if axis == Axis::Descendant {
                    return Err(Error::invalid_path(expr, "empty step"));
                }
                axis = Axis::Descendant;
                continue;
            }
            steps.push(Step::parse(axis, segment, expr)?);
            axis = Axis::Child;
        }

        if steps.is_empty() || axis == Axis::Descendant {
            return Err(Error::invalid_path(expr, "empty step"));
        }

        Ok(Self { absolute, steps })
    }

    pub const fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// The path without its final step, `None` for single-step paths
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.steps.split_last()?;
        if parent.is_empty() {
            return None;
        }
        Some(Self {
            absolute: self.absolute,
            steps: parent.to_vec(),
        })
    }

    /// Evaluate against a document root; relative paths start at `context`
    pub fn evaluate(&self, root: &Element, context: &NodeHandle) -> Vec<NodeHandle> {
        let mut steps = self.steps.iter();
        let mut current = if self.absolute {
            // the first absolute step is taken from the document node
            let Some(first) = steps.next() else {
                return Vec::new();
            };
            let mut matched = Vec::new();
            match first.axis {
                Axis::Child => {
                    if first.test.matches(root) {
                        matched.push(NodeHandle::root());
                    }
                }
                Axis::Descendant => {
                    if first.test.matches(root) {
                        matched.push(NodeHandle::root());
                    }
                    collect_descendants(root, &NodeHandle::root(), &first.test, &mut matched);
                }
            }
            let mut out = Vec::new();
            first.push_positioned(matched, &mut out);
            out
        } else {
            vec![context.clone()]
        };

        for step in steps {
            let mut next = Vec::new();
            for handle in &current {
                step.select_from(root, handle, &mut next);
            }
            // index paths order like the document, so sorting restores document order
            next.sort();
            next.dedup();
            current = next;
        }

        current
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, step) in self.steps.iter().enumerate() {
            let separator = match (step.axis, index == 0 && !self.absolute) {
                (Axis::Descendant, _) => "//",
                (Axis::Child, true) => "",
                (Axis::Child, false) => "/",
            };
            write!(f, "{separator}{step}")?;
        }
        Ok(())
    }
}

fn collect_descendants(
    element: &Element,
    handle: &NodeHandle,
    test: &NameTest,
    out: &mut Vec<NodeHandle>,
) {
    for (index, child) in element.children.iter().enumerate() {
        if let Some(child) = child.as_element() {
            let child_handle = handle.child(index);
            if test.matches(child) {
                out.push(child_handle.clone());
            }
            collect_descendants(child, &child_handle, test, out);
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    const POM: &str = "<project>\
        <dependencies><dependency><artifactId>a</artifactId></dependency>\
        <dependency><artifactId>b</artifactId></dependency></dependencies>\
        <build><plugins><plugin><dependencies><dependency><artifactId>c</artifactId></dependency>\
        </dependencies></plugin></plugins></build></project>";

    fn artifacts(expr: &str) -> Result<Vec<String>> {
        let doc = xml::from_str(POM)?;
        let path = Path::parse(expr)?;
        Ok(path
            .evaluate(&doc.root, &NodeHandle::root())
            .iter()
            .filter_map(|handle| handle.resolve(&doc.root))
            .map(|element| element.child_text("artifactId").unwrap_or_default())
            .collect())
    }

    #[test]
    fn test_absolute_child_steps() -> Result<()> {
        assert_eq!(artifacts("/project/dependencies/dependency")?, vec!["a", "b"]);
        assert_eq!(artifacts("/pom/dependencies/dependency")?, Vec::<String>::new());
        Ok(())
    }

    #[test]
    fn test_descendant_and_wildcard_steps() -> Result<()> {
        assert_eq!(artifacts("//dependency")?, vec!["a", "b", "c"]);
        assert_eq!(artifacts("/*/build//dependency")?, vec!["c"]);
        Ok(())
    }

    #[test]
    fn test_relative_path_and_position() -> Result<()> {
        assert_eq!(artifacts("dependencies/dependency[2]")?, vec!["b"]);
        assert_eq!(artifacts("mvn:dependencies/mvn:dependency[1]")?, vec!["a"]);
        Ok(())
    }

    #[test]
    fn test_invalid_paths() {
        for expr in ["", "/", "a//", "a///b", "a[0]", "a[x]", "a/ b"] {
            assert!(Path::parse(expr).is_err(), "{expr} should be rejected");
        }
    }

    #[test]
    fn test_display_and_parent() -> Result<()> {
        let path = Path::parse("/project//plugin[2]/version")?;
        assert_eq!(path.to_string(), "/project//plugin[2]/version");
        assert_eq!(
            path.parent().map(|p| p.to_string()).as_deref(),
            Some("/project//plugin[2]")
        );
        assert_eq!(path.last_step().and_then(Step::simple_name), Some("version"));
        assert!(Path::parse("dependencies")?.parent().is_none());
        Ok(())
    }
}
