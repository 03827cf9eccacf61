//! Path-based access to a POM document

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{Error, Result};
use crate::path::{NodeHandle, Path};
use crate::xml::{self, Content, Document, Element, Layout};

/// Property name to value, as declared in `<properties>`
pub type PropertyTable = BTreeMap<String, String>;

/// Nesting bound for placeholder values that themselves contain placeholders
const MAX_RESOLVE_DEPTH: usize = 32;

/// Resolved text may grow to this multiple of the document's property text
/// plus the input; placeholders that would exceed it stay verbatim
const MAX_EXPANSION_FACTOR: usize = 16;

/// Lower bound on the expansion limit so short inputs can take long values
const MIN_EXPANSION_LIMIT: usize = 4096;

/// Sections that `<properties>` is placed in front of when it has to be created
const PROPERTIES_SUCCESSORS: &[&str] = &[
    "dependencyManagement",
    "dependencies",
    "repositories",
    "pluginRepositories",
    "build",
    "reporting",
    "profiles",
];

/// A parsed POM together with query and mutation helpers
#[derive(Clone, Debug, PartialEq)]
pub struct PomDocument {
    doc: Document,
}

impl PomDocument {
    pub fn parse(input: &str) -> Result<Self> {
        xml::from_str(input).map(Self::new)
    }

    pub const fn new(doc: Document) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn root(&self) -> &Element {
        &self.doc.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.doc.root
    }

    pub fn write(&self, layout: Layout) -> String {
        xml::write_document(&self.doc, layout)
    }

    pub fn get(&self, handle: &NodeHandle) -> Option<&Element> {
        handle.resolve(&self.doc.root)
    }

    pub fn get_mut(&mut self, handle: &NodeHandle) -> Option<&mut Element> {
        handle.resolve_mut(&mut self.doc.root)
    }

    /// Handles of every match in document order; relative paths start at the root element
    pub fn select_all_handles(&self, path: &str) -> Result<Vec<NodeHandle>> {
        let path = Path::parse(path)?;
        Ok(path.evaluate(&self.doc.root, &NodeHandle::root()))
    }

    pub fn select_handle(&self, path: &str) -> Result<Option<NodeHandle>> {
        Ok(self.select_all_handles(path)?.into_iter().next())
    }

    /// Evaluate a relative path from `context`
    pub fn select_all_from(&self, context: &NodeHandle, path: &str) -> Result<Vec<NodeHandle>> {
        let path = Path::parse(path)?;
        Ok(path.evaluate(&self.doc.root, context))
    }

    pub fn select_all(&self, path: &str) -> Result<Vec<&Element>> {
        Ok(self
            .select_all_handles(path)?
            .iter()
            .filter_map(|handle| self.get(handle))
            .collect())
    }

    pub fn select(&self, path: &str) -> Result<Option<&Element>> {
        Ok(self
            .select_handle(path)?
            .and_then(|handle| self.get(&handle)))
    }

    /// Return the first match for `path`, creating missing elements along the way.
    ///
    /// New elements take the namespace prefix of their parent. The final step
    /// must be a plain element name.
    pub fn select_or_create(&mut self, path: &str) -> Result<NodeHandle> {
        let parsed = Path::parse(path)?;
        self.select_or_create_path(&parsed, path)
    }

    fn select_or_create_path(&mut self, path: &Path, expr: &str) -> Result<NodeHandle> {
        if let Some(handle) = path
            .evaluate(&self.doc.root, &NodeHandle::root())
            .into_iter()
            .next()
        {
            return Ok(handle);
        }

        let name = path
            .last_step()
            .and_then(|step| step.simple_name())
            .ok_or_else(|| Error::invalid_path(expr, "final step is not an element name"))?
            .to_string();

        let parent = match path.parent() {
            Some(parent) => self.select_or_create_path(&parent, expr)?,
            None if path.is_absolute() => {
                return Err(Error::invalid_path(
                    expr,
                    "root element does not match and cannot be created",
                ));
            }
            None => NodeHandle::root(),
        };

        let element = self
            .get_mut(&parent)
            .ok_or_else(|| Error::invalid_path(expr, "parent element disappeared"))?;
        let child = Element::new(element.qualified(&name));
        trace!(element = %child.name, "creating element");
        let index = element.push_element(child);
        Ok(parent.child(index))
    }

    /// Current `<properties>` content; the first declaration of a name wins
    pub fn properties(&self) -> PropertyTable {
        let mut table = PropertyTable::new();
        if let Some(properties) = self.doc.root.child("properties") {
            for property in properties.elements() {
                table
                    .entry(property.local_name().to_string())
                    .or_insert_with(|| property.text());
            }
        }
        table
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.doc
            .root
            .child("properties")
            .and_then(|properties| properties.child(name))
            .is_some()
    }

    /// Value of a property exactly as stored, empty when it is not declared
    pub fn get_property(&self, name: &str) -> String {
        self.doc
            .root
            .child("properties")
            .and_then(|properties| properties.child(name))
            .map(Element::text)
            .unwrap_or_default()
    }

    /// Set a property, creating `<properties>` and the property element as needed
    pub fn set_property(&mut self, name: &str, value: &str) {
        let root = &mut self.doc.root;
        if let Some(properties) = root.child_mut("properties") {
            match properties.child_mut(name) {
                Some(property) => property.set_text(value),
                None => {
                    let property = Element::with_text(properties.qualified(name), value);
                    properties.push_element(property);
                }
            }
            return;
        }

        let mut properties = Element::new(root.qualified("properties"));
        let property = Element::with_text(properties.qualified(name), value);
        properties.push_element(property);
        let index = root
            .children
            .iter()
            .position(|content| {
                content
                    .as_element()
                    .is_some_and(|element| PROPERTIES_SUCCESSORS.contains(&element.local_name()))
            })
            .unwrap_or(root.children.len());
        trace!(index, "creating properties section");
        root.children.insert(index, Content::Element(properties));
    }

    /// Remove a property; absent properties are ignored
    pub fn delete_property(&mut self, name: &str) {
        if let Some(properties) = self.doc.root.child_mut("properties") {
            properties.remove_children(name);
        }
    }

    /// Substitute `${name}` placeholders using properties, `project.*` paths
    /// and the process environment
    pub fn resolve_properties(&self, input: &str) -> String {
        self.resolve_properties_with(input, |name| std::env::var(name).ok())
    }

    /// Like [`Self::resolve_properties`] with a custom last-resort lookup
    pub fn resolve_properties_with<F>(&self, input: &str, fallback: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let table = self.properties();
        let source_len = input.len()
            + table
                .iter()
                .map(|(name, value)| name.len() + value.len())
                .sum::<usize>();
        let mut resolver = Resolver {
            doc: self,
            table,
            fallback,
            expanded: BTreeMap::new(),
            active: Vec::new(),
            limit: source_len
                .saturating_mul(MAX_EXPANSION_FACTOR)
                .max(MIN_EXPANSION_LIMIT),
        };
        resolver.substitute(input)
    }

    /// `project.a.b` resolves to the text of `/project/a/b`
    fn project_value(&self, name: &str) -> Option<String> {
        let rest = name.strip_prefix("project.")?;
        rest.split('.')
            .try_fold(&self.doc.root, |element, segment| element.child(segment))
            .map(|element| element.text().trim().to_string())
    }
}

/// State for one `${...}` expansion. Each name is expanded at most once;
/// a reference back into a name still being expanded stays verbatim.
struct Resolver<'d, F> {
    doc: &'d PomDocument,
    table: PropertyTable,
    fallback: F,
    expanded: BTreeMap<String, Option<String>>,
    active: Vec<String>,
    limit: usize,
}

impl<F> Resolver<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn substitute(&mut self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        let mut rest = input;

        while let Some((before, after)) = rest.split_once("${") {
            output.push_str(before);
            let Some((name, tail)) = after.split_once('}') else {
                // unterminated placeholder: keep the remainder as is
                output.push_str("${");
                output.push_str(after);
                return output;
            };

            match self.expand(name) {
                Some(value) if output.len() + value.len() <= self.limit => {
                    output.push_str(&value);
                }
                _ => {
                    output.push_str("${");
                    output.push_str(name);
                    output.push('}');
                }
            }
            rest = tail;
        }

        output.push_str(rest);
        output
    }

    /// Fully substituted value of `name`, `None` when it stays a placeholder
    fn expand(&mut self, name: &str) -> Option<String> {
        if let Some(done) = self.expanded.get(name) {
            return done.clone();
        }
        if self.active.len() >= MAX_RESOLVE_DEPTH || self.active.iter().any(|open| open == name) {
            return None;
        }

        let value = self.lookup(name).map(|raw| {
            if raw.contains("${") {
                self.active.push(name.to_string());
                let value = self.substitute(&raw);
                self.active.pop();
                value
            } else {
                raw
            }
        });
        self.expanded.insert(name.to_string(), value.clone());
        value
    }

    fn lookup(&self, name: &str) -> Option<String> {
        let value = self
            .table
            .get(name)
            .cloned()
            .or_else(|| self.doc.project_value(name))
            .or_else(|| (self.fallback)(name))?;
        (!value.is_empty()).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = "<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\
        <groupId>org.example</groupId><version>1.2</version>\
        <properties><junit.version>4.10</junit.version><alias>${junit.version}</alias></properties>\
        <dependencies/></project>";

    #[test]
    fn test_select_single_and_all() -> Result<()> {
        let doc = PomDocument::parse(POM)?;
        assert_eq!(
            doc.select("/project/groupId")?.map(Element::text).as_deref(),
            Some("org.example")
        );
        assert_eq!(doc.select_all("properties/*")?.len(), 2);
        assert!(doc.select("/project/parent")?.is_none());
        Ok(())
    }

    #[test]
    fn test_select_or_create_builds_missing_parents() -> Result<()> {
        let mut doc = PomDocument::parse("<m:project><m:build/></m:project>")?;
        let handle = doc.select_or_create("/project/build/pluginManagement/plugins")?;
        assert_eq!(doc.get(&handle).map(|e| e.name.as_str()), Some("m:plugins"));
        let again = doc.select_or_create("/project/build/pluginManagement/plugins")?;
        assert_eq!(handle, again);
        Ok(())
    }

    #[test]
    fn test_select_or_create_rejects_non_name_steps() -> Result<()> {
        let mut doc = PomDocument::parse("<project/>")?;
        for expr in ["/project/build/*", "/project//plugin", "/project/modules/module[2]", "/pom"] {
            let err = doc.select_or_create(expr).err();
            assert!(
                matches!(err.as_ref().map(Error::kind), Some(crate::ErrorKind::InvalidPath { .. })),
                "{expr}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_properties_section_is_created_before_dependencies() -> Result<()> {
        let mut doc =
            PomDocument::parse("<project><artifactId>a</artifactId><dependencies/></project>")?;
        doc.set_property("x.version", "1");
        let names: Vec<&str> = doc.root().elements().map(Element::local_name).collect();
        assert_eq!(names, vec!["artifactId", "properties", "dependencies"]);
        assert_eq!(doc.get_property("x.version"), "1");
        Ok(())
    }

    #[test]
    fn test_resolve_nested_and_project_values() -> Result<()> {
        let doc = PomDocument::parse(POM)?;
        let none = |_: &str| -> Option<String> { None };
        assert_eq!(doc.resolve_properties_with("v${alias}!", none), "v4.10!");
        assert_eq!(doc.resolve_properties_with("${project.version}", none), "1.2");
        assert_eq!(doc.resolve_properties_with("${missing} ok", none), "${missing} ok");
        assert_eq!(doc.resolve_properties_with("a ${junit.version", none), "a ${junit.version");
        Ok(())
    }

    #[test]
    fn test_resolve_self_reference_terminates() -> Result<()> {
        let doc = PomDocument::parse("<project><properties><a>${a}</a></properties></project>")?;
        assert_eq!(doc.resolve_properties_with("${a}", |_| None), "${a}");
        Ok(())
    }

    #[test]
    fn test_resolve_cycles_stay_verbatim() -> Result<()> {
        let doc = PomDocument::parse(
            "<project><properties><a>${b}</a><b>x${a}</b><c>${c}${c}</c></properties></project>",
        )?;
        let none = |_: &str| -> Option<String> { None };
        assert_eq!(doc.resolve_properties_with("${a}", none), "x${a}");
        assert_eq!(doc.resolve_properties_with("${c}", none), "${c}${c}");
        Ok(())
    }

    #[test]
    fn test_resolve_doubling_chain_is_capped() -> Result<()> {
        // every level doubles the text, so the last one would be gigabytes long
        let mut properties = String::new();
        for level in 0..40 {
            let next = level + 1;
            properties.push_str(&format!("<p{level}>${{p{next}}}${{p{next}}}</p{level}>"));
        }
        properties.push_str("<p40>x</p40>");
        let doc = PomDocument::parse(&format!(
            "<project><properties>{properties}</properties></project>"
        ))?;

        let resolved = doc.resolve_properties_with("${p0}", |_| None);
        assert!(resolved.len() <= 16 * 4096);
        assert_eq!(doc.resolve_properties_with("${p38}", |_| None), "xxxx");
        Ok(())
    }

    #[test]
    fn test_property_whitespace_is_kept() -> Result<()> {
        let mut doc =
            PomDocument::parse("<project><properties><p> 1.0 </p></properties></project>")?;
        assert_eq!(doc.get_property("p"), " 1.0 ");
        assert_eq!(doc.properties().get("p").map(String::as_str), Some(" 1.0 "));

        doc.set_property("q", "  spaced  value ");
        assert_eq!(doc.get_property("q"), "  spaced  value ");
        let reparsed = PomDocument::parse(&doc.write(Layout::default()))?;
        assert_eq!(reparsed.get_property("q"), "  spaced  value ");
        Ok(())
    }

    #[test]
    fn test_set_property_always_lands() -> Result<()> {
        let mut doc = PomDocument::parse("<m:project><m:artifactId>a</m:artifactId></m:project>")?;
        doc.set_property("x.version", "1");
        doc.set_property("x.version", "2");
        doc.set_property("y.version", "3");
        assert_eq!(
            doc.write(Layout::Compact),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><m:project><m:artifactId>a</m:artifactId>\
             <m:properties><m:x.version>2</m:x.version><m:y.version>3</m:y.version></m:properties></m:project>"
        );
        Ok(())
    }
}
