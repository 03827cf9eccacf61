//! XML data model

use indexmap::IndexMap;

/// XML document: the root element plus the comments around it
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub prolog: Vec<String>,
    pub root: Element,
    pub epilog: Vec<String>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }
}

/// XML element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Content {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Element holding a single text node
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.set_text(text);
        element
    }

    /// Namespace prefix of the element name, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Element name without its namespace prefix
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Qualify `local` with this element's prefix
    pub fn qualified(&self, local: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Content::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Self> {
        self.children.iter_mut().filter_map(Content::as_element_mut)
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&Self> {
        self.elements().find(|child| child.local_name() == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Self> {
        self.elements_mut().find(|child| child.local_name() == local)
    }

    /// Trimmed text of the first child with the given local name
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.child(local).map(|child| child.text().trim().to_string())
    }

    /// Concatenated text content of this element's direct text nodes
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|content| match content {
                Content::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Content::Text(text));
        }
    }

    /// Append a child element, returning its index in `children`
    pub fn push_element(&mut self, child: Self) -> usize {
        self.children.push(Content::Element(child));
        self.children.len() - 1
    }

    /// Remove every child element with the given local name
    pub fn remove_children(&mut self, local: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|content| match content {
            Content::Element(child) => child.local_name() != local,
            _ => true,
        });
        before - self.children.len()
    }

    /// Index in `children` of the first child element with the given local name
    pub fn position_of(&self, local: &str) -> Option<usize> {
        self.children.iter().position(|content| {
            content
                .as_element()
                .is_some_and(|child| child.local_name() == local)
        })
    }

    /// Child element stored at `index` in `children`
    pub fn element_at(&self, index: usize) -> Option<&Self> {
        self.children.get(index).and_then(Content::as_element)
    }

    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Self> {
        self.children.get_mut(index).and_then(Content::as_element_mut)
    }
}
