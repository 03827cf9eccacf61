//! XML serialization

use crate::xml::model::{Content, Document, Element};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Output layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// No inserted whitespace
    Compact,
    /// One element per line, `indent` spaces per nesting level
    Pretty { indent: usize },
}

impl Default for Layout {
    fn default() -> Self {
        Self::Pretty { indent: 4 }
    }
}

/// Serialize a document, always as UTF-8 with an XML declaration
pub fn write_document(doc: &Document, layout: Layout) -> String {
    let mut writer = Writer {
        output: String::new(),
        layout,
    };
    writer.output.push_str(DECLARATION);
    writer.newline();
    for comment in &doc.prolog {
        writer.comment(comment, 0);
        writer.newline();
    }
    writer.element(&doc.root, 0);
    writer.newline();
    for comment in &doc.epilog {
        writer.comment(comment, 0);
        writer.newline();
    }
    writer.output
}

struct Writer {
    output: String,
    layout: Layout,
}

impl Writer {
    fn newline(&mut self) {
        if matches!(self.layout, Layout::Pretty { .. }) {
            self.output.push('\n');
        }
    }

    fn indent(&mut self, depth: usize) {
        if let Layout::Pretty { indent } = self.layout {
            self.output.push_str(&" ".repeat(indent * depth));
        }
    }

    fn comment(&mut self, text: &str, depth: usize) {
        self.indent(depth);
        self.output.push_str("<!--");
        self.output.push_str(text);
        self.output.push_str("-->");
    }

    fn element(&mut self, element: &Element, depth: usize) {
        self.indent(depth);
        self.output.push('<');
        self.output.push_str(&element.name);

        for (key, value) in &element.attributes {
            self.output.push(' ');
            self.output.push_str(key);
            self.output.push_str("=\"");
            self.output.push_str(&escape_attribute(value));
            self.output.push('"');
        }

        if element.children.is_empty() {
            self.output.push_str("/>");
            return;
        }

        self.output.push('>');

        let text_only = element
            .children
            .iter()
            .all(|child| matches!(child, Content::Text(_)));

        if text_only || self.layout == Layout::Compact {
            for child in &element.children {
                match child {
                    Content::Element(child) => self.element(child, 0),
                    Content::Text(text) => self.output.push_str(&escape_text(text)),
                    Content::Comment(text) => self.comment(text, 0),
                }
            }
        } else {
            for child in &element.children {
                self.newline();
                match child {
                    Content::Element(child) => self.element(child, depth + 1),
                    Content::Text(text) => {
                        // surrounding whitespace in mixed content is layout
                        self.indent(depth + 1);
                        self.output.push_str(&escape_text(text.trim()));
                    }
                    Content::Comment(text) => self.comment(text, depth + 1),
                }
            }
            self.newline();
            self.indent(depth);
        }

        self.output.push_str("</");
        self.output.push_str(&element.name);
        self.output.push('>');
    }
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}
