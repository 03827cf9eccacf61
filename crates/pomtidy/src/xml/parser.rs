//! XML parser implementation

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Pos, Result};
use crate::xml::cursor::Cursor;
use crate::xml::model::{Content, Document, Element};

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        // UTF-8 byte order mark
        self.cursor.consume(&[0xEF, 0xBB, 0xBF]);

        let mut prolog = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.is_eof() {
                return Err(self.error_kind(ErrorKind::UnexpectedEof));
            }
            if self.cursor.consume(b"<?") {
                self.skip_until(b"?>")?;
            } else if self.cursor.consume(b"<!--") {
                prolog.push(self.read_until(b"-->")?);
            } else if self.cursor.consume(b"<!") {
                self.skip_doctype()?;
            } else {
                break;
            }
        }

        let root = self.parse_element()?;

        let mut epilog = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.is_eof() {
                break;
            }
            if self.cursor.consume(b"<?") {
                self.skip_until(b"?>")?;
            } else if self.cursor.consume(b"<!--") {
                epilog.push(self.read_until(b"-->")?);
            } else {
                return Err(self.error_kind(ErrorKind::TrailingContent));
            }
        }

        Ok(Document {
            prolog,
            root,
            epilog,
        })
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;

        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here("unexpected closing tag"));
        }

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.consume(b"/") {
            self.expect_byte(b'>')?;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect_byte(b'>')?;

        let mut children = Vec::new();
        loop {
            if self.cursor.is_eof() {
                return Err(self.error_kind(ErrorKind::UnexpectedEof));
            }

            if self.cursor.consume(b"</") {
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(self.error_kind(ErrorKind::MismatchedTag {
                        expected: name,
                        found: close_name,
                    }));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.consume(b"<!--") {
                children.push(Content::Comment(self.read_until(b"-->")?));
                continue;
            }

            if self.cursor.consume(b"<![CDATA[") {
                let text = self.read_until(b"]]>")?;
                if !text.is_empty() {
                    children.push(Content::Text(text));
                }
                continue;
            }

            if self.cursor.consume(b"<?") {
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                children.push(Content::Element(child));
                continue;
            }

            if let Some(text) = self.parse_text()? {
                children.push(Content::Text(text));
            }
        }

        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => break,
                Some(_) => {}
                None => return Err(self.error_kind(ErrorKind::UnexpectedEof)),
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error_kind(ErrorKind::DuplicateAttribute { name }));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let start = self.cursor.position();
        let raw = self.cursor.take_while(|b| b != quote);
        if !self.cursor.consume(&[quote]) {
            return Err(self.error_kind(ErrorKind::UnexpectedEof));
        }
        decode_entities(&bytes_to_string(raw, start)?, start)
    }

    /// Character data up to the next markup; whitespace-only runs are dropped
    fn parse_text(&mut self) -> Result<Option<String>> {
        let start = self.cursor.position();
        let raw = self.cursor.take_while(|b| b != b'<');
        let text = decode_entities(&bytes_to_string(raw, start)?, start)?;
        Ok((!text.trim().is_empty()).then_some(text))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.position();
        match self.cursor.current() {
            Some(first) if is_name_start(first) => {}
            Some(_) => return Err(Error::at(ErrorKind::InvalidToken, start)),
            None => return Err(self.error_kind(ErrorKind::UnexpectedEof)),
        }
        let raw = self.cursor.take_while(is_name_char);
        bytes_to_string(raw, start)
    }

    /// Skip a `<!DOCTYPE ...>` declaration, including an internal subset
    fn skip_doctype(&mut self) -> Result<()> {
        let mut depth = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_kind(ErrorKind::UnexpectedEof))
    }

    fn skip_until(&mut self, terminator: &[u8]) -> Result<()> {
        self.read_raw_until(terminator).map(|_| ())
    }

    /// Text up to `terminator`, consuming the terminator
    fn read_until(&mut self, terminator: &[u8]) -> Result<String> {
        let start = self.cursor.position();
        let raw = self.read_raw_until(terminator)?;
        bytes_to_string(raw, start)
    }

    fn read_raw_until(&mut self, terminator: &[u8]) -> Result<&'a [u8]> {
        self.cursor
            .take_until(terminator)
            .ok_or_else(|| self.error_here("unterminated markup"))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.cursor.current() {
            Some(b) if b == expected => {
                self.cursor.advance();
                Ok(())
            }
            Some(_) => Err(self.error_here("unexpected token")),
            None => Err(self.error_kind(ErrorKind::UnexpectedEof)),
        }
    }

    fn error_kind(&self, kind: ErrorKind) -> Error {
        Error::at(kind, self.cursor.position())
    }

    fn error_here(&self, message: &str) -> Error {
        Error::syntax(self.cursor.position(), message)
    }
}

fn bytes_to_string(bytes: &[u8], pos: Pos) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(ToString::to_string)
        .map_err(|_| Error::at(ErrorKind::InvalidUtf8, pos))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str, pos: Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = if terminated {
            match entity.as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric_entity(&entity),
            }
        } else {
            None
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => return Err(Error::at(ErrorKind::InvalidEntity { entity }, pos)),
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
