//! codec::parser
//!
//! Recursive-descent reader for the canonical document vocabulary.
//!
//! The grammar is deliberately tiny: one root element (`Model` or
//! `Records`), a fixed set of child elements, double-quoted attributes,
//! and text content only inside a record's property elements. Anything
//! outside that vocabulary (declarations, comments, unknown attributes,
//! stray text) is a parse error with line/column context. Element
//! *order* is not enforced; serialization canonicalizes it on the next
//! save.

use super::escape::unescape;
use super::CodecError;
use crate::core::instance::{Bucket, Record};
use crate::core::model::{Entity, Model, Property, Relationship, DEFAULT_DATA_TYPE};

/// Parse a canonical schema document.
pub fn parse_model(input: &str) -> Result<Model, CodecError> {
    let mut scanner = Scanner::new(input);
    let root = scanner.parse_element()?;
    scanner.expect_eof()?;

    root.expect_name("Model")?;
    root.expect_no_text()?;
    let name = root.required_attr("Name")?;
    root.allow_attrs(&["Name"])?;

    let mut model = Model::new(name);
    for child in &root.children {
        child.expect_no_text()?;
        child.expect_name("Entity")?;
        model.insert_entity(parse_entity(child)?);
    }
    Ok(model)
}

fn parse_entity(element: &Element) -> Result<Entity, CodecError> {
    let mut entity = Entity::new(element.required_attr("Name")?);
    element.allow_attrs(&["Name", "Plural"])?;
    entity.plural = element.attr("Plural");

    for child in &element.children {
        child.expect_no_text()?;
        child.expect_no_children()?;
        match child.name.as_str() {
            "Property" => {
                child.allow_attrs(&["Name", "Type", "Nullable"])?;
                entity.properties.push(Property {
                    name: child.required_attr("Name")?,
                    data_type: child
                        .attr("Type")
                        .unwrap_or_else(|| DEFAULT_DATA_TYPE.to_string()),
                    nullable: child.bool_attr("Nullable")?,
                });
            }
            "Relationship" => {
                child.allow_attrs(&["Target", "Role", "Column"])?;
                entity.relationships.push(Relationship {
                    target: child.required_attr("Target")?,
                    role: child.attr("Role"),
                    column: child.attr("Column"),
                });
            }
            other => {
                return Err(child.error(format!(
                    "unexpected element '{}' inside Entity",
                    other
                )))
            }
        }
    }
    Ok(entity)
}

/// Parse a canonical data shard for one entity.
///
/// Records are returned in document order; link columns are whatever
/// attributes appear on each row besides `Id`. Resolution against the
/// schema happens at validation and serialization time.
pub fn parse_shard(input: &str) -> Result<Bucket, CodecError> {
    let mut scanner = Scanner::new(input);
    let root = scanner.parse_element()?;
    scanner.expect_eof()?;

    root.expect_name("Records")?;
    root.expect_no_text()?;
    let entity = root.required_attr("Entity")?;
    root.allow_attrs(&["Entity"])?;

    let mut records = Vec::new();
    for child in &root.children {
        child.expect_no_text()?;
        child.expect_name("Record")?;
        records.push(parse_record(child)?);
    }
    Ok(Bucket { entity, records })
}

fn parse_record(element: &Element) -> Result<Record, CodecError> {
    let mut record = Record::new(element.required_attr("Id")?);
    for (name, value) in &element.attrs {
        if name == "Id" {
            continue;
        }
        record.links.insert(name.clone(), value.clone());
    }

    for child in &element.children {
        child.expect_no_children()?;
        child.allow_attrs(&[])?;
        let value = child.leaf_text().unwrap_or_default().to_string();
        if record.values.insert(child.name.clone(), value).is_some() {
            return Err(child.error(format!(
                "duplicate property element '{}' on record '{}'",
                child.name, record.id
            )));
        }
    }
    Ok(record)
}

/// A parsed element: name, attributes in document order, child elements,
/// and optional text content (mutually exclusive with children).
#[derive(Debug)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
    text: Option<String>,
    /// Whitespace-only content run. For a childless element this is its
    /// value; between child elements it is formatting.
    pad: Option<String>,
    line: usize,
    column: usize,
}

impl Element {
    fn error(&self, message: impl Into<String>) -> CodecError {
        CodecError::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn expect_name(&self, expected: &str) -> Result<(), CodecError> {
        if self.name != expected {
            return Err(self.error(format!(
                "expected element '{}', found '{}'",
                expected, self.name
            )));
        }
        Ok(())
    }

    /// Text content of a leaf value element. A childless element whose
    /// only content is whitespace keeps that whitespace as its value, so
    /// values like a single space survive a round-trip.
    fn leaf_text(&self) -> Option<&str> {
        if self.text.is_some() {
            return self.text.as_deref();
        }
        if self.children.is_empty() {
            return self.pad.as_deref();
        }
        None
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn required_attr(&self, name: &str) -> Result<String, CodecError> {
        self.attr(name)
            .ok_or_else(|| self.error(format!("element '{}' requires attribute '{}'", self.name, name)))
    }

    fn bool_attr(&self, name: &str) -> Result<bool, CodecError> {
        match self.attr(name).as_deref() {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(other) => Err(self.error(format!(
                "attribute '{}' must be 'true' or 'false', found '{}'",
                name, other
            ))),
        }
    }

    fn allow_attrs(&self, allowed: &[&str]) -> Result<(), CodecError> {
        for (name, _) in &self.attrs {
            if !allowed.contains(&name.as_str()) {
                return Err(self.error(format!(
                    "unexpected attribute '{}' on element '{}'",
                    name, self.name
                )));
            }
        }
        Ok(())
    }

    fn expect_no_text(&self) -> Result<(), CodecError> {
        if self.text.is_some() {
            return Err(self.error(format!(
                "element '{}' must not contain text",
                self.name
            )));
        }
        Ok(())
    }

    fn expect_no_children(&self) -> Result<(), CodecError> {
        if !self.children.is_empty() {
            return Err(self.error(format!(
                "element '{}' must not contain child elements",
                self.name
            )));
        }
        Ok(())
    }
}

struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> CodecError {
        CodecError::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn eat(&mut self, expected: u8) -> Result<(), CodecError> {
        match self.peek() {
            Some(b) if b == expected => {
                self.bump();
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}', found '{}'",
                expected as char, b as char
            ))),
            None => Err(self.error(format!(
                "expected '{}', found end of input",
                expected as char
            ))),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.bump();
        }
    }

    fn expect_eof(&mut self) -> Result<(), CodecError> {
        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(self.error("unexpected content after document root"));
        }
        Ok(())
    }

    fn parse_name(&mut self) -> Result<String, CodecError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        // Names are identifier-shaped by construction of the byte set;
        // a leading digit is still rejected here.
        let name = std::str::from_utf8(&self.input[start..self.pos])
            .expect("name bytes are ASCII")
            .to_string();
        if name.as_bytes()[0].is_ascii_digit() {
            return Err(self.error(format!("name '{}' must not start with a digit", name)));
        }
        Ok(name)
    }

    /// Parse one element, including its children, assuming the scanner
    /// is positioned at or before its `<`.
    fn parse_element(&mut self) -> Result<Element, CodecError> {
        self.skip_whitespace();
        let (line, column) = (self.line, self.column);
        self.eat(b'<')?;
        if matches!(self.peek(), Some(b'!' | b'?')) {
            return Err(self.error("declarations and comments are not supported"));
        }
        let name = self.parse_name()?;
        let attrs = self.parse_attributes()?;

        self.skip_whitespace();
        if self.peek() == Some(b'/') {
            self.bump();
            self.eat(b'>')?;
            return Ok(Element {
                name,
                attrs,
                children: Vec::new(),
                text: None,
                pad: None,
                line,
                column,
            });
        }
        self.eat(b'>')?;

        let (children, text, pad) = self.parse_content(&name)?;
        Ok(Element {
            name,
            attrs,
            children,
            text,
            pad,
            line,
            column,
        })
    }

    fn parse_attributes(&mut self) -> Result<Vec<(String, String)>, CodecError> {
        let mut attrs: Vec<(String, String)> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'/') | Some(b'>') => return Ok(attrs),
                Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
                _ => return Err(self.error("expected attribute name or end of tag")),
            }
            let name = self.parse_name()?;
            if attrs.iter().any(|(k, _)| *k == name) {
                return Err(self.error(format!("duplicate attribute '{}'", name)));
            }
            self.eat(b'=')?;
            self.eat(b'"')?;
            let (line, column) = (self.line, self.column);
            let start = self.pos;
            while !matches!(self.peek(), Some(b'"') | None) {
                if self.peek() == Some(b'<') {
                    return Err(self.error("raw '<' in attribute value"));
                }
                self.bump();
            }
            let raw = std::str::from_utf8(&self.input[start..self.pos])
                .map_err(|_| self.error("attribute value is not valid UTF-8"))?
                .to_string();
            self.eat(b'"')?;
            attrs.push((name, unescape(&raw, line, column)?));
        }
    }

    /// Parse element content up to and including the matching close tag.
    ///
    /// Content is either child elements separated by whitespace, or a
    /// single run of text; mixing the two is an error.
    fn parse_content(
        &mut self,
        open_name: &str,
    ) -> Result<(Vec<Element>, Option<String>, Option<String>), CodecError> {
        let mut children = Vec::new();
        let mut text: Option<String> = None;
        let mut pad: Option<String> = None;

        loop {
            // Text run boundaries: from here to the next '<'.
            let (line, column) = (self.line, self.column);
            let start = self.pos;
            while !matches!(self.peek(), Some(b'<') | None) {
                self.bump();
            }
            if self.peek().is_none() {
                return Err(self.error(format!("element '{}' is not closed", open_name)));
            }
            let raw = std::str::from_utf8(&self.input[start..self.pos])
                .map_err(|_| self.error("text content is not valid UTF-8"))?;
            if raw.trim().is_empty() {
                if !raw.is_empty() && pad.is_none() {
                    pad = Some(raw.to_string());
                }
            } else {
                if !children.is_empty() || text.is_some() {
                    return Err(self.error(format!(
                        "element '{}' mixes text and child elements",
                        open_name
                    )));
                }
                text = Some(unescape(raw, line, column)?);
            }

            // Either a close tag or a child element.
            if self.input.get(self.pos + 1) == Some(&b'/') {
                self.eat(b'<')?;
                self.eat(b'/')?;
                let close = self.parse_name()?;
                if close != open_name {
                    return Err(self.error(format!(
                        "mismatched close tag: expected '</{}>', found '</{}>'",
                        open_name, close
                    )));
                }
                self.eat(b'>')?;
                return Ok((children, text, pad));
            }
            if text.is_some() {
                return Err(self.error(format!(
                    "element '{}' mixes text and child elements",
                    open_name
                )));
            }
            children.push(self.parse_element()?);
        }
    }
}
