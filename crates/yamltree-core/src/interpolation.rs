//! Template substitution for string scalars and path segments
//!
//! Recognized forms:
//! - `${name}` - braced placeholder
//! - `$name` - bare placeholder, ends at the first non-identifier character
//! - `$$` - a literal `$`
//!
//! Identifiers are an ASCII letter or `_` followed by ASCII letters, digits
//! or `_`. Any other use of `$` is an invalid placeholder, and a placeholder
//! with no namespace entry is an error; nothing is passed through literally.

use crate::error::{Error, Result};
use crate::namespace::Namespace;

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied through unchanged (escapes already collapsed)
    Literal(String),
    /// A placeholder name to look up in the namespace
    Placeholder(String),
}

/// A parsed template string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of all placeholders, in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Render the template, failing on the first placeholder the namespace lacks
    pub fn substitute(&self, namespace: &Namespace) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = namespace
                        .get(name)
                        .ok_or_else(|| Error::unresolved_placeholder(name.as_str()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Parser for template strings
pub struct TemplateParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TemplateParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Template> {
        let mut segments = Vec::new();
        let mut literal = String::new();

        while let Some(c) = self.current() {
            if c != '$' {
                literal.push(c);
                self.advance();
                continue;
            }

            let start = self.pos;
            match self.peek() {
                Some('$') => {
                    self.advance();
                    self.advance();
                    literal.push('$');
                }
                Some('{') => {
                    self.advance();
                    self.advance();
                    let name = self.collect_identifier();
                    if name.is_empty() || self.current() != Some('}') {
                        return Err(self.invalid_at(start));
                    }
                    self.advance();
                    flush_literal(&mut literal, &mut segments);
                    segments.push(Segment::Placeholder(name));
                }
                Some(n) if is_identifier_start(n) => {
                    self.advance();
                    let name = self.collect_identifier();
                    flush_literal(&mut literal, &mut segments);
                    segments.push(Segment::Placeholder(name));
                }
                _ => return Err(self.invalid_at(start)),
            }
        }

        flush_literal(&mut literal, &mut segments);
        Ok(Template { segments })
    }

    fn current(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.pos += c.len_utf8();
        }
    }

    fn collect_identifier(&mut self) -> String {
        let mut result = String::new();
        if let Some(c) = self.current().filter(|c| is_identifier_start(*c)) {
            result.push(c);
            self.advance();
            while let Some(c) = self.current().filter(|c| is_identifier_char(*c)) {
                result.push(c);
                self.advance();
            }
        }
        result
    }

    fn invalid_at(&self, start: usize) -> Error {
        let before = &self.input[..start];
        let line = before.matches('\n').count() + 1;
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        Error::invalid_placeholder(format!(
            "Invalid placeholder in '{}' at line {}, column {}",
            self.input, line, column
        ))
    }
}

fn flush_literal(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Check whether `name` is usable as a placeholder identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_char)
}

/// Parse a template string
pub fn parse(input: &str) -> Result<Template> {
    TemplateParser::new(input).parse()
}

/// Substitute all placeholders in `input` against `namespace`
pub fn substitute(input: &str, namespace: &Namespace) -> Result<String> {
    if !input.contains('$') {
        return Ok(input.to_string());
    }
    parse(input)?.substitute(namespace)
}
