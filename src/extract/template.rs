//! Format templates with a single named placeholder
//!
//! Syntax follows the common brace convention: `{name}` is a placeholder,
//! `{name!r:>8}` carries a conversion and a format spec (both parsed and
//! ignored when rendering), `{{` and `}}` are literal braces.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed '{{' in format template")]
    UnclosedPlaceholder,
    #[error("single '}}' encountered in format template")]
    StrayClosingBrace,
    #[error("nested placeholders are not supported")]
    NestedPlaceholder,
    #[error("exactly one format field is allowed, found {0}")]
    PlaceholderCount(usize),
    #[error("the format field must be named")]
    UnnamedPlaceholder,
}

/// Name of a `{...}` replacement field with any `!conversion` and
/// `:format_spec` suffix dropped
fn placeholder_name(inner: &str) -> &str {
    let head = inner.split_once(':').map_or(inner, |(head, _spec)| head);
    let name = head.split_once('!').map_or(head, |(name, _conversion)| name);
    name.trim()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// Format template holding exactly one named placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    field: String,
}

impl Template {
    /// Parse `source`, requiring exactly one named placeholder
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] when the braces are malformed, when the
    /// placeholder count is not exactly one, or when the placeholder is unnamed.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let segments = parse_segments(source)?;

        let fields: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Field(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect();

        let [only] = fields.as_slice() else {
            return Err(TemplateError::PlaceholderCount(fields.len()));
        };
        if only.is_empty() {
            return Err(TemplateError::UnnamedPlaceholder);
        }
        let field = (*only).to_string();

        Ok(Self {
            source: source.to_string(),
            segments,
            field,
        })
    }

    /// Name of the single placeholder
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Template text as written
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute `value` for the placeholder
    #[must_use]
    pub fn render(&self, value: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + value.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(_) => out.push_str(value),
            }
        }
        out
    }
}

/// Double every brace so `text` renders literally inside a template
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

fn parse_segments(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '{' => {
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => return Err(TemplateError::NestedPlaceholder),
                        Some(ch) => inner.push(ch),
                        None => return Err(TemplateError::UnclosedPlaceholder),
                    }
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(placeholder_name(&inner).to_string()));
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err(TemplateError::StrayClosingBrace),
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
