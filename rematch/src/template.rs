//! Replacement templates
//!
//! A template is literal bytes with group references:
//! - `\0` .. `\9` for a group by single digit (`\0` is the whole match)
//! - `\g{N}` for a group by number, `\g{name}` for a named group
//! - `\\` for a literal backslash
//!
//! Any other escape is an error, as is a trailing backslash.

use crate::groups::GroupTable;
use regex::bytes::Captures;
use thiserror::Error;

/// A part of a replacement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal bytes
    Literal(Vec<u8>),
    /// Group by index, 0 being the whole match
    Group(usize),
    /// Group by name, resolved by [`Template::bind`]
    Named(String),
}

/// Errors in a replacement template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("invalid escape sequence '\\{0}'")]
    BadEscape(char),

    #[error("trailing backslash")]
    TrailingBackslash,

    #[error("unclosed group reference")]
    Unclosed,

    #[error("reference to group {0}, pattern has fewer groups")]
    UnknownGroup(usize),

    #[error("reference to unknown group name '{0}'")]
    UnknownName(String),
}

/// A parsed replacement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

impl Template {
    /// Parse a template
    pub fn parse(input: &[u8]) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut literal = Vec::new();
        let mut bytes = input.iter().copied();

        while let Some(b) = bytes.next() {
            if b != b'\\' {
                literal.push(b);
                continue;
            }
            let reference = match bytes.next() {
                None => return Err(TemplateError::TrailingBackslash),
                Some(b'\\') => {
                    literal.push(b'\\');
                    continue;
                }
                Some(digit @ b'0'..=b'9') => TemplatePart::Group(usize::from(digit - b'0')),
                Some(b'g') => {
                    if bytes.next() != Some(b'{') {
                        return Err(TemplateError::BadEscape('g'));
                    }
                    let mut name = Vec::new();
                    loop {
                        match bytes.next() {
                            Some(b'}') => break,
                            Some(c) => name.push(c),
                            None => return Err(TemplateError::Unclosed),
                        }
                    }
                    let name = String::from_utf8(name).map_err(|_| TemplateError::BadEscape('g'))?;
                    match name.parse::<usize>() {
                        Ok(index) => TemplatePart::Group(index),
                        Err(_) => TemplatePart::Named(name),
                    }
                }
                Some(other) => return Err(TemplateError::BadEscape(char::from(other))),
            };
            if !literal.is_empty() {
                parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
            }
            parts.push(reference);
        }

        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Ok(Template { parts })
    }

    /// Resolve names to indices and check every reference against the
    /// pattern's groups
    pub fn bind(&self, groups: &GroupTable) -> Result<Template, TemplateError> {
        let parts = self
            .parts
            .iter()
            .map(|part| match part {
                TemplatePart::Group(index) if *index > groups.group_count() => {
                    Err(TemplateError::UnknownGroup(*index))
                }
                TemplatePart::Named(name) => groups
                    .index_of(name)
                    .map(TemplatePart::Group)
                    .ok_or_else(|| TemplateError::UnknownName(name.clone())),
                other => Ok(other.clone()),
            })
            .collect::<Result<_, _>>()?;
        Ok(Template { parts })
    }

    /// Append the expansion for one match. Groups that did not participate
    /// expand to nothing.
    pub fn expand(&self, caps: &Captures<'_>, dst: &mut Vec<u8>) {
        for part in &self.parts {
            match part {
                TemplatePart::Literal(bytes) => dst.extend_from_slice(bytes),
                TemplatePart::Group(index) => {
                    if let Some(m) = caps.get(*index) {
                        dst.extend_from_slice(m.as_bytes());
                    }
                }
                TemplatePart::Named(name) => {
                    if let Some(m) = caps.name(name) {
                        dst.extend_from_slice(m.as_bytes());
                    }
                }
            }
        }
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        let template = Template::parse(b"hello").unwrap();
        assert_eq!(template.parts(), &[TemplatePart::Literal(b"hello".to_vec())]);
    }

    #[test]
    fn test_parse_digit_is_single() {
        let template = Template::parse(b"\\12").unwrap();
        assert_eq!(
            template.parts(),
            &[TemplatePart::Group(1), TemplatePart::Literal(b"2".to_vec())]
        );
    }

    #[test]
    fn test_parse_braced_references() {
        let template = Template::parse(b"<\\g{12}|\\g{name}>").unwrap();
        assert_eq!(
            template.parts(),
            &[
                TemplatePart::Literal(b"<".to_vec()),
                TemplatePart::Group(12),
                TemplatePart::Literal(b"|".to_vec()),
                TemplatePart::Named("name".into()),
                TemplatePart::Literal(b">".to_vec()),
            ]
        );
    }

    #[test]
    fn test_parse_escaped_backslash() {
        let template = Template::parse(b"a\\\\b").unwrap();
        assert_eq!(template.parts(), &[TemplatePart::Literal(b"a\\b".to_vec())]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Template::parse(b"x\\"), Err(TemplateError::TrailingBackslash));
        assert_eq!(Template::parse(b"\\n"), Err(TemplateError::BadEscape('n')));
        assert_eq!(Template::parse(b"\\g1"), Err(TemplateError::BadEscape('g')));
        assert_eq!(Template::parse(b"\\g{abc"), Err(TemplateError::Unclosed));
    }

    #[test]
    fn test_bind_checks_groups() {
        let groups = GroupTable::from_slot_names([None, Some("word"), None]);
        let bound = Template::parse(b"\\g{word}-\\2-\\0").unwrap().bind(&groups).unwrap();
        assert_eq!(bound.parts()[0], TemplatePart::Group(1));

        assert_eq!(
            Template::parse(b"\\3").unwrap().bind(&groups),
            Err(TemplateError::UnknownGroup(3))
        );
        assert_eq!(
            Template::parse(b"\\g{nope}").unwrap().bind(&groups),
            Err(TemplateError::UnknownName("nope".into()))
        );
    }

    #[test]
    fn test_expand() {
        let re = regex::bytes::Regex::new(r"(\w+)@(\w+)?").unwrap();
        let caps = re.captures(b"user@").unwrap();
        let template = Template::parse(b"[\\2|\\1|\\0]").unwrap();
        let mut out = Vec::new();
        template.expand(&caps, &mut out);
        assert_eq!(out, b"[|user|user@]");
    }
}
