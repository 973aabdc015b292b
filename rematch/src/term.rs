//! Host values
//!
//! A small dynamically typed value model for talking to an embedding
//! runtime: atoms, integers, binaries, lists, tuples and compiled pattern
//! handles. Configuration entries arrive as terms and results leave as terms.

use crate::pattern::Pattern;
use std::fmt;
use std::sync::Arc;

/// The fixed set of atoms this layer reads or produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Ok,
    Error,
    Match,
    NoMatch,
    Capture,
    Global,
    Offset,
    All,
    AllButFirst,
    First,
    None,
    Index,
    Binary,
    Caseless,
    MaxMem,
}

impl Keyword {
    const TABLE: [(Keyword, &'static str); 15] = [
        (Keyword::Ok, "ok"),
        (Keyword::Error, "error"),
        (Keyword::Match, "match"),
        (Keyword::NoMatch, "nomatch"),
        (Keyword::Capture, "capture"),
        (Keyword::Global, "global"),
        (Keyword::Offset, "offset"),
        (Keyword::All, "all"),
        (Keyword::AllButFirst, "all_but_first"),
        (Keyword::First, "first"),
        (Keyword::None, "none"),
        (Keyword::Index, "index"),
        (Keyword::Binary, "binary"),
        (Keyword::Caseless, "caseless"),
        (Keyword::MaxMem, "max_mem"),
    ];

    /// The atom's name
    pub fn as_str(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(keyword, _)| *keyword == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }

    /// Look up a keyword by atom name
    pub fn from_name(name: &str) -> Option<Keyword> {
        Self::TABLE
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(keyword, _)| *keyword)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host value
#[derive(Clone)]
pub enum Term {
    Atom(String),
    Int(i64),
    Binary(Vec<u8>),
    List(Vec<Term>),
    Tuple(Vec<Term>),
    Pattern(Arc<Pattern>),
}

impl Term {
    /// An atom with an arbitrary name
    pub fn atom(name: impl Into<String>) -> Self {
        Term::Atom(name.into())
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Term::Binary(bytes.into())
    }

    pub fn tuple(items: impl IntoIterator<Item = Term>) -> Self {
        Term::Tuple(items.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Term>) -> Self {
        Term::List(items.into_iter().collect())
    }

    /// The keyword this term names, if it is an atom from the fixed set
    pub fn as_keyword(&self) -> Option<Keyword> {
        match self {
            Term::Atom(name) => Keyword::from_name(name),
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.as_keyword() == Some(keyword)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Term::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Flatten a binary or an iolist (nested lists of bytes and binaries)
    pub fn iolist_bytes(&self) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        self.flatten_into(&mut out, true).then_some(out)
    }

    fn flatten_into(&self, out: &mut Vec<u8>, top: bool) -> bool {
        match self {
            Term::Binary(bytes) => {
                out.extend_from_slice(bytes);
                true
            }
            Term::Int(n) if !top => match u8::try_from(*n) {
                Ok(byte) => {
                    out.push(byte);
                    true
                }
                Err(_) => false,
            },
            Term::List(items) => items.iter().all(|item| item.flatten_into(out, false)),
            _ => false,
        }
    }

    /// Decode a flat list of Latin-1 code points into text
    pub fn latin1_text(&self) -> Option<String> {
        match self {
            Term::List(items) => items
                .iter()
                .map(|item| match item {
                    Term::Int(n) => u8::try_from(*n).ok().map(char::from),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

impl From<Keyword> for Term {
    fn from(keyword: Keyword) -> Self {
        Term::Atom(keyword.as_str().to_string())
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::Int(n)
    }
}

impl From<&[u8]> for Term {
    fn from(bytes: &[u8]) -> Self {
        Term::Binary(bytes.to_vec())
    }
}

impl From<&str> for Term {
    fn from(text: &str) -> Self {
        Term::Binary(text.as_bytes().to_vec())
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Atom(a), Term::Atom(b)) => a == b,
            (Term::Int(a), Term::Int(b)) => a == b,
            (Term::Binary(a), Term::Binary(b)) => a == b,
            (Term::List(a), Term::List(b)) | (Term::Tuple(a), Term::Tuple(b)) => a == b,
            (Term::Pattern(a), Term::Pattern(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => f.write_str(name),
            Term::Int(n) => write!(f, "{n}"),
            Term::Binary(bytes) => write!(f, "<<{:?}>>", String::from_utf8_lossy(bytes)),
            Term::List(items) => f.debug_list().entries(items).finish(),
            Term::Tuple(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                f.write_str("}")
            }
            Term::Pattern(pattern) => write!(f, "#Pattern<{}>", pattern.group_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for (keyword, name) in Keyword::TABLE {
            assert_eq!(keyword.as_str(), name);
            assert_eq!(Keyword::from_name(name), Some(keyword));
        }
        assert_eq!(Keyword::from_name("bogus"), None);
    }

    #[test]
    fn test_iolist_flattening() {
        let iolist = Term::list([
            Term::binary("ab"),
            Term::Int(b'c' as i64),
            Term::list([Term::binary("d")]),
        ]);
        assert_eq!(iolist.iolist_bytes(), Some(b"abcd".to_vec()));
    }

    #[test]
    fn test_iolist_rejects_bare_int_and_atoms() {
        assert_eq!(Term::Int(65).iolist_bytes(), None);
        assert_eq!(Term::atom("a").iolist_bytes(), None);
        assert_eq!(Term::list([Term::Int(300)]).iolist_bytes(), None);
    }

    #[test]
    fn test_latin1_text() {
        let text = Term::list([Term::Int(110), Term::Int(0xe9)]);
        assert_eq!(text.latin1_text().as_deref(), Some("n\u{e9}"));
        assert_eq!(Term::list([Term::Int(1000)]).latin1_text(), None);
        assert_eq!(Term::list([]).latin1_text().as_deref(), Some(""));
    }

    #[test]
    fn test_debug_format() {
        let term = Term::tuple([Keyword::Match.into(), Term::list([Term::Int(1)])]);
        assert_eq!(format!("{term:?}"), "{match, [1]}");
    }
}
