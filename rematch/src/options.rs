//! Option grammars for compile, match and replace
//!
//! Each grammar folds a sequence of configuration entries left to right into
//! a typed record. Later entries for the same field overwrite earlier ones.
//! Any entry that is not a recognized bare flag or a recognized tagged tuple
//! of the right arity fails the whole parse with [`Error::InvalidArgument`].
//!
//! ```text
//! compile:  caseless | {max_mem, Int}
//! match:    caseless | {offset, Int} | {capture, ValueSpec} | {capture, ValueSpec, Shape}
//! replace:  global
//!
//! ValueSpec = all | all_but_first | first | none | [Ref, ...]
//! Shape     = index | binary
//! Ref       = PositiveInt | atom | text
//! ```

use crate::error::{Error, ReferenceError, Result};
use crate::term::{Keyword, Term};

fn rejected(grammar: &'static str, entry: &Term) -> Error {
    tracing::debug!(grammar, ?entry, "rejected option entry");
    Error::InvalidArgument
}

/// Options applied when a pattern is compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Case-sensitive matching (default: true)
    pub case_sensitive: bool,
    /// Memory budget for the compiled program; `None` keeps the engine default.
    /// Zero and negative budgets are passed through and treated as the default.
    pub max_mem: Option<i64>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            case_sensitive: true,
            max_mem: None,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable case sensitivity
    pub fn caseless(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn max_mem(mut self, budget: i64) -> Self {
        self.max_mem = Some(budget);
        self
    }

    /// Fold compile-option entries
    pub fn parse(entries: &[Term]) -> Result<Self> {
        entries.iter().try_fold(Self::default(), |opts, entry| {
            if entry.is_keyword(Keyword::Caseless) {
                return Ok(opts.caseless());
            }
            match entry {
                Term::Tuple(items) if items.len() == 2 && items[0].is_keyword(Keyword::MaxMem) => {
                    let budget = items[1].as_int().ok_or_else(|| rejected("compile", entry))?;
                    Ok(opts.max_mem(budget))
                }
                _ => Err(rejected("compile", entry)),
            }
        })
    }
}

/// Which captures a match reports
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValueSpec {
    /// Whole match followed by every group
    #[default]
    All,
    /// Every group, whole match excluded
    AllButFirst,
    /// Whole match only
    First,
    /// No captures, only whether the pattern matched
    None,
    /// An explicit ordered selection
    List(Vec<CaptureRef>),
}

/// How a reported capture is represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// Byte offset and length into the subject
    Index,
    /// A copy of the captured bytes
    #[default]
    Binary,
}

/// One entry of a [`ValueSpec::List`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureRef {
    /// 1-based group ordinal
    Ordinal(u32),
    /// Group name
    Name(String),
    /// A reference that could not be decoded; reported once a match has to
    /// be resolved against it
    Undecodable(ReferenceError),
}

impl CaptureRef {
    /// Decode a host value: positive integers are ordinals, atoms and text
    /// are names
    pub fn from_term(term: &Term) -> Self {
        match term {
            Term::Int(n) => match u32::try_from(*n) {
                Ok(ordinal) if ordinal > 0 && *n <= i64::from(i32::MAX) => {
                    CaptureRef::Ordinal(ordinal)
                }
                _ => CaptureRef::Undecodable(ReferenceError::Unsupported),
            },
            Term::Atom(name) => CaptureRef::Name(name.clone()),
            Term::Binary(bytes) => match std::str::from_utf8(bytes) {
                Ok(name) => CaptureRef::Name(name.to_string()),
                Err(_) => CaptureRef::Undecodable(ReferenceError::Text),
            },
            Term::List(_) => match term.latin1_text() {
                Some(name) => CaptureRef::Name(name),
                None => CaptureRef::Undecodable(ReferenceError::Text),
            },
            _ => CaptureRef::Undecodable(ReferenceError::Unsupported),
        }
    }
}

impl From<u32> for CaptureRef {
    fn from(ordinal: u32) -> Self {
        CaptureRef::Ordinal(ordinal)
    }
}

impl From<&str> for CaptureRef {
    fn from(name: &str) -> Self {
        CaptureRef::Name(name.to_string())
    }
}

/// Options applied to a single match
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchOptions {
    /// Compile an inline pattern case-insensitively. Not allowed together
    /// with a precompiled handle.
    pub caseless: bool,
    /// Byte offset at which the search starts
    pub offset: i64,
    pub value_spec: ValueSpec,
    pub shape: Shape,
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caseless(mut self) -> Self {
        self.caseless = true;
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Select captures, keeping the current shape
    pub fn capture(mut self, spec: ValueSpec) -> Self {
        self.value_spec = spec;
        self
    }

    /// Select captures and their shape together
    pub fn capture_as(mut self, spec: ValueSpec, shape: Shape) -> Self {
        self.value_spec = spec;
        self.shape = shape;
        self
    }

    /// Fold match-option entries
    pub fn parse(entries: &[Term]) -> Result<Self> {
        entries.iter().try_fold(Self::default(), |mut opts, entry| {
            opts.apply(entry)?;
            Ok(opts)
        })
    }

    fn apply(&mut self, entry: &Term) -> Result<()> {
        if entry.is_keyword(Keyword::Caseless) {
            self.caseless = true;
            return Ok(());
        }
        let Term::Tuple(items) = entry else {
            return Err(rejected("match", entry));
        };
        match (items.first().and_then(Term::as_keyword), items.len()) {
            (Some(Keyword::Offset), 2) => {
                self.offset = items[1].as_int().ok_or_else(|| rejected("match", entry))?;
                Ok(())
            }
            (Some(Keyword::Capture), 2 | 3) => self.apply_capture(entry, &items[1], items.get(2)),
            _ => Err(rejected("match", entry)),
        }
    }

    fn apply_capture(&mut self, entry: &Term, spec: &Term, shape: Option<&Term>) -> Result<()> {
        let spec = match spec {
            Term::Atom(_) => match spec.as_keyword() {
                Some(Keyword::All) => Some(ValueSpec::All),
                Some(Keyword::AllButFirst) => Some(ValueSpec::AllButFirst),
                Some(Keyword::First) => Some(ValueSpec::First),
                Some(Keyword::None) => Some(ValueSpec::None),
                _ => None,
            },
            Term::List(refs) if !refs.is_empty() => Some(ValueSpec::List(
                refs.iter().map(CaptureRef::from_term).collect(),
            )),
            _ => None,
        };

        // An unrecognized value spec leaves the record untouched and the
        // shape that came with it is dropped.
        let Some(spec) = spec else {
            tracing::debug!(?entry, "ignoring unrecognized capture value spec");
            return Ok(());
        };

        let shape = match shape {
            None => self.shape,
            Some(term) => match term.as_keyword() {
                Some(Keyword::Index) => Shape::Index,
                Some(Keyword::Binary) => Shape::Binary,
                _ => return Err(rejected("match", entry)),
            },
        };
        self.value_spec = spec;
        self.shape = shape;
        Ok(())
    }
}

/// Options applied to a replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOptions {
    /// Replace every non-overlapping occurrence instead of the first
    pub global: bool,
}

impl ReplaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Fold replace-option entries; `global` is the only one accepted
    pub fn parse(entries: &[Term]) -> Result<Self> {
        entries.iter().try_fold(Self::default(), |opts, entry| {
            if entry.is_keyword(Keyword::Global) {
                Ok(opts.global())
            } else {
                Err(rejected("replace", entry))
            }
        })
    }
}
