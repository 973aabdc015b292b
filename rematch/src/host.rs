//! Host call layer
//!
//! The three operations as an embedding runtime sees them: positional
//! argument terms in, a result term out. Argument shape problems are a hard
//! [`Fault`]; everything else is reported inside the result term.
//!
//! ```text
//! compile(Pattern [, Options])           -> {ok, Handle} | {error, {Code, Message, Fragment}}
//! match(Subject, Pattern [, Options])    -> match | {match, [Value]} | nomatch | {error, Tag}
//! replace(Subject, Pattern, Template [, Options]) -> Binary | error
//! ```

use crate::capture::CaptureValue;
use crate::error::{CompileError, Error, ReferenceError};
use crate::matcher::{self, MatchResult};
use crate::options::{CompileOptions, MatchOptions, ReplaceOptions};
use crate::pattern::{Pattern, Target};
use crate::runtime::Executor;
use crate::term::{Keyword, Term};
use std::sync::Arc;

/// A hard failure of a host call
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    #[error("bad argument")]
    BadArg,
}

fn bad_arg(what: &'static str) -> Fault {
    tracing::debug!(argument = what, "bad argument");
    Fault::BadArg
}

/// Bytes of a binary or iolist argument
fn bytes_arg(term: &Term, what: &'static str) -> Result<Vec<u8>, Fault> {
    term.iolist_bytes().ok_or_else(|| bad_arg(what))
}

/// Entries of an options argument, which must be a proper list
fn options_arg(term: Option<&Term>) -> Result<&[Term], Fault> {
    match term {
        None => Ok(&[]),
        Some(Term::List(entries)) => Ok(entries),
        Some(_) => Err(bad_arg("options")),
    }
}

enum PatternArg {
    Handle(Arc<Pattern>),
    Inline(Vec<u8>),
}

impl PatternArg {
    fn from_term(term: &Term) -> Result<Self, Fault> {
        match term {
            Term::Pattern(pattern) => Ok(PatternArg::Handle(Arc::clone(pattern))),
            other => bytes_arg(other, "pattern").map(PatternArg::Inline),
        }
    }

    fn target(&self) -> Target<'_> {
        match self {
            PatternArg::Handle(pattern) => Target::Handle(pattern),
            PatternArg::Inline(source) => Target::Inline(source),
        }
    }
}

fn compile_error_term(err: &CompileError) -> Term {
    Term::tuple([
        Keyword::Error.into(),
        Term::tuple([
            Term::atom(err.code.as_str()),
            Term::binary(err.message.as_bytes()),
            Term::binary(err.fragment.as_bytes()),
        ]),
    ])
}

/// `{error, Tag}` for failures that are not argument faults
fn error_term(err: Error) -> Result<Term, Fault> {
    let tag = match err {
        Error::InvalidArgument => return Err(Fault::BadArg),
        Error::Compile(e) => return Ok(compile_error_term(&e)),
        Error::Alloc(_) => "alloc_binary",
        Error::Reference(ReferenceError::Text) => "get_string",
        Error::Reference(ReferenceError::Unsupported) => "bad_reference",
        Error::NotReplaced => return Ok(Keyword::Error.into()),
    };
    Ok(Term::tuple([Keyword::Error.into(), Term::atom(tag)]))
}

fn capture_term(value: CaptureValue) -> Term {
    match value {
        CaptureValue::Index { offset, length } => Term::tuple([offset.into(), length.into()]),
        CaptureValue::Bytes(bytes) => Term::Binary(bytes),
    }
}

fn match_term(result: MatchResult) -> Term {
    match result {
        MatchResult::NoMatch => Keyword::NoMatch.into(),
        MatchResult::Matched => Keyword::Match.into(),
        MatchResult::Captures(values) => Term::tuple([
            Keyword::Match.into(),
            Term::list(values.into_iter().map(capture_term)),
        ]),
    }
}

/// Runs host calls on an executor
#[derive(Debug, Clone, Copy)]
pub struct Host<'e> {
    executor: &'e Executor,
}

impl<'e> Host<'e> {
    pub fn new(executor: &'e Executor) -> Self {
        Host { executor }
    }

    pub fn executor(&self) -> &'e Executor {
        self.executor
    }

    /// `compile/1,2`
    pub fn compile(&self, args: &[Term]) -> Result<Term, Fault> {
        let (pattern, options) = match args {
            [pattern] => (pattern, None),
            [pattern, options] => (pattern, Some(options)),
            _ => return Err(bad_arg("arity")),
        };
        let source = bytes_arg(pattern, "pattern")?;
        let options = CompileOptions::parse(options_arg(options)?).map_err(|_| Fault::BadArg)?;

        match self.executor.run(|| Pattern::compile(&source, &options)) {
            Ok(pattern) => Ok(Term::tuple([
                Keyword::Ok.into(),
                Term::Pattern(Arc::new(pattern)),
            ])),
            Err(e) => error_term(e),
        }
    }

    /// `match/2,3`
    pub fn run_match(&self, args: &[Term]) -> Result<Term, Fault> {
        let (subject, pattern, options) = match args {
            [subject, pattern] => (subject, pattern, None),
            [subject, pattern, options] => (subject, pattern, Some(options)),
            _ => return Err(bad_arg("arity")),
        };
        let subject = bytes_arg(subject, "subject")?;
        let pattern = PatternArg::from_term(pattern)?;
        let options = MatchOptions::parse(options_arg(options)?).map_err(|_| Fault::BadArg)?;

        self.executor
            .run(|| matcher::run_match(&subject, pattern.target(), &options))
            .map_or_else(error_term, |result| Ok(match_term(result)))
    }

    /// `replace/3,4`
    pub fn replace(&self, args: &[Term]) -> Result<Term, Fault> {
        let (subject, pattern, template, options) = match args {
            [subject, pattern, template] => (subject, pattern, template, None),
            [subject, pattern, template, options] => (subject, pattern, template, Some(options)),
            _ => return Err(bad_arg("arity")),
        };
        let subject = bytes_arg(subject, "subject")?;
        let pattern = PatternArg::from_term(pattern)?;
        let template = bytes_arg(template, "template")?;
        let options = ReplaceOptions::parse(options_arg(options)?).map_err(|_| Fault::BadArg)?;

        self.executor
            .run(|| crate::replace::replace(&subject, pattern.target(), &template, &options))
            .map_or_else(error_term, |out| Ok(Term::Binary(out)))
    }
}

impl Host<'static> {
    /// A host over the process-wide executor
    pub fn global() -> Self {
        Host::new(Executor::global())
    }
}

/// `compile/1,2` on the process-wide executor
pub fn compile(args: &[Term]) -> Result<Term, Fault> {
    Host::global().compile(args)
}

/// `match/2,3` on the process-wide executor
pub fn run_match(args: &[Term]) -> Result<Term, Fault> {
    Host::global().run_match(args)
}

/// `replace/3,4` on the process-wide executor
pub fn replace(args: &[Term]) -> Result<Term, Fault> {
    Host::global().replace(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    static INLINE: Executor = Executor::Inline;

    fn host() -> Host<'static> {
        Host::new(&INLINE)
    }

    fn kw(keyword: Keyword) -> Term {
        keyword.into()
    }

    #[test]
    fn test_compile_ok_returns_handle() {
        let result = host().compile(&[Term::binary("(a)(b)")]).unwrap();
        match result {
            Term::Tuple(items) => {
                assert_eq!(items[0], kw(Keyword::Ok));
                assert!(matches!(&items[1], Term::Pattern(p) if p.group_count() == 2));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_compile_error_term() {
        let result = host().compile(&[Term::binary("(foo")]).unwrap();
        let Term::Tuple(items) = result else {
            panic!("expected a tuple")
        };
        assert_eq!(items[0], kw(Keyword::Error));
        let Term::Tuple(detail) = &items[1] else {
            panic!("expected error detail")
        };
        assert_eq!(detail[0], Term::atom("missing_paren"));
        assert!(matches!(detail[1], Term::Binary(_)));
        assert!(matches!(detail[2], Term::Binary(_)));
    }

    #[test]
    fn test_arity_and_argument_types() {
        assert_eq!(host().compile(&[]), Err(Fault::BadArg));
        assert_eq!(host().compile(&[Term::Int(1)]), Err(Fault::BadArg));
        assert_eq!(
            host().compile(&[Term::binary("a"), kw(Keyword::Caseless)]),
            Err(Fault::BadArg)
        );
        assert_eq!(host().run_match(&[Term::binary("a")]), Err(Fault::BadArg));
        assert_eq!(
            host().replace(&[Term::binary("a"), Term::binary("a")]),
            Err(Fault::BadArg)
        );
    }

    #[test]
    fn test_match_terms() {
        let opts = Term::list([Term::tuple([
            kw(Keyword::Capture),
            kw(Keyword::All),
            kw(Keyword::Index),
        ])]);
        let result = host()
            .run_match(&[Term::binary("12-34"), Term::binary(r"(\d+)-(\d+)"), opts])
            .unwrap();
        let expected = Term::tuple([
            kw(Keyword::Match),
            Term::list([
                Term::tuple([Term::Int(0), Term::Int(5)]),
                Term::tuple([Term::Int(0), Term::Int(2)]),
                Term::tuple([Term::Int(3), Term::Int(2)]),
            ]),
        ]);
        assert_eq!(result, expected);

        assert_eq!(
            host().run_match(&[Term::binary("bbb"), Term::binary("a")]),
            Ok(kw(Keyword::NoMatch))
        );
    }

    #[test]
    fn test_reference_error_tags() {
        let refs = |r: Term| {
            Term::list([Term::tuple([kw(Keyword::Capture), Term::list([r])])])
        };
        assert_eq!(
            host().run_match(&[Term::binary("a"), Term::binary("(a)"), refs(Term::Int(0))]),
            Ok(Term::tuple([kw(Keyword::Error), Term::atom("bad_reference")]))
        );
        assert_eq!(
            host().run_match(&[
                Term::binary("a"),
                Term::binary("(a)"),
                refs(Term::Binary(vec![0xff]))
            ]),
            Ok(Term::tuple([kw(Keyword::Error), Term::atom("get_string")]))
        );
    }

    #[test]
    fn test_replace_terms() {
        assert_eq!(
            host().replace(&[
                Term::binary("a1b2"),
                Term::binary(r"\d"),
                Term::binary("#"),
                Term::list([kw(Keyword::Global)]),
            ]),
            Ok(Term::binary("a#b#"))
        );
        assert_eq!(
            host().replace(&[Term::binary("abc"), Term::binary("x"), Term::binary("y")]),
            Ok(kw(Keyword::Error))
        );
        assert_eq!(
            host().replace(&[Term::binary("abc"), Term::binary("("), Term::binary("y")]),
            Err(Fault::BadArg)
        );
    }
}
