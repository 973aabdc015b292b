//! Compile error classification
//!
//! The matcher only reports syntax failures as text. To hand callers a
//! closed error code, a failed pattern is parsed again with `regex-syntax`
//! under the same settings and the structured error kind is mapped onto
//! [`ErrorCode`]. The message is the kind's description and the fragment is
//! the span of the pattern the parser pointed at.

use crate::error::{CompileError, ErrorCode};
use regex_syntax::{ast, hir};

/// Build a [`CompileError`] for a pattern the engine refused
pub(crate) fn classify(pattern: &str, case_insensitive: bool, err: &regex::Error) -> CompileError {
    match err {
        regex::Error::CompiledTooBig(_) => {
            CompileError::new(ErrorCode::PatternTooLarge, err.to_string(), pattern)
        }
        regex::Error::Syntax(message) => reparse(pattern, case_insensitive)
            .unwrap_or_else(|| CompileError::new(ErrorCode::Internal, message.clone(), pattern)),
        _ => CompileError::new(ErrorCode::Internal, err.to_string(), pattern),
    }
}

/// A pattern whose bytes are not UTF-8
pub(crate) fn invalid_utf8(pattern: &[u8], err: &std::str::Utf8Error) -> CompileError {
    let fragment = String::from_utf8_lossy(&pattern[err.valid_up_to()..]).into_owned();
    CompileError::new(ErrorCode::BadUtf8, "invalid UTF-8", fragment)
}

fn reparse(pattern: &str, case_insensitive: bool) -> Option<CompileError> {
    let err = regex_syntax::ParserBuilder::new()
        .utf8(false)
        .case_insensitive(case_insensitive)
        .build()
        .parse(pattern)
        .err()?;

    let error = match &err {
        regex_syntax::Error::Parse(e) => CompileError::new(
            classify_ast(e.kind()),
            e.kind().to_string(),
            fragment(pattern, e.span()),
        ),
        regex_syntax::Error::Translate(e) => CompileError::new(
            classify_hir(e.kind()),
            e.kind().to_string(),
            fragment(pattern, e.span()),
        ),
        _ => CompileError::new(ErrorCode::Internal, err.to_string(), pattern),
    };
    Some(error)
}

fn fragment(pattern: &str, span: &ast::Span) -> String {
    let (start, end) = (span.start.offset, span.end.offset);
    let slice = if start < end {
        pattern.get(start..end)
    } else {
        pattern.get(start..)
    };
    slice.unwrap_or(pattern).to_string()
}

fn classify_ast(kind: &ast::ErrorKind) -> ErrorCode {
    use ast::ErrorKind as K;
    match kind {
        K::CaptureLimitExceeded | K::NestLimitExceeded(_) => ErrorCode::PatternTooLarge,
        K::ClassEscapeInvalid
        | K::EscapeHexEmpty
        | K::EscapeHexInvalid
        | K::EscapeHexInvalidDigit
        | K::EscapeUnrecognized
        | K::UnsupportedBackreference
        | K::SpecialWordBoundaryUnclosed
        | K::SpecialWordBoundaryUnrecognized => ErrorCode::BadEscape,
        K::EscapeUnexpectedEof => ErrorCode::TrailingBackslash,
        K::ClassRangeInvalid | K::ClassRangeLiteral => ErrorCode::BadCharRange,
        K::ClassUnclosed => ErrorCode::MissingBracket,
        K::UnicodeClassInvalid => ErrorCode::BadCharClass,
        K::DecimalEmpty
        | K::DecimalInvalid
        | K::RepetitionCountInvalid
        | K::RepetitionCountDecimalEmpty
        | K::RepetitionCountUnclosed => ErrorCode::RepeatSize,
        K::RepetitionMissing => ErrorCode::RepeatArgument,
        K::SpecialWordOrRepetitionUnexpectedEof => ErrorCode::RepeatOp,
        K::FlagDanglingNegation
        | K::FlagDuplicate { .. }
        | K::FlagRepeatedNegation { .. }
        | K::FlagUnexpectedEof
        | K::FlagUnrecognized
        | K::UnsupportedLookAround => ErrorCode::BadPerlOp,
        K::GroupNameDuplicate { .. }
        | K::GroupNameEmpty
        | K::GroupNameInvalid
        | K::GroupNameUnexpectedEof => ErrorCode::BadNamedCapture,
        K::GroupUnclosed | K::GroupUnopened => ErrorCode::MissingParen,
        _ => ErrorCode::NoError,
    }
}

fn classify_hir(kind: &hir::ErrorKind) -> ErrorCode {
    use hir::ErrorKind as K;
    match kind {
        K::UnicodeNotAllowed | K::InvalidUtf8 => ErrorCode::BadUtf8,
        K::UnicodePropertyNotFound | K::UnicodePropertyValueNotFound => ErrorCode::BadCharRange,
        K::UnicodePerlClassNotFound => ErrorCode::BadCharClass,
        K::InvalidLineTerminator | K::UnicodeCaseUnavailable => ErrorCode::Internal,
        _ => ErrorCode::NoError,
    }
}
