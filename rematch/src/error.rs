//! Error types for compile, match and replace
//!
//! Compile failures carry a closed [`ErrorCode`] together with the engine's
//! message and the offending fragment of the pattern. Everything else is a
//! small fixed set of conditions: invalid arguments, failed allocation of a
//! result value, an undecodable capture reference, or a replacement that had
//! nothing to replace.

use std::fmt;
use thiserror::Error;

/// Closed set of pattern compile error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Fallback when the engine reports a kind this layer does not know
    NoError,
    /// Unexpected engine failure
    Internal,
    /// Bad escape sequence
    BadEscape,
    /// Bad character class
    BadCharClass,
    /// Bad character class range
    BadCharRange,
    /// Missing closing `]`
    MissingBracket,
    /// Missing closing `)` (or an unopened one)
    MissingParen,
    /// Trailing `\` at the end of the pattern
    TrailingBackslash,
    /// Repetition operator with nothing to repeat, e.g. `*`
    RepeatArgument,
    /// Bad counted repetition
    RepeatSize,
    /// Bad repetition operator
    RepeatOp,
    /// Bad perl operator (flags, look-around)
    BadPerlOp,
    /// Invalid UTF-8 in the pattern
    BadUtf8,
    /// Bad named capture group
    BadNamedCapture,
    /// Pattern too large, compile failed
    PatternTooLarge,
}

impl ErrorCode {
    /// Every code, in declaration order
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::NoError,
        ErrorCode::Internal,
        ErrorCode::BadEscape,
        ErrorCode::BadCharClass,
        ErrorCode::BadCharRange,
        ErrorCode::MissingBracket,
        ErrorCode::MissingParen,
        ErrorCode::TrailingBackslash,
        ErrorCode::RepeatArgument,
        ErrorCode::RepeatSize,
        ErrorCode::RepeatOp,
        ErrorCode::BadPerlOp,
        ErrorCode::BadUtf8,
        ErrorCode::BadNamedCapture,
        ErrorCode::PatternTooLarge,
    ];

    /// The stable host-facing name of the code
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoError => "no_error",
            ErrorCode::Internal => "internal",
            ErrorCode::BadEscape => "bad_escape",
            ErrorCode::BadCharClass => "bad_char_class",
            ErrorCode::BadCharRange => "bad_char_range",
            ErrorCode::MissingBracket => "missing_bracket",
            ErrorCode::MissingParen => "missing_paren",
            ErrorCode::TrailingBackslash => "trailing_backslash",
            ErrorCode::RepeatArgument => "repeat_argument",
            ErrorCode::RepeatSize => "repeat_size",
            ErrorCode::RepeatOp => "repeat_op",
            ErrorCode::BadPerlOp => "bad_perl_op",
            ErrorCode::BadUtf8 => "bad_utf8",
            ErrorCode::BadNamedCapture => "bad_named_capture",
            ErrorCode::PatternTooLarge => "pattern_too_large",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured pattern compile failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message} (at `{fragment}`)")]
pub struct CompileError {
    /// What went wrong
    pub code: ErrorCode,
    /// The engine's description of the failure
    pub message: String,
    /// The offending part of the pattern
    pub fragment: String,
}

impl CompileError {
    /// Create a new compile error
    pub fn new(code: ErrorCode, message: impl Into<String>, fragment: impl Into<String>) -> Self {
        CompileError {
            code,
            message: message.into(),
            fragment: fragment.into(),
        }
    }
}

/// A capture reference that could not be decoded into an ordinal or a name
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceError {
    /// A textual name that is not valid text
    #[error("capture name is not valid text")]
    Text,

    /// A value that is neither a positive ordinal nor a name
    #[error("unsupported capture reference")]
    Unsupported,
}

/// The main error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pattern did not compile
    #[error("pattern compilation failed: {0}")]
    Compile(#[from] CompileError),

    /// Malformed options, wrong argument types or a disallowed combination
    #[error("invalid argument")]
    InvalidArgument,

    /// Memory for a result value could not be reserved
    #[error("failed to allocate {0} bytes for a result value")]
    Alloc(usize),

    /// A capture reference could not be decoded
    #[error("bad capture reference: {0}")]
    Reference(#[from] ReferenceError),

    /// A replacement found nothing it could substitute
    #[error("nothing to replace")]
    NotReplaced,
}

/// Result type alias for rematch operations
pub type Result<T> = std::result::Result<T, Error>;
