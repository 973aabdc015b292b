//! Rematch
//!
//! A regular-expression binding layer: compile patterns into shareable
//! handles, match subjects with configurable capture reporting, and replace
//! matches through a template. The typed API lives at the crate root; the
//! [`host`] module exposes the same operations over dynamically typed
//! [`Term`]s for embedding runtimes.
//!
//! ```
//! use rematch::{CaptureValue, CompileOptions, MatchOptions, MatchResult, ValueSpec};
//!
//! let pattern = rematch::compile(br"(?P<key>\w+)=(\w+)", &CompileOptions::default()).unwrap();
//! let options = MatchOptions::new().capture(ValueSpec::List(vec!["key".into()]));
//! let result = rematch::run_match(b"lang=rust", (&pattern).into(), &options).unwrap();
//! assert_eq!(result, MatchResult::Captures(vec![CaptureValue::Bytes(b"lang".to_vec())]));
//! ```

pub mod capture;
pub mod config;
mod diagnose;
pub mod engine;
pub mod error;
pub mod groups;
pub mod host;
pub mod matcher;
pub mod options;
pub mod pattern;
pub mod replace;
pub mod runtime;
pub mod template;
pub mod term;

pub use capture::CaptureValue;
pub use config::{Offload, RuntimeConfig};
pub use error::{CompileError, Error, ErrorCode, ReferenceError, Result};
pub use groups::{GroupInfo, GroupTable};
pub use host::{Fault, Host};
pub use matcher::{MatchResult, run_match};
pub use options::{CaptureRef, CompileOptions, MatchOptions, ReplaceOptions, Shape, ValueSpec};
pub use pattern::{Pattern, Target};
pub use replace::replace;
pub use runtime::Executor;
pub use template::{Template, TemplateError};
pub use term::{Keyword, Term};

/// Compile a pattern into a reusable handle
///
/// Failures carry a structured [`ErrorCode`], the engine's message and the
/// offending fragment of the pattern.
pub fn compile(pattern: &[u8], options: &CompileOptions) -> Result<Pattern> {
    Pattern::compile(pattern, options)
}
