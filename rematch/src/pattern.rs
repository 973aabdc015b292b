//! Compiled pattern handles
//!
//! A [`Pattern`] owns its compiled engine and is never mutated after
//! construction, so one handle (usually behind an `Arc`) can serve any number
//! of concurrent matches and replacements without locking. The engine is
//! released when the last reference is dropped.

use crate::engine::Engine;
use crate::error::Result;
use crate::groups::GroupTable;
use crate::options::CompileOptions;

/// A compiled, immutable pattern
#[derive(Debug)]
pub struct Pattern {
    engine: Engine,
    options: CompileOptions,
}

impl Pattern {
    /// Compile a pattern
    pub fn compile(pattern: &[u8], options: &CompileOptions) -> Result<Self> {
        let engine = Engine::compile(pattern, options).inspect_err(|e| {
            tracing::debug!(code = %e.code, fragment = %e.fragment, "pattern failed to compile");
        })?;
        Ok(Pattern {
            engine,
            options: options.clone(),
        })
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The options the pattern was compiled with
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// The pattern source
    pub fn as_str(&self) -> &str {
        self.engine.as_str()
    }

    /// Number of capturing groups, not counting the whole match
    pub fn group_count(&self) -> usize {
        self.engine.group_count()
    }

    pub fn groups(&self) -> &GroupTable {
        self.engine.groups()
    }
}

impl Drop for Pattern {
    fn drop(&mut self) {
        tracing::trace!(pattern = self.engine.as_str(), "releasing compiled pattern");
    }
}

/// The pattern a match or replacement runs against
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A precompiled handle
    Handle(&'a Pattern),
    /// Pattern source compiled for this call only
    Inline(&'a [u8]),
}

impl<'a> From<&'a Pattern> for Target<'a> {
    fn from(pattern: &'a Pattern) -> Self {
        Target::Handle(pattern)
    }
}

impl<'a> From<&'a [u8]> for Target<'a> {
    fn from(source: &'a [u8]) -> Self {
        Target::Inline(source)
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(source: &'a str) -> Self {
        Target::Inline(source.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorCode};
    use std::sync::Arc;

    #[test]
    fn test_compile_ok() {
        let pattern = Pattern::compile(br"(?P<key>\w+)=(\w+)", &CompileOptions::default()).unwrap();
        assert_eq!(pattern.group_count(), 2);
        assert_eq!(pattern.groups().index_of("key"), Some(1));
        assert_eq!(pattern.as_str(), r"(?P<key>\w+)=(\w+)");
        assert!(pattern.options().case_sensitive);
    }

    #[test]
    fn test_compile_error_is_structured() {
        let err = Pattern::compile(b"(foo", &CompileOptions::default()).unwrap_err();
        match err {
            Error::Compile(e) => {
                assert_eq!(e.code, ErrorCode::MissingParen);
                assert!(!e.message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_handle_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pattern>();
        assert_send_sync::<Arc<Pattern>>();
    }
}
