//! Replacement
//!
//! Substitutes the first match, or every non-overlapping match with
//! `global`, using a template with group references. Failure is coarse: an
//! unusable template and a subject without a match both come back as
//! [`Error::NotReplaced`].

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::options::{CompileOptions, ReplaceOptions};
use crate::pattern::Target;
use crate::template::Template;

/// Replace matches of `target` in `subject` with `template`
///
/// Inline patterns are compiled with default options; there is no caseless
/// override for replacement.
pub fn replace(
    subject: &[u8],
    target: Target<'_>,
    template: &[u8],
    options: &ReplaceOptions,
) -> Result<Vec<u8>> {
    let inline;
    let engine = match target {
        Target::Handle(pattern) => pattern.engine(),
        Target::Inline(source) => {
            inline = Engine::compile(source, &CompileOptions::default()).map_err(|e| {
                tracing::debug!(code = %e.code, "inline pattern failed to compile");
                Error::InvalidArgument
            })?;
            &inline
        }
    };

    let template = Template::parse(template)
        .and_then(|t| t.bind(engine.groups()))
        .map_err(|e| {
            tracing::debug!(error = %e, "unusable replacement template");
            Error::NotReplaced
        })?;

    engine
        .substitute(subject, &template, options.global)
        .ok_or(Error::NotReplaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    #[test]
    fn test_first_only() {
        let out = replace(b"a1b2c3", r"\d".into(), b"#", &ReplaceOptions::default()).unwrap();
        assert_eq!(out, b"a#b2c3");
    }

    #[test]
    fn test_global() {
        let out = replace(b"a1b2c3", r"\d".into(), b"#", &ReplaceOptions::new().global()).unwrap();
        assert_eq!(out, b"a#b#c#");
    }

    #[test]
    fn test_backreferences() {
        let out = replace(
            b"john smith",
            r"(?P<first>\w+) (\w+)".into(),
            b"\\2, \\g{first}",
            &ReplaceOptions::default(),
        )
        .unwrap();
        assert_eq!(out, b"smith, john");
    }

    #[test]
    fn test_no_match_is_not_replaced() {
        assert_eq!(
            replace(b"abc", "x".into(), b"y", &ReplaceOptions::default()),
            Err(Error::NotReplaced)
        );
    }

    #[test]
    fn test_bad_template_is_not_replaced() {
        assert_eq!(
            replace(b"abc", "(b)".into(), b"\\2", &ReplaceOptions::default()),
            Err(Error::NotReplaced)
        );
        assert_eq!(
            replace(b"abc", "b".into(), b"\\q", &ReplaceOptions::default()),
            Err(Error::NotReplaced)
        );
    }

    #[test]
    fn test_handle() {
        let pattern = Pattern::compile(b"o+", &CompileOptions::new().caseless()).unwrap();
        let out = replace(b"fOo bOO", Target::Handle(&pattern), b"0", &ReplaceOptions::new().global());
        assert_eq!(out.unwrap(), b"f0 b0");
    }

    #[test]
    fn test_inline_compile_failure() {
        assert_eq!(
            replace(b"abc", "[".into(), b"", &ReplaceOptions::default()),
            Err(Error::InvalidArgument)
        );
    }
}
