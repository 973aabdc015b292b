//! Matching
//!
//! Resolves the pattern (handle or inline source), plans how many capture
//! slots the engine must report, runs one unanchored search and shapes the
//! captures the caller selected. A result is either complete or an error;
//! nothing partially shaped is ever returned.

use crate::capture::{self, CaptureValue, Shaper};
use crate::engine::{Engine, Slot};
use crate::error::{Error, Result};
use crate::groups::GroupTable;
use crate::options::{CompileOptions, MatchOptions, ValueSpec};
use crate::pattern::Target;

/// Outcome of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// The pattern did not match
    NoMatch,
    /// The pattern matched and no captures were requested
    Matched,
    /// The pattern matched; one value per selected capture
    Captures(Vec<CaptureValue>),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchResult::NoMatch)
    }

    pub fn captures(&self) -> Option<&[CaptureValue]> {
        match self {
            MatchResult::Captures(values) => Some(values),
            _ => None,
        }
    }
}

/// Match `subject` against `target`
///
/// `options.caseless` is only accepted for inline patterns; a precompiled
/// handle fixes case sensitivity at compile time. An inline pattern that does
/// not compile is an invalid argument here, not a structured compile error.
pub fn run_match(subject: &[u8], target: Target<'_>, options: &MatchOptions) -> Result<MatchResult> {
    let inline;
    let engine = match target {
        Target::Handle(pattern) => {
            if options.caseless {
                tracing::debug!("caseless rejected for a precompiled pattern");
                return Err(Error::InvalidArgument);
            }
            pattern.engine()
        }
        Target::Inline(source) => {
            let compile = CompileOptions {
                case_sensitive: !options.caseless,
                ..CompileOptions::default()
            };
            inline = Engine::compile(source, &compile).map_err(|e| {
                tracing::debug!(code = %e.code, "inline pattern failed to compile");
                Error::InvalidArgument
            })?;
            &inline
        }
    };

    let slots = capture::slots_for(engine.group_count(), &options.value_spec);
    let Some(found) = engine.search(subject, options.offset, slots) else {
        return Ok(MatchResult::NoMatch);
    };

    let mut shaper = Shaper::new(subject, options.shape);
    select(engine.groups(), &found, &options.value_spec, &mut shaper)
}

fn select(
    groups: &GroupTable,
    slots: &[Slot],
    spec: &ValueSpec,
    shaper: &mut Shaper<'_>,
) -> Result<MatchResult> {
    let values = match spec {
        ValueSpec::None => return Ok(MatchResult::Matched),
        ValueSpec::First => vec![shaper.shape(slots.first().copied().flatten())?],
        ValueSpec::All => capture::shape_range(slots, 0, shaper)?,
        ValueSpec::AllButFirst => capture::shape_range(slots, 1, shaper)?,
        ValueSpec::List(refs) => capture::resolve(refs, slots, groups, shaper)?,
    };
    Ok(MatchResult::Captures(values))
}
