//! Engine boundary
//!
//! Wraps the `regex` crate's byte matcher behind the three operations this
//! layer needs: compile, match with a requested number of capture slots, and
//! substitute. Nothing outside this module touches the matcher directly.

use crate::diagnose;
use crate::error::CompileError;
use crate::groups::GroupTable;
use crate::options::CompileOptions;
use crate::template::Template;
use regex::bytes::{Regex, RegexBuilder};

/// One capture slot: the byte range of a group, or `None` if it did not
/// participate in the match
pub type Slot = Option<(usize, usize)>;

/// A compiled pattern
#[derive(Debug, Clone)]
pub struct Engine {
    regex: Regex,
    groups: GroupTable,
}

impl Engine {
    /// Compile a pattern
    pub fn compile(pattern: &[u8], options: &CompileOptions) -> Result<Self, CompileError> {
        let source = std::str::from_utf8(pattern).map_err(|e| diagnose::invalid_utf8(pattern, &e))?;

        let mut builder = RegexBuilder::new(source);
        builder.case_insensitive(!options.case_sensitive);
        if let Some(budget) = options
            .max_mem
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| n > 0)
        {
            builder.size_limit(budget).dfa_size_limit(budget);
        }

        let regex = builder
            .build()
            .map_err(|e| diagnose::classify(source, !options.case_sensitive, &e))?;
        let groups = GroupTable::from_slot_names(regex.capture_names());
        Ok(Engine { regex, groups })
    }

    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }

    /// Number of capturing groups, not counting the whole match
    pub fn group_count(&self) -> usize {
        self.groups.group_count()
    }

    /// The pattern source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Search `subject` from `offset` (unanchored), reporting `slots` capture
    /// slots, slot 0 being the whole match.
    ///
    /// Asking for zero slots only tests for a match and asking for one only
    /// locates the whole match; neither pays for group tracking. Offsets
    /// outside the subject never match.
    pub fn search(&self, subject: &[u8], offset: i64, slots: usize) -> Option<Vec<Slot>> {
        let start = usize::try_from(offset).ok().filter(|&s| s <= subject.len())?;

        match slots {
            0 => self.regex.is_match_at(subject, start).then(Vec::new),
            1 => self
                .regex
                .find_at(subject, start)
                .map(|m| vec![Some((m.start(), m.end()))]),
            n => {
                let mut locations = self.regex.capture_locations();
                self.regex.captures_read_at(&mut locations, subject, start)?;
                Some((0..n).map(|i| locations.get(i)).collect())
            }
        }
    }

    /// Substitute the first (or, with `global`, every non-overlapping)
    /// match, left to right. `None` if nothing matched.
    pub fn substitute(&self, subject: &[u8], template: &Template, global: bool) -> Option<Vec<u8>> {
        let mut out = Vec::with_capacity(subject.len());
        let mut last_end = 0;
        let mut replaced = 0usize;

        for caps in self.regex.captures_iter(subject) {
            let Some(whole) = caps.get(0) else { continue };
            out.extend_from_slice(&subject[last_end..whole.start()]);
            template.expand(&caps, &mut out);
            last_end = whole.end();
            replaced += 1;
            if !global {
                break;
            }
        }

        if replaced == 0 {
            return None;
        }
        out.extend_from_slice(&subject[last_end..]);
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn engine(pattern: &str) -> Engine {
        Engine::compile(pattern.as_bytes(), &CompileOptions::default()).unwrap()
    }

    #[test]
    fn test_group_table() {
        let engine = engine(r"(?P<a>x)(y)(?P<c>z)?");
        assert_eq!(engine.group_count(), 3);
        assert_eq!(engine.groups().index_of("c"), Some(3));
    }

    #[test]
    fn test_search_slot_counts() {
        let engine = engine(r"(\d+)-(\d+)");
        assert_eq!(engine.search(b"12-34", 0, 0), Some(vec![]));
        assert_eq!(engine.search(b"12-34", 0, 1), Some(vec![Some((0, 5))]));
        assert_eq!(
            engine.search(b"12-34", 0, 3),
            Some(vec![Some((0, 5)), Some((0, 2)), Some((3, 5))])
        );
        assert_eq!(engine.search(b"ab", 0, 3), None);
    }

    #[test]
    fn test_search_offset() {
        let engine = engine("a");
        assert_eq!(engine.search(b"aba", 1, 1), Some(vec![Some((2, 3))]));
        assert_eq!(engine.search(b"aba", 3, 1), None);
        assert_eq!(engine.search(b"aba", 4, 1), None);
        assert_eq!(engine.search(b"aba", -1, 1), None);
    }

    #[test]
    fn test_start_anchor_does_not_match_at_offset() {
        let engine = engine("^b");
        assert_eq!(engine.search(b"ab", 1, 0), None);
    }

    #[test]
    fn test_caseless_compile() {
        let engine = Engine::compile(b"abc", &CompileOptions::new().caseless()).unwrap();
        assert_eq!(engine.search(b"xABC", 0, 1), Some(vec![Some((1, 4))]));
    }

    #[test]
    fn test_compile_errors() {
        let err = Engine::compile(b"(foo", &CompileOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingParen);

        let err = Engine::compile(b"a\xff", &CompileOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadUtf8);
    }

    #[test]
    fn test_small_memory_budget() {
        let options = CompileOptions::new().max_mem(16);
        let err = Engine::compile(br"(\w+\s*){64}", &options).unwrap_err();
        assert_eq!(err.code, ErrorCode::PatternTooLarge);

        // Non-positive budgets keep the defaults
        assert!(Engine::compile(br"(\w+\s*){64}", &CompileOptions::new().max_mem(0)).is_ok());
        assert!(Engine::compile(br"(\w+\s*){64}", &CompileOptions::new().max_mem(-1)).is_ok());
    }

    #[test]
    fn test_substitute() {
        let engine = engine("o");
        let template = Template::parse(b"0").unwrap();
        assert_eq!(
            engine.substitute(b"foo boo", &template, false),
            Some(b"f0o boo".to_vec())
        );
        assert_eq!(
            engine.substitute(b"foo boo", &template, true),
            Some(b"f00 b00".to_vec())
        );
        assert_eq!(engine.substitute(b"bar", &template, true), None);
    }

    #[test]
    fn test_substitute_empty_matches() {
        let engine = engine("x*");
        let template = Template::parse(b"-").unwrap();
        assert_eq!(
            engine.substitute(b"abc", &template, true),
            Some(b"-a-b-c-".to_vec())
        );
    }
}
