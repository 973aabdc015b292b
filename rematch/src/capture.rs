//! Capture planning, shaping and reference resolution
//!
//! The planner decides how many slots to ask the engine for, the shaper turns
//! a slot into a result value, and the resolver answers an explicit reference
//! list against the slots and the pattern's group names.

use crate::engine::Slot;
use crate::error::{Error, ReferenceError, Result};
use crate::groups::GroupTable;
use crate::options::{CaptureRef, Shape, ValueSpec};

/// Number of capture slots to request for `spec`, given `group_count`
/// capturing groups. Slot 0 is always the whole match.
///
/// `AllButFirst` and `List` request every group and select afterwards, so
/// list references can address any group.
pub fn slots_for(group_count: usize, spec: &ValueSpec) -> usize {
    match spec {
        ValueSpec::None => 0,
        ValueSpec::First => 1,
        ValueSpec::All | ValueSpec::AllButFirst | ValueSpec::List(_) => group_count + 1,
    }
}

/// One reported capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureValue {
    /// Byte offset and length into the subject; `(-1, 0)` when unmatched
    Index { offset: i64, length: i64 },
    /// Copy of the captured bytes; empty when unmatched
    Bytes(Vec<u8>),
}

impl CaptureValue {
    /// The placeholder for a group that did not participate
    pub fn unmatched(shape: Shape) -> Self {
        match shape {
            Shape::Index => CaptureValue::Index {
                offset: -1,
                length: 0,
            },
            Shape::Binary => CaptureValue::Bytes(Vec::new()),
        }
    }

    pub fn is_unmatched(&self) -> bool {
        match self {
            CaptureValue::Index { offset, .. } => *offset < 0,
            CaptureValue::Bytes(bytes) => bytes.is_empty(),
        }
    }
}

/// Turns slots into [`CaptureValue`]s of one shape
///
/// Copies are reserved fallibly; an optional byte budget caps how much the
/// shaper may copy in total.
#[derive(Debug)]
pub(crate) struct Shaper<'s> {
    subject: &'s [u8],
    shape: Shape,
    budget: Option<usize>,
}

impl<'s> Shaper<'s> {
    pub(crate) fn new(subject: &'s [u8], shape: Shape) -> Self {
        Shaper {
            subject,
            shape,
            budget: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_budget(mut self, bytes: usize) -> Self {
        self.budget = Some(bytes);
        self
    }

    pub(crate) fn unmatched(&self) -> CaptureValue {
        CaptureValue::unmatched(self.shape)
    }

    /// Shape one slot. Empty spans are reported like unmatched ones.
    pub(crate) fn shape(&mut self, slot: Slot) -> Result<CaptureValue> {
        let Some((start, end)) = slot.filter(|(start, end)| start < end) else {
            return Ok(self.unmatched());
        };
        match self.shape {
            Shape::Index => Ok(CaptureValue::Index {
                offset: start as i64,
                length: (end - start) as i64,
            }),
            Shape::Binary => {
                let subject = self.subject;
                self.copy(&subject[start..end]).map(CaptureValue::Bytes)
            }
        }
    }

    fn copy(&mut self, bytes: &[u8]) -> Result<Vec<u8>> {
        let len = bytes.len();
        if let Some(budget) = self.budget.as_mut() {
            *budget = budget.checked_sub(len).ok_or_else(|| exhausted(len))?;
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| exhausted(len))?;
        buf.extend_from_slice(bytes);
        Ok(buf)
    }
}

fn exhausted(len: usize) -> Error {
    tracing::warn!(bytes = len, "could not allocate capture value");
    Error::Alloc(len)
}

/// Shape every slot in `slots[from..]`, in order
pub(crate) fn shape_range(
    slots: &[Slot],
    from: usize,
    shaper: &mut Shaper<'_>,
) -> Result<Vec<CaptureValue>> {
    slots
        .iter()
        .skip(from)
        .map(|slot| shaper.shape(*slot))
        .collect()
}

/// Resolve an explicit reference list, one value per reference, in
/// reference order.
///
/// Ordinals must be positive; an ordinal with no slot and a name the pattern
/// does not have both yield the unmatched placeholder. Any allocation or
/// decoding failure aborts the whole list.
pub(crate) fn resolve(
    refs: &[CaptureRef],
    slots: &[Slot],
    groups: &GroupTable,
    shaper: &mut Shaper<'_>,
) -> Result<Vec<CaptureValue>> {
    refs.iter()
        .map(|reference| match reference {
            CaptureRef::Ordinal(0) => Err(Error::Reference(ReferenceError::Unsupported)),
            CaptureRef::Ordinal(id) => match slots.get(*id as usize) {
                Some(slot) => shaper.shape(*slot),
                None => Ok(shaper.unmatched()),
            },
            CaptureRef::Name(name) => match groups.index_of(name) {
                Some(index) => shaper.shape(slots.get(index).copied().flatten()),
                None => Ok(shaper.unmatched()),
            },
            CaptureRef::Undecodable(err) => Err(Error::Reference(*err)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBJECT: &[u8] = b"2024-05-";

    // (?P<year>\d+)-(?P<month>\d+)-(?P<day>\d+)? against SUBJECT
    fn slots() -> Vec<Slot> {
        vec![Some((0, 8)), Some((0, 4)), Some((5, 7)), None]
    }

    fn groups() -> GroupTable {
        GroupTable::from_slot_names([None, Some("year"), Some("month"), Some("day")])
    }

    fn bytes(b: &[u8]) -> CaptureValue {
        CaptureValue::Bytes(b.to_vec())
    }

    #[test]
    fn test_slots_for() {
        assert_eq!(slots_for(3, &ValueSpec::None), 0);
        assert_eq!(slots_for(3, &ValueSpec::First), 1);
        assert_eq!(slots_for(3, &ValueSpec::All), 4);
        assert_eq!(slots_for(3, &ValueSpec::AllButFirst), 4);
        assert_eq!(slots_for(3, &ValueSpec::List(vec![CaptureRef::Ordinal(1)])), 4);
        assert_eq!(slots_for(0, &ValueSpec::All), 1);
    }

    #[test]
    fn test_shape_index() {
        let mut shaper = Shaper::new(SUBJECT, Shape::Index);
        assert_eq!(
            shaper.shape(Some((5, 7))).unwrap(),
            CaptureValue::Index {
                offset: 5,
                length: 2
            }
        );
        assert_eq!(shaper.shape(None).unwrap(), CaptureValue::unmatched(Shape::Index));
    }

    #[test]
    fn test_empty_span_is_unmatched() {
        let mut shaper = Shaper::new(SUBJECT, Shape::Index);
        assert!(shaper.shape(Some((3, 3))).unwrap().is_unmatched());
        let mut shaper = Shaper::new(SUBJECT, Shape::Binary);
        assert_eq!(shaper.shape(Some((3, 3))).unwrap(), bytes(b""));
    }

    #[test]
    fn test_shape_range_skips_whole_match() {
        let mut shaper = Shaper::new(SUBJECT, Shape::Binary);
        let values = shape_range(&slots(), 1, &mut shaper).unwrap();
        assert_eq!(values, vec![bytes(b"2024"), bytes(b"05"), bytes(b"")]);
    }

    #[test]
    fn test_resolve_preserves_reference_order() {
        let refs = vec![
            CaptureRef::Ordinal(2),
            CaptureRef::Name("year".into()),
            CaptureRef::Ordinal(1),
        ];
        let mut shaper = Shaper::new(SUBJECT, Shape::Binary);
        let values = resolve(&refs, &slots(), &groups(), &mut shaper).unwrap();
        assert_eq!(values, vec![bytes(b"05"), bytes(b"2024"), bytes(b"2024")]);
    }

    #[test]
    fn test_resolve_missing_references_are_unmatched() {
        let refs = vec![
            CaptureRef::Ordinal(9),
            CaptureRef::Name("hour".into()),
            CaptureRef::Name("day".into()),
        ];
        let mut shaper = Shaper::new(SUBJECT, Shape::Index);
        let values = resolve(&refs, &slots(), &groups(), &mut shaper).unwrap();
        assert!(values.iter().all(CaptureValue::is_unmatched));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_resolve_rejects_undecodable_and_zero() {
        let mut shaper = Shaper::new(SUBJECT, Shape::Binary);
        let refs = vec![
            CaptureRef::Ordinal(1),
            CaptureRef::Undecodable(ReferenceError::Text),
        ];
        assert_eq!(
            resolve(&refs, &slots(), &groups(), &mut shaper),
            Err(Error::Reference(ReferenceError::Text))
        );
        assert_eq!(
            resolve(&[CaptureRef::Ordinal(0)], &slots(), &groups(), &mut shaper),
            Err(Error::Reference(ReferenceError::Unsupported))
        );
    }

    #[test]
    fn test_exhausted_budget_aborts() {
        let mut shaper = Shaper::new(SUBJECT, Shape::Binary).with_budget(5);
        assert_eq!(
            shape_range(&slots(), 0, &mut shaper),
            Err(Error::Alloc(8))
        );

        let mut shaper = Shaper::new(SUBJECT, Shape::Binary).with_budget(5);
        let refs = vec![CaptureRef::Ordinal(1), CaptureRef::Ordinal(2)];
        assert_eq!(
            resolve(&refs, &slots(), &groups(), &mut shaper),
            Err(Error::Alloc(2))
        );
    }

    #[test]
    fn test_index_shape_needs_no_budget() {
        let mut shaper = Shaper::new(SUBJECT, Shape::Index).with_budget(0);
        assert!(shape_range(&slots(), 0, &mut shaper).is_ok());
    }
}
