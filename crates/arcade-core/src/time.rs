//! Time primitives for ARCADE
//!
//! Time is a finite, totally ordered sequence of discrete steps. A
//! [`Timeline`] knows its first and last step and the `next`/`prev`
//! successor relation; every time-indexed fact is addressed by a [`Step`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ArcadeError, ArcadeResult};

/// A discrete time step, indexed from zero
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Step(pub u32);

impl Step {
    pub const ZERO: Step = Step(0);

    #[inline]
    pub fn new(index: u32) -> Self {
        Step(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Successor, ignoring any timeline bound
    #[inline]
    pub fn succ(self) -> Step {
        Step(self.0.saturating_add(1))
    }

    /// Predecessor, `None` at step zero
    #[inline]
    pub fn pred(self) -> Option<Step> {
        self.0.checked_sub(1).map(Step)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A finite sequence of steps `t0 .. t(len-1)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeline")]
pub struct Timeline {
    len: u32,
}

/// Wire form of a [`Timeline`], checked on the way in
#[derive(Deserialize)]
struct RawTimeline {
    len: u32,
}

impl TryFrom<RawTimeline> for Timeline {
    type Error = ArcadeError;

    fn try_from(raw: RawTimeline) -> ArcadeResult<Self> {
        Timeline::new(raw.len)
    }
}

impl Timeline {
    /// Create a timeline with `len` steps. A timeline has at least one step.
    pub fn new(len: u32) -> ArcadeResult<Self> {
        if len == 0 {
            return Err(ArcadeError::EmptyTimeline);
        }
        Ok(Timeline { len })
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub fn first(&self) -> Step {
        Step::ZERO
    }

    #[inline]
    pub fn last(&self) -> Step {
        Step(self.len - 1)
    }

    #[inline]
    pub fn contains(&self, step: Step) -> bool {
        step.0 < self.len
    }

    #[inline]
    pub fn is_first(&self, step: Step) -> bool {
        step == self.first()
    }

    #[inline]
    pub fn is_last(&self, step: Step) -> bool {
        step == self.last()
    }

    /// `t.next`, `None` at the last step
    pub fn next(&self, step: Step) -> Option<Step> {
        let next = step.succ();
        (self.contains(step) && self.contains(next)).then_some(next)
    }

    /// `t.prev`, `None` at the first step
    pub fn prev(&self, step: Step) -> Option<Step> {
        if self.contains(step) {
            step.pred()
        } else {
            None
        }
    }

    /// Fail with [`ArcadeError::StepOutOfRange`] unless the step exists
    pub fn check(&self, step: Step) -> ArcadeResult<()> {
        if self.contains(step) {
            Ok(())
        } else {
            Err(ArcadeError::StepOutOfRange {
                step,
                len: self.len,
            })
        }
    }

    /// All steps in order
    pub fn iter(&self) -> impl Iterator<Item = Step> + Clone {
        (0..self.len).map(Step)
    }

    /// Steps in `from..=to`, clipped to the timeline
    pub fn range(&self, from: Step, to: Step) -> impl Iterator<Item = Step> {
        let end = to.0.min(self.len - 1);
        (from.0..=end).map(Step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_timeline_rejected() {
        assert!(matches!(Timeline::new(0), Err(ArcadeError::EmptyTimeline)));
    }

    #[test]
    fn test_first_last_next_prev() {
        let timeline = Timeline::new(3).unwrap();
        assert_eq!(timeline.first(), Step(0));
        assert_eq!(timeline.last(), Step(2));
        assert_eq!(timeline.next(Step(1)), Some(Step(2)));
        assert_eq!(timeline.next(Step(2)), None);
        assert_eq!(timeline.prev(Step(0)), None);
        assert_eq!(timeline.prev(Step(2)), Some(Step(1)));
        assert_eq!(timeline.next(Step(9)), None);
    }

    #[test]
    fn test_empty_timeline_not_deserialized() {
        assert!(serde_json::from_str::<Timeline>(r#"{"len":0}"#).is_err());
        let timeline: Timeline = serde_json::from_str(r#"{"len":3}"#).unwrap();
        assert_eq!(timeline.last(), Step(2));
        assert_eq!(serde_json::to_string(&timeline).unwrap(), r#"{"len":3}"#);
    }

    #[test]
    fn test_single_step_timeline() {
        let timeline = Timeline::new(1).unwrap();
        assert!(timeline.is_first(Step(0)));
        assert!(timeline.is_last(Step(0)));
        assert_eq!(timeline.iter().count(), 1);
    }

    #[test]
    fn test_range_is_clipped() {
        let timeline = Timeline::new(4).unwrap();
        let steps: Vec<_> = timeline.range(Step(2), Step(10)).collect();
        assert_eq!(steps, vec![Step(2), Step(3)]);
        assert_eq!(timeline.range(Step(3), Step(1)).count(), 0);
    }

    #[test]
    fn test_check_out_of_range() {
        let timeline = Timeline::new(2).unwrap();
        assert!(timeline.check(Step(1)).is_ok());
        assert!(matches!(
            timeline.check(Step(2)),
            Err(ArcadeError::StepOutOfRange { len: 2, .. })
        ));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_next_prev_inverse(len in 1u32..64, index in 0u32..64) {
                let timeline = Timeline::new(len).unwrap();
                let step = Step(index);
                if let Some(next) = timeline.next(step) {
                    prop_assert_eq!(timeline.prev(next), Some(step));
                }
                if let Some(prev) = timeline.prev(step) {
                    prop_assert_eq!(timeline.next(prev), Some(step));
                }
            }

            #[test]
            fn prop_range_stays_on_timeline(len in 1u32..64, from in 0u32..80, to in 0u32..80) {
                let timeline = Timeline::new(len).unwrap();
                for step in timeline.range(Step(from), Step(to)) {
                    prop_assert!(timeline.contains(step));
                    prop_assert!(step >= Step(from) && step <= Step(to));
                }
            }
        }
    }
}
