//=========================================================================
// Loading Sequences
//
// A loading sequence is an ordered, single-pass list of work items run
// against a target. Each item yields a progress report; a caller drives
// the sequence one item at a time (e.g. one per frame behind a loading
// screen) or drains it at once.
//
// Sequences are consumed as they advance and cannot be restarted. An
// item that fails aborts the sequence: its error is reported once and
// the remaining items are discarded.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::VecDeque;
use std::fmt;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;

//=== Progress ============================================================

/// Report produced by one completed work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Human-readable status, shown by loading screens.
    Message(String),

    /// Work done, nothing to report.
    Tick,
}

type Step<T> = Box<dyn FnOnce(&mut T) -> Result<Progress, SceneError>>;

//=== LoadingSequence =====================================================

pub struct LoadingSequence<T> {
    steps: VecDeque<Step<T>>,
    total: usize,
}

impl<T: 'static> LoadingSequence<T> {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            total: 0,
        }
    }

    /// A sequence with nothing to do.
    pub fn empty() -> Self {
        Self::new()
    }

    /// Appends a work item (builder style).
    pub fn step<F>(mut self, work: F) -> Self
    where
        F: FnOnce(&mut T) -> Result<Progress, SceneError> + 'static,
    {
        self.push(work);
        self
    }

    /// Appends an item that only reports `message`.
    pub fn message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.step(move |_| Ok(Progress::Message(message)))
    }

    /// Appends every item of `other` after the current ones.
    pub fn then(mut self, other: LoadingSequence<T>) -> Self {
        self.total += other.steps.len();
        self.steps.extend(other.steps);
        self
    }

    pub fn push<F>(&mut self, work: F)
    where
        F: FnOnce(&mut T) -> Result<Progress, SceneError> + 'static,
    {
        self.steps.push_back(Box::new(work));
        self.total += 1;
    }

    //--- Driving ----------------------------------------------------------

    /// Runs the next item against `target`.
    ///
    /// Returns `None` once the sequence is exhausted.
    pub fn advance(&mut self, target: &mut T) -> Option<Result<Progress, SceneError>> {
        let work = self.steps.pop_front()?;
        let result = work(target);
        if result.is_err() {
            self.steps.clear();
        }
        Some(result)
    }

    /// Runs every remaining item, stopping at the first error.
    pub fn drain(mut self, target: &mut T) -> Result<Vec<Progress>, SceneError> {
        let mut reports = Vec::with_capacity(self.remaining());
        while let Some(result) = self.advance(target) {
            reports.push(result?);
        }
        Ok(reports)
    }

    //--- Status -----------------------------------------------------------

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_exhausted(&self) -> bool {
        self.steps.is_empty()
    }

    /// Completed share of the work, in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        (self.total - self.steps.len()) as f32 / self.total as f32
    }
}

impl LoadingSequence<()> {
    /// Adapts a target-less sequence so it can run inside a sequence for
    /// any target (resource loads chained into a scene's preload).
    pub fn retarget<U: 'static>(self) -> LoadingSequence<U> {
        let mut adapted = LoadingSequence::new();
        for work in self.steps {
            adapted.push(move |_: &mut U| work(&mut ()));
        }
        adapted
    }
}

impl<T: 'static> Default for LoadingSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LoadingSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingSequence")
            .field("remaining", &self.steps.len())
            .field("total", &self.total)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_one_item_at_a_time() {
        let mut seq = LoadingSequence::<Vec<u32>>::new()
            .message("Loading Sector")
            .step(|v| {
                v.push(1);
                Ok(Progress::Tick)
            });
        let mut target = Vec::new();

        assert_eq!(
            seq.advance(&mut target).unwrap().unwrap(),
            Progress::Message("Loading Sector".into())
        );
        assert!(target.is_empty());
        assert_eq!(seq.fraction(), 0.5);

        assert_eq!(seq.advance(&mut target).unwrap().unwrap(), Progress::Tick);
        assert_eq!(target, [1]);
        assert!(seq.advance(&mut target).is_none());
        assert!(seq.is_exhausted());
    }

    #[test]
    fn failed_item_discards_the_rest() {
        let mut seq = LoadingSequence::<u32>::new()
            .step(|_| Err(SceneError::config("bad asset")))
            .step(|n| {
                *n += 1;
                Ok(Progress::Tick)
            });
        let mut target = 0;

        assert!(seq.advance(&mut target).unwrap().is_err());
        assert!(seq.advance(&mut target).is_none());
        assert_eq!(target, 0);
    }

    #[test]
    fn then_appends_in_order() {
        let first = LoadingSequence::<()>::new().message("a");
        let second = LoadingSequence::<()>::new().message("b").message("c");

        let reports = first.then(second).drain(&mut ()).unwrap();
        assert_eq!(
            reports,
            ["a", "b", "c"].map(|m| Progress::Message(m.to_owned()))
        );
    }

    #[test]
    fn retarget_keeps_items() {
        let seq = LoadingSequence::<()>::new().message("cached").retarget::<String>();
        assert_eq!(seq.total(), 1);

        let mut target = String::from("scene");
        let reports = seq.drain(&mut target).unwrap();
        assert_eq!(reports, [Progress::Message("cached".into())]);
    }

    #[test]
    fn empty_sequence_reports_complete() {
        let seq = LoadingSequence::<()>::empty();
        assert_eq!(seq.fraction(), 1.0);
        assert_eq!(seq.remaining(), 0);
    }
}
