use std::collections::VecDeque;

use super::{pointer::PointerId, points_to_set::PointsToSet};

/// Pending propagations. Entries for the same pointer are not merged; the
/// delta is recomputed against the pointer's set when popped.
#[derive(Debug, Default)]
pub struct WorkList {
    entries: VecDeque<(PointerId, PointsToSet)>,
}

impl WorkList {
    #[inline]
    pub fn push(&mut self, pointer: PointerId, pts: PointsToSet) {
        self.entries.push_back((pointer, pts));
    }

    #[inline]
    pub fn pop(&mut self) -> Option<(PointerId, PointsToSet)> {
        self.entries.pop_front()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
