use std::collections::HashSet;

use super::heap::ObjId;

/// Abstract objects a pointer may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsToSet {
    objs: HashSet<ObjId>,
}

impl PointsToSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(obj: ObjId) -> Self {
        let mut set = Self::new();
        set.add(obj);
        set
    }

    #[inline]
    pub fn contains(&self, obj: ObjId) -> bool {
        self.objs.contains(&obj)
    }

    /// Returns `false` if `obj` was already present.
    #[inline]
    pub fn add(&mut self, obj: ObjId) -> bool {
        self.objs.insert(obj)
    }

    /// Adds every object of `other` and returns the ones that were new.
    pub fn union(&mut self, other: &PointsToSet) -> PointsToSet {
        other.iter().filter(|obj| self.add(*obj)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjId> + '_ {
        self.objs.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objs.is_empty()
    }

    pub fn is_subset(&self, other: &PointsToSet) -> bool {
        self.objs.is_subset(&other.objs)
    }

    pub fn sorted(&self) -> Vec<ObjId> {
        let mut objs: Vec<_> = self.iter().collect();
        objs.sort();
        objs
    }
}

impl FromIterator<ObjId> for PointsToSet {
    fn from_iter<I: IntoIterator<Item = ObjId>>(iter: I) -> Self {
        Self {
            objs: iter.into_iter().collect(),
        }
    }
}
