use std::collections::HashMap;

use super::{heap::ObjId, points_to_set::PointsToSet};
use crate::ir::{index_type, FieldId, VarId};

index_type!(PointerId, "p");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pointer {
    Var(VarId),
    StaticField(FieldId),
    InstanceField(ObjId, FieldId),
}

/// Interned pointers, each owning one points-to set.
#[derive(Debug, Default)]
pub struct Pointers {
    pointers: Vec<Pointer>,
    pts: Vec<PointsToSet>,
    ids: HashMap<Pointer, PointerId>,
}

impl Pointers {
    fn intern(&mut self, pointer: Pointer) -> PointerId {
        if let Some(id) = self.ids.get(&pointer) {
            return *id;
        }
        let id = PointerId::new(self.pointers.len());
        self.pointers.push(pointer);
        self.pts.push(PointsToSet::new());
        self.ids.insert(pointer, id);
        id
    }

    #[inline]
    pub fn var(&mut self, var: VarId) -> PointerId {
        self.intern(Pointer::Var(var))
    }

    #[inline]
    pub fn static_field(&mut self, field: FieldId) -> PointerId {
        self.intern(Pointer::StaticField(field))
    }

    #[inline]
    pub fn instance_field(&mut self, obj: ObjId, field: FieldId) -> PointerId {
        self.intern(Pointer::InstanceField(obj, field))
    }

    /// Looks up an existing pointer without creating it.
    #[inline]
    pub fn get(&self, pointer: Pointer) -> Option<PointerId> {
        self.ids.get(&pointer).copied()
    }

    #[inline]
    pub fn pointer(&self, id: PointerId) -> Pointer {
        self.pointers[id.index()]
    }

    #[inline]
    pub fn pts(&self, id: PointerId) -> &PointsToSet {
        &self.pts[id.index()]
    }

    #[inline]
    pub fn pts_mut(&mut self, id: PointerId) -> &mut PointsToSet {
        &mut self.pts[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointerId, Pointer)> + '_ {
        self.pointers
            .iter()
            .enumerate()
            .map(|(i, p)| (PointerId::new(i), *p))
    }
}
