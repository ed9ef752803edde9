use std::collections::HashMap;

use crate::ir::{index_type, ClassId, Program, Stmt, StmtId};

index_type!(ObjId, "o");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjType {
    Class(ClassId),
    Array(ClassId),
}

impl ObjType {
    /// The class that methods are dispatched on; arrays have none.
    #[inline]
    pub fn class(self) -> Option<ClassId> {
        match self {
            ObjType::Class(c) => Some(c),
            ObjType::Array(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obj {
    pub alloc: StmtId,
    pub ty: ObjType,
}

/// Maps allocation statements to abstract objects.
pub trait HeapModel {
    /// The object for `alloc`, the same one on every call. `None` if `alloc`
    /// allocates nothing.
    fn obj(&mut self, program: &Program, alloc: StmtId) -> Option<ObjId>;

    fn get(&self, obj: ObjId) -> &Obj;

    fn num_objects(&self) -> usize;
}

/// One object per allocation site.
#[derive(Debug, Default)]
pub struct AllocationSiteHeap {
    objs: Vec<Obj>,
    sites: HashMap<StmtId, ObjId>,
}

impl HeapModel for AllocationSiteHeap {
    fn obj(&mut self, program: &Program, alloc: StmtId) -> Option<ObjId> {
        if let Some(obj) = self.sites.get(&alloc) {
            return Some(*obj);
        }
        let Stmt::New { class, array, .. } = program.stmt(alloc) else { return None };
        let ty = if *array {
            ObjType::Array(*class)
        } else {
            ObjType::Class(*class)
        };
        let id = ObjId::new(self.objs.len());
        self.objs.push(Obj { alloc, ty });
        self.sites.insert(alloc, id);
        Some(id)
    }

    #[inline]
    fn get(&self, obj: ObjId) -> &Obj {
        &self.objs[obj.index()]
    }

    #[inline]
    fn num_objects(&self) -> usize {
        self.objs.len()
    }
}
