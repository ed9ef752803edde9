use std::fmt;

use super::*;
use crate::{call_graph::CallGraph, ir::*};

/// Final pointer-flow graph, points-to sets, and call graph of one solve.
#[derive(Debug)]
pub struct PointerAnalysisResult<H = AllocationSiteHeap> {
    pub(super) pointers: Pointers,
    pub(super) pfg: PointerFlowGraph,
    pub(super) call_graph: CallGraph,
    pub(super) heap: H,
    pub(super) stats: SolverStats,
}

impl<H: HeapModel> PointerAnalysisResult<H> {
    /// `None` if the analysis never created `pointer`.
    pub fn points_to(&self, pointer: Pointer) -> Option<&PointsToSet> {
        let id = self.pointers.get(pointer)?;
        Some(self.pointers.pts(id))
    }

    #[inline]
    pub fn points_to_var(&self, var: VarId) -> Option<&PointsToSet> {
        self.points_to(Pointer::Var(var))
    }

    #[inline]
    pub fn points_to_static_field(&self, field: FieldId) -> Option<&PointsToSet> {
        self.points_to(Pointer::StaticField(field))
    }

    #[inline]
    pub fn points_to_instance_field(&self, obj: ObjId, field: FieldId) -> Option<&PointsToSet> {
        self.points_to(Pointer::InstanceField(obj, field))
    }

    #[inline]
    pub fn is_reachable(&self, method: MethodId) -> bool {
        self.call_graph.contains(method)
    }

    #[inline]
    pub fn call_graph(&self) -> &CallGraph {
        &self.call_graph
    }

    #[inline]
    pub fn pfg(&self) -> &PointerFlowGraph {
        &self.pfg
    }

    #[inline]
    pub fn pointers(&self) -> &Pointers {
        &self.pointers
    }

    #[inline]
    pub fn heap(&self) -> &H {
        &self.heap
    }

    #[inline]
    pub fn obj(&self, obj: ObjId) -> &Obj {
        self.heap.get(obj)
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjId> {
        (0..self.heap.num_objects()).map(ObjId::new)
    }

    #[inline]
    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    pub fn obj_label(&self, program: &Program, obj: ObjId) -> String {
        let obj = self.heap.get(obj);
        let (class, suffix) = match obj.ty {
            ObjType::Class(c) => (c, ""),
            ObjType::Array(c) => (c, "[]"),
        };
        format!(
            "new {}{}@{}",
            program.class(class).name,
            suffix,
            program.stmt_label(obj.alloc)
        )
    }

    pub fn pointer_label(&self, program: &Program, pointer: Pointer) -> String {
        match pointer {
            Pointer::Var(v) => program.var_name(v),
            Pointer::StaticField(f) => program.field_name(f),
            Pointer::InstanceField(o, f) => {
                format!("{}.{}", self.obj_label(program, o), program.field_name(f))
            }
        }
    }

    pub fn display<'a>(&'a self, program: &'a Program) -> ResultDisplay<'a, H> {
        ResultDisplay {
            result: self,
            program,
        }
    }
}

pub struct ResultDisplay<'a, H> {
    result: &'a PointerAnalysisResult<H>,
    program: &'a Program,
}

impl<H: HeapModel> fmt::Display for ResultDisplay<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let res = self.result;
        let program = self.program;

        writeln!(f, "[reachable]")?;
        for m in res.call_graph.reachable_methods() {
            writeln!(f, "{}", program.method_name(*m))?;
        }

        writeln!(f, "[calls]")?;
        for edge in res.call_graph.edges() {
            writeln!(
                f,
                "{} -{}-> {}",
                program.stmt_label(edge.call_site),
                edge.kind,
                program.method_name(edge.callee)
            )?;
        }

        writeln!(f, "[points-to]")?;
        for (id, pointer) in res.pointers.iter() {
            let pts = res.pointers.pts(id);
            if pts.is_empty() {
                continue;
            }
            let objs: Vec<_> = pts
                .sorted()
                .into_iter()
                .map(|o| res.obj_label(program, o))
                .collect();
            writeln!(
                f,
                "{} -> {{{}}}",
                res.pointer_label(program, pointer),
                objs.join(", ")
            )?;
        }
        Ok(())
    }
}
