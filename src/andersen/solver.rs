use etrace::some_or;

use super::*;
use crate::{
    call_graph::{CallGraph, Edge},
    hierarchy::ClassHierarchy,
    ir::*,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Worklist entries processed.
    pub pops: usize,
    /// Entries that brought nothing new.
    pub empty_deltas: usize,
}

/// Inclusion-based points-to solver that builds the call graph on the fly.
pub struct Solver<'p, H = AllocationSiteHeap> {
    program: &'p Program,
    hierarchy: ClassHierarchy<'p>,
    heap: H,
    pointers: Pointers,
    pfg: PointerFlowGraph,
    call_graph: CallGraph,
    worklist: WorkList,
    stats: SolverStats,
}

impl<'p> Solver<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self::with_heap(program, AllocationSiteHeap::default())
    }
}

impl<'p, H: HeapModel> Solver<'p, H> {
    pub fn with_heap(program: &'p Program, heap: H) -> Self {
        Self {
            program,
            hierarchy: ClassHierarchy::new(program),
            heap,
            pointers: Pointers::default(),
            pfg: PointerFlowGraph::default(),
            call_graph: CallGraph::new(),
            worklist: WorkList::default(),
            stats: SolverStats::default(),
        }
    }

    pub fn solve(mut self, entry: MethodId) -> PointerAnalysisResult<H> {
        self.initialize(entry);
        self.analyze();
        self.finish()
    }

    pub fn initialize(&mut self, entry: MethodId) {
        self.call_graph.add_entry_method(entry);
        self.add_reachable(entry);
    }

    /// Drains the worklist.
    pub fn analyze(&mut self) {
        while self.step() {}
    }

    /// Pops one entry and processes it to completion. Returns `false` if the
    /// worklist was empty.
    pub fn step(&mut self) -> bool {
        let (pointer, pts) = some_or!(self.worklist.pop(), return false);
        self.stats.pops += 1;

        let delta = self.propagate(pointer, &pts);
        if delta.is_empty() {
            self.stats.empty_deltas += 1;
            return true;
        }
        if let Pointer::Var(var) = self.pointers.pointer(pointer) {
            for obj in delta.sorted() {
                self.process_accesses(var, obj);
                self.process_call(var, obj);
            }
        }
        true
    }

    pub fn finish(self) -> PointerAnalysisResult<H> {
        tracing::info!(
            "solved: {} reachable methods, {} call edges, {} pointers, {} pfg edges, {} objects, {} pops",
            self.call_graph.reachable_methods().len(),
            self.call_graph.num_edges(),
            self.pointers.len(),
            self.pfg.num_edges(),
            self.heap.num_objects(),
            self.stats.pops,
        );
        PointerAnalysisResult {
            pointers: self.pointers,
            pfg: self.pfg,
            call_graph: self.call_graph,
            heap: self.heap,
            stats: self.stats,
        }
    }

    #[inline]
    pub fn pointers(&self) -> &Pointers {
        &self.pointers
    }

    #[inline]
    pub fn pfg(&self) -> &PointerFlowGraph {
        &self.pfg
    }

    #[inline]
    pub fn call_graph(&self) -> &CallGraph {
        &self.call_graph
    }

    #[inline]
    pub fn heap(&self) -> &H {
        &self.heap
    }

    #[inline]
    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.worklist.is_empty()
    }

    /// Adds `source -> target`, sending what `source` already points to
    /// along the new edge.
    pub fn add_edge(&mut self, source: PointerId, target: PointerId) {
        if self.pfg.add_edge(source, target) {
            let pts = self.pointers.pts(source);
            if !pts.is_empty() {
                self.worklist.push(target, pts.clone());
            }
        }
    }

    /// Merges `pts` into `pointer` and forwards the new part to its
    /// successors.
    fn propagate(&mut self, pointer: PointerId, pts: &PointsToSet) -> PointsToSet {
        let delta = self.pointers.pts_mut(pointer).union(pts);
        if !delta.is_empty() {
            tracing::trace!("{:?} += {:?}", pointer, delta.sorted());
            for succ in self.pfg.succs_of(pointer) {
                self.worklist.push(*succ, delta.clone());
            }
        }
        delta
    }

    fn add_reachable(&mut self, method: MethodId) {
        let program = self.program;
        let mut pending = vec![method];
        while let Some(m) = pending.pop() {
            if !self.call_graph.add_reachable_method(m) {
                continue;
            }
            tracing::debug!("reachable {}", program.method_name(m));
            for stmt in &program.method(m).stmts {
                self.process_stmt(*stmt, &mut pending);
            }
        }
    }

    /// Handles the statements whose effect does not depend on a receiver.
    fn process_stmt(&mut self, stmt: StmtId, pending: &mut Vec<MethodId>) {
        let program = self.program;
        match program.stmt(stmt) {
            Stmt::New { lhs, .. } => {
                let obj = some_or!(self.heap.obj(program, stmt), return);
                let lhs = self.pointers.var(*lhs);
                self.worklist.push(lhs, PointsToSet::singleton(obj));
            }
            Stmt::Copy { lhs, rhs } => {
                let source = self.pointers.var(*rhs);
                let target = self.pointers.var(*lhs);
                self.add_edge(source, target);
            }
            Stmt::LoadField {
                lhs,
                base: None,
                field,
            } => {
                let field = some_or!(self.resolve_field(stmt, field, true), return);
                let source = self.pointers.static_field(field);
                let target = self.pointers.var(*lhs);
                self.add_edge(source, target);
            }
            Stmt::StoreField {
                base: None,
                field,
                rhs,
            } => {
                let field = some_or!(self.resolve_field(stmt, field, true), return);
                let source = self.pointers.var(*rhs);
                let target = self.pointers.static_field(field);
                self.add_edge(source, target);
            }
            Stmt::Invoke(invoke) if invoke.kind.is_static() => {
                let callee = some_or!(self.hierarchy.resolve_callee(None, invoke), {
                    tracing::debug!("unresolved static call {}", program.stmt_label(stmt));
                    return;
                });
                if self
                    .call_graph
                    .add_edge(Edge::new(CallKind::Static, stmt, callee))
                {
                    pending.push(callee);
                    self.bind_call(invoke, callee);
                }
            }
            Stmt::LoadField { base: Some(_), .. }
            | Stmt::StoreField { base: Some(_), .. }
            | Stmt::LoadArray { .. }
            | Stmt::StoreArray { .. }
            | Stmt::Invoke(_)
            | Stmt::Return(_)
            | Stmt::Const { .. } => {}
        }
    }

    /// Connects the field and array accesses based on `var` to a new object
    /// of `var`.
    fn process_accesses(&mut self, var: VarId, obj: ObjId) {
        let program = self.program;
        let relations = program.relations(var);
        for stmt in &relations.store_fields {
            let Stmt::StoreField { field, rhs, .. } = program.stmt(*stmt) else { continue };
            let field = some_or!(self.resolve_field(*stmt, field, false), continue);
            let source = self.pointers.var(*rhs);
            let target = self.pointers.instance_field(obj, field);
            self.add_edge(source, target);
        }
        for stmt in &relations.load_fields {
            let Stmt::LoadField { lhs, field, .. } = program.stmt(*stmt) else { continue };
            let field = some_or!(self.resolve_field(*stmt, field, false), continue);
            let source = self.pointers.instance_field(obj, field);
            let target = self.pointers.var(*lhs);
            self.add_edge(source, target);
        }
        // Array elements are merged into the base variable itself.
        for stmt in &relations.store_arrays {
            let Stmt::StoreArray { base, rhs } = program.stmt(*stmt) else { continue };
            let source = self.pointers.var(*rhs);
            let target = self.pointers.var(*base);
            self.add_edge(source, target);
        }
        for stmt in &relations.load_arrays {
            let Stmt::LoadArray { lhs, base } = program.stmt(*stmt) else { continue };
            let source = self.pointers.var(*base);
            let target = self.pointers.var(*lhs);
            self.add_edge(source, target);
        }
    }

    /// Dispatches the calls on receiver `var` for its new object `recv`.
    fn process_call(&mut self, var: VarId, recv: ObjId) {
        let program = self.program;
        let recv_class = self.heap.get(recv).ty.class();
        for stmt in &program.relations(var).invokes {
            let invoke = some_or!(program.invoke(*stmt), continue);
            let callee = some_or!(self.hierarchy.resolve_callee(recv_class, invoke), {
                tracing::debug!(
                    "unresolved {} call {} on {:?}",
                    invoke.kind,
                    program.stmt_label(*stmt),
                    recv
                );
                continue;
            });

            if let Some(this) = program.method(callee).this {
                let this = self.pointers.var(this);
                self.worklist.push(this, PointsToSet::singleton(recv));
            }
            if self
                .call_graph
                .add_edge(Edge::new(invoke.kind, *stmt, callee))
            {
                self.add_reachable(callee);
                self.bind_call(invoke, callee);
            }
        }
    }

    /// Arguments to parameters and return values to the call's result.
    fn bind_call(&mut self, invoke: &Invoke, callee: MethodId) {
        let program = self.program;
        let callee = program.method(callee);
        for (arg, param) in invoke.args.iter().zip(&callee.params) {
            let source = self.pointers.var(*arg);
            let target = self.pointers.var(*param);
            self.add_edge(source, target);
        }
        let lhs = some_or!(invoke.lhs, return);
        let target = self.pointers.var(lhs);
        for ret in &callee.return_vars {
            let source = self.pointers.var(*ret);
            self.add_edge(source, target);
        }
    }

    fn resolve_field(&self, stmt: StmtId, field: &FieldRef, is_static: bool) -> Option<FieldId> {
        let program = self.program;
        let resolved = program
            .resolve_field(field)
            .filter(|f| program.field(*f).is_static == is_static);
        if resolved.is_none() {
            tracing::debug!(
                "unresolved field {}::{} at {}",
                program.class(field.class).name,
                field.name,
                program.stmt_label(stmt)
            );
        }
        resolved
    }
}
