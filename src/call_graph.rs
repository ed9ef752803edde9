use std::collections::{HashMap, HashSet};

use crate::ir::{CallKind, MethodId, StmtId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub kind: CallKind,
    pub call_site: StmtId,
    pub callee: MethodId,
}

impl Edge {
    #[inline]
    pub fn new(kind: CallKind, call_site: StmtId, callee: MethodId) -> Self {
        Self {
            kind,
            call_site,
            callee,
        }
    }
}

/// Reachable methods and the call edges between them. Both only grow.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    entry_methods: Vec<MethodId>,
    reachable: Vec<MethodId>,
    reachable_set: HashSet<MethodId>,
    edges: Vec<Edge>,
    edge_set: HashSet<(StmtId, MethodId)>,
    callees: HashMap<StmtId, Vec<MethodId>>,
    callers: HashMap<MethodId, Vec<StmtId>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry_method(&mut self, method: MethodId) {
        if !self.entry_methods.contains(&method) {
            self.entry_methods.push(method);
        }
    }

    #[inline]
    pub fn entry_methods(&self) -> &[MethodId] {
        &self.entry_methods
    }

    /// Returns `false` if `method` was already reachable.
    pub fn add_reachable_method(&mut self, method: MethodId) -> bool {
        if self.reachable_set.insert(method) {
            self.reachable.push(method);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn contains(&self, method: MethodId) -> bool {
        self.reachable_set.contains(&method)
    }

    /// Reachable methods in discovery order.
    #[inline]
    pub fn reachable_methods(&self) -> &[MethodId] {
        &self.reachable
    }

    /// Returns `false` if an edge from the same call site to the same callee
    /// exists.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.edge_set.insert((edge.call_site, edge.callee)) {
            return false;
        }
        self.callees
            .entry(edge.call_site)
            .or_default()
            .push(edge.callee);
        self.callers
            .entry(edge.callee)
            .or_default()
            .push(edge.call_site);
        self.edges.push(edge);
        true
    }

    #[inline]
    pub fn has_edge(&self, call_site: StmtId, callee: MethodId) -> bool {
        self.edge_set.contains(&(call_site, callee))
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn callees_of(&self, call_site: StmtId) -> &[MethodId] {
        self.callees.get(&call_site).map_or(&[], |v| v.as_slice())
    }

    pub fn callers_of(&self, method: MethodId) -> &[StmtId] {
        self.callers.get(&method).map_or(&[], |v| v.as_slice())
    }
}
