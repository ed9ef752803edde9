use std::collections::HashSet;

use super::pointer::PointerId;

/// Pointer-flow graph: `s -> t` means the objects of `s` flow into `t`.
#[derive(Debug, Default)]
pub struct PointerFlowGraph {
    succs: Vec<Vec<PointerId>>,
    edges: HashSet<(PointerId, PointerId)>,
}

impl PointerFlowGraph {
    /// Returns `false` if the edge already exists.
    pub fn add_edge(&mut self, source: PointerId, target: PointerId) -> bool {
        if !self.edges.insert((source, target)) {
            return false;
        }
        if self.succs.len() <= source.index() {
            self.succs.resize_with(source.index() + 1, Vec::new);
        }
        self.succs[source.index()].push(target);
        true
    }

    pub fn succs_of(&self, pointer: PointerId) -> &[PointerId] {
        self.succs.get(pointer.index()).map_or(&[], |v| v.as_slice())
    }

    #[inline]
    pub fn has_edge(&self, source: PointerId, target: PointerId) -> bool {
        self.edges.contains(&(source, target))
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (PointerId, PointerId)> + '_ {
        self.succs.iter().enumerate().flat_map(|(s, ts)| {
            ts.iter().map(move |t| (PointerId::new(s), *t))
        })
    }
}
