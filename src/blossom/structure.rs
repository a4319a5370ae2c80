//! Arena-allocated blossom records.
//!
//! Blossoms form a laminar family over the vertices: every vertex is a
//! *trivial* blossom, and non-trivial blossoms are odd cycles of
//! sub-blossoms. Records live in a [`BlossomArena`] and are referenced by
//! stable [`BlossomId`] handles, so the tree can be split and merged while
//! being iterated.

use smallvec::SmallVec;

use crate::{edge::*, node::*};

/// Handle of a blossom inside a [`BlossomArena`].
///
/// Ids `0..n` are the trivial blossoms of the vertices; later ids are
/// non-trivial blossoms in creation order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct BlossomId(pub u32);

/// An edge with its orientation as used during tree growth: `u` lies on the
/// side the edge was discovered from, `v` on the side it leads into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct EdgeInfo {
    pub u: Node,
    pub v: Node,
    pub id: EdgeId,
}

impl EdgeInfo {
    pub fn reverse(self) -> Self {
        Self {
            u: self.v,
            v: self.u,
            id: self.id,
        }
    }
}

/// Position of a top-level blossom in the alternating forest.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Label {
    /// Reached via a matched edge, or exposed.
    Even,
    /// Reached via an unmatched edge; matched to an even blossom.
    Odd,
    /// Not part of the forest.
    Free,
}

/// A blossom record.
///
/// For a non-trivial blossom, `sub_blossoms` holds the odd cycle as
/// `(child, edge)` pairs where `edge` connects the child to its successor in
/// the cycle (`edge.u` inside the child). The first child contains the base;
/// relative to this order, the cycle edges at odd positions are matched.
pub(crate) struct Blossom {
    pub parent: Option<BlossomId>,
    /// Base vertex at creation time.
    pub initial_base: Node,
    /// Current base vertex. May run ahead of the interior matching after an
    /// augmentation until the lazy flip is applied.
    pub base: Node,
    /// Last vertex in traversal order; split boundary for node sequences.
    pub last_node: Node,
    pub sub_blossoms: SmallVec<[(BlossomId, EdgeInfo); 3]>,
    /// Pending lazy augmentation: chain of descendants from this blossom's
    /// child down to the trivial blossom of the new base. Empty when the
    /// interior matching is consistent with `base`.
    pub base_blossoms: Vec<BlossomId>,
    pub label: Label,
    /// Edge through which this blossom was labelled (oriented into it).
    pub backtrack_edge: Option<EdgeInfo>,
    /// Scratch flag for backtracking.
    pub visited: bool,
    /// Dual variable; non-negative, zero for trivial blossoms.
    pub z: Weight,
}

impl Blossom {
    fn trivial(v: Node) -> Self {
        Self {
            parent: None,
            initial_base: v,
            base: v,
            last_node: v,
            sub_blossoms: SmallVec::new(),
            base_blossoms: Vec::new(),
            label: Label::Free,
            backtrack_edge: None,
            visited: false,
            z: 0.0,
        }
    }

    pub fn is_trivial(&self) -> bool {
        self.sub_blossoms.is_empty()
    }
}

/// Arena owning all blossom records of one algorithm run.
pub(crate) struct BlossomArena {
    blossoms: Vec<Blossom>,
    n: NumNodes,
}

impl BlossomArena {
    /// Creates the arena with one trivial blossom per vertex.
    pub fn new(n: NumNodes) -> Self {
        Self {
            blossoms: (0..n).map(Blossom::trivial).collect(),
            n,
        }
    }

    /// The trivial blossom of a vertex.
    #[inline]
    pub fn trivial(&self, v: Node) -> BlossomId {
        debug_assert!(v < self.n);
        BlossomId(v)
    }

    /// Allocates a new non-trivial blossom and returns its handle.
    pub fn create(&mut self, blossom: Blossom) -> BlossomId {
        debug_assert!(blossom.sub_blossoms.len() >= 3);
        debug_assert!(blossom.sub_blossoms.len() % 2 == 1);
        self.blossoms.push(blossom);
        BlossomId((self.blossoms.len() - 1) as u32)
    }

    /// Collects the vertices of a blossom in traversal order.
    pub fn nodes_of(&self, b: BlossomId) -> Vec<Node> {
        let mut nodes = Vec::new();
        self.collect_nodes(b, &mut nodes);
        nodes
    }

    fn collect_nodes(&self, b: BlossomId, out: &mut Vec<Node>) {
        if self[b].is_trivial() {
            out.push(b.0);
        } else {
            for i in 0..self[b].sub_blossoms.len() {
                self.collect_nodes(self[b].sub_blossoms[i].0, out);
            }
        }
    }

    /// Walks from the trivial blossom of `v` up to the root of its tree.
    pub fn top_of(&self, v: Node) -> BlossomId {
        let mut b = self.trivial(v);
        while let Some(p) = self[b].parent {
            b = p;
        }
        b
    }

    /// Returns the chain of blossoms containing `v` strictly below `until`,
    /// ordered from the child of `until` down to the trivial blossom of `v`.
    pub fn chain_below(&self, v: Node, until: BlossomId) -> Vec<BlossomId> {
        let mut chain = vec![self.trivial(v)];
        while self[*chain.last().unwrap()].parent != Some(until) {
            let p = self[*chain.last().unwrap()]
                .parent
                .expect("vertex not contained in the given blossom");
            chain.push(p);
        }
        chain.reverse();
        chain
    }

    /// Returns `true` if `v` lies inside blossom `b`.
    pub fn contains(&self, b: BlossomId, v: Node) -> bool {
        let mut cur = self.trivial(v);
        loop {
            if cur == b {
                return true;
            }
            match self[cur].parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }
}

impl std::ops::Index<BlossomId> for BlossomArena {
    type Output = Blossom;

    #[inline]
    fn index(&self, id: BlossomId) -> &Blossom {
        &self.blossoms[id.0 as usize]
    }
}

impl std::ops::IndexMut<BlossomId> for BlossomArena {
    #[inline]
    fn index_mut(&mut self, id: BlossomId) -> &mut Blossom {
        &mut self.blossoms[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn edge(u: Node, v: Node, id: EdgeId) -> EdgeInfo {
        EdgeInfo { u, v, id }
    }

    #[test]
    fn trivial_blossoms_cover_vertices() {
        let arena = BlossomArena::new(4);
        for v in 0..4 {
            let b = arena.trivial(v);
            assert!(arena[b].is_trivial());
            assert_eq!(arena[b].base, v);
            assert_eq!(arena.nodes_of(b), vec![v]);
            assert_eq!(arena.top_of(v), b);
        }
    }

    #[test]
    fn nested_blossoms_report_nodes_and_chains() {
        let mut arena = BlossomArena::new(5);

        // triangle over {0, 1, 2}
        let inner = arena.create(Blossom {
            parent: None,
            initial_base: 0,
            base: 0,
            last_node: 2,
            sub_blossoms: smallvec![
                (BlossomId(0), edge(0, 1, 0)),
                (BlossomId(1), edge(1, 2, 1)),
                (BlossomId(2), edge(2, 0, 2)),
            ],
            base_blossoms: Vec::new(),
            label: Label::Even,
            backtrack_edge: None,
            visited: false,
            z: 0.0,
        });
        for v in 0..3 {
            arena[BlossomId(v)].parent = Some(inner);
        }

        // outer cycle {inner, 3, 4}
        let outer = arena.create(Blossom {
            parent: None,
            initial_base: 0,
            base: 0,
            last_node: 4,
            sub_blossoms: smallvec![
                (inner, edge(2, 3, 3)),
                (BlossomId(3), edge(3, 4, 4)),
                (BlossomId(4), edge(4, 0, 5)),
            ],
            base_blossoms: Vec::new(),
            label: Label::Even,
            backtrack_edge: None,
            visited: false,
            z: 0.0,
        });
        arena[inner].parent = Some(outer);
        arena[BlossomId(3)].parent = Some(outer);
        arena[BlossomId(4)].parent = Some(outer);

        assert_eq!(arena.nodes_of(outer), vec![0, 1, 2, 3, 4]);
        assert_eq!(arena.top_of(1), outer);
        assert_eq!(arena.top_of(4), outer);

        assert_eq!(arena.chain_below(1, outer), vec![inner, BlossomId(1)]);
        assert_eq!(arena.chain_below(3, outer), vec![BlossomId(3)]);

        assert!(arena.contains(outer, 2));
        assert!(arena.contains(inner, 2));
        assert!(!arena.contains(inner, 3));
    }
}
