//! Shared mutable state of the weighted blossom algorithms.

use std::collections::BTreeSet;

use stream_bitset::bitset::BitSetImpl;

use crate::{edge::*, matching::Matching, node::*, ops::*};

use super::structure::*;

/// State shared between the skeleton driver and the variant hooks: the
/// copied graph, the matching, and the blossom arena with the set of
/// top-level blossoms.
///
/// The adjacency and edge tables are copied out of the input graph once so
/// the hooks can scan them without carrying the graph type parameter.
pub(crate) struct BlossomCore {
    n: NumNodes,
    m: NumEdges,
    max_weight: Weight,
    edges: Vec<(Node, Node, Weight)>,
    adj: Vec<Vec<HalfEdge>>,
    pub arena: BlossomArena,
    /// Ids of the top-level blossoms, iterated in increasing order.
    pub top_level: BTreeSet<u32>,
    pub is_in_matching: EdgeBitSet,
    /// Per vertex: matched partner and the id of the matched edge.
    pub matched: Vec<Option<(Node, EdgeId)>>,
}

impl BlossomCore {
    pub fn new<G: WeightedAdjacency>(graph: &G) -> Self {
        let n = graph.number_of_nodes();
        let m = graph.number_of_edges();

        let edges = graph
            .edges_with_ids()
            .map(|(Edge(u, v), id)| (u, v, graph.edge_weight(id)))
            .collect();
        let adj = graph
            .vertices()
            .map(|u| graph.half_edges_of(u).collect())
            .collect();

        Self {
            n,
            m,
            max_weight: graph.max_edge_weight(),
            edges,
            adj,
            arena: BlossomArena::new(n),
            top_level: (0..n).collect(),
            is_in_matching: BitSetImpl::new(m),
            matched: vec![None; n as usize],
        }
    }

    #[inline]
    pub fn number_of_nodes(&self) -> NumNodes {
        self.n
    }

    #[inline]
    pub fn number_of_edges(&self) -> NumEdges {
        self.m
    }

    /// Maximum edge weight of the input graph; node duals start at half of
    /// it so every edge begins with non-negative slack.
    #[inline]
    pub fn max_edge_weight(&self) -> Weight {
        self.max_weight
    }

    #[inline]
    pub fn weight(&self, id: EdgeId) -> Weight {
        self.edges[id as usize].2
    }

    #[inline]
    pub fn endpoints(&self, id: EdgeId) -> (Node, Node) {
        let (u, v, _) = self.edges[id as usize];
        (u, v)
    }

    /// Half-edges incident to `u` in the copied adjacency.
    #[inline]
    pub fn half_edges_of(&self, u: Node) -> &[HalfEdge] {
        &self.adj[u as usize]
    }

    /// The edge `id` oriented away from vertex `from`.
    pub fn edge_from(&self, id: EdgeId, from: Node) -> EdgeInfo {
        let (u, v) = self.endpoints(id);
        debug_assert!(from == u || from == v);
        if from == u {
            EdgeInfo { u, v, id }
        } else {
            EdgeInfo { u: v, v: u, id }
        }
    }

    /// A blossom is exposed if its base is unmatched.
    #[inline]
    pub fn is_exposed(&self, b: BlossomId) -> bool {
        self.matched[self.arena[b].base as usize].is_none()
    }

    /// Toggles the matching state of an edge, keeping the per-vertex partner
    /// table consistent. Guarded so interleaved toggles along a path never
    /// clobber a fresher entry.
    pub fn swap_edge_in_matching(&mut self, id: EdgeId) {
        let (u, v) = self.endpoints(id);
        if self.is_in_matching.get_bit(id) {
            self.is_in_matching.clear_bit(id);
            if self.matched[u as usize] == Some((v, id)) {
                self.matched[u as usize] = None;
            }
            if self.matched[v as usize] == Some((u, id)) {
                self.matched[v as usize] = None;
            }
        } else {
            self.is_in_matching.set_bit(id);
            self.matched[u as usize] = Some((v, id));
            self.matched[v as usize] = Some((u, id));
        }
    }

    /// Extracts the matching as a partner mapping.
    pub fn matching(&self) -> Matching {
        Matching::from_mates(self.matched.iter().map(|&p| p.map(|(v, _)| v)).collect())
    }

    /// Verifies structural invariants of the blossom forest and the matching
    /// in debug builds. Release builds compile this away.
    #[cfg(debug_assertions)]
    pub fn check_consistency(&self) {
        let mut seen = NodeBitSet::new(self.n);
        for &b in &self.top_level {
            let b = BlossomId(b);
            assert!(self.arena[b].parent.is_none());
            for v in self.arena.nodes_of(b) {
                assert!(!seen.get_bit(v), "vertex {v} in two top-level blossoms");
                assert_eq!(self.arena.top_of(v), b);
                seen.set_bit(v);
            }
            if !self.arena[b].is_trivial() {
                assert!(self.arena[b].sub_blossoms.len() >= 3);
                assert!(self.arena[b].sub_blossoms.len() % 2 == 1);
                assert!(self.arena[b].z >= 0.0);
                assert!(self.arena.contains(b, self.arena[b].initial_base));
                assert!(self.arena.contains(b, self.arena[b].base));
            }
        }
        assert_eq!(seen.cardinality(), self.n);

        for (v, p) in self.matched.iter().enumerate() {
            if let Some((w, id)) = p {
                assert_eq!(self.matched[*w as usize], Some((v as Node, *id)));
                assert!(self.is_in_matching.get_bit(*id));
            }
        }
    }

    #[cfg(not(debug_assertions))]
    pub fn check_consistency(&self) {}
}
