/*!
# Graph Representations

Concrete graph storage backends for the matching algorithms.

- [`AdjArray`] — adjacency lists of [`HalfEdge`]s plus an endpoint table
  indexed by edge id.
- [`WeightedAdjArray`] — [`AdjArray`] plus one weight per edge id.

Both reject self-loops and parallel edges: the matching algorithms assume
simple graphs. Edge ids are assigned consecutively in insertion order, so
graphs built from the same edge sequence are identical, which keeps runs
reproducible.
*/

use crate::{edge::*, node::*, ops::*};

/// Unweighted undirected graph with stable edge ids.
///
/// Adjacency is stored as one `Vec<HalfEdge>` per vertex; the endpoints of
/// every edge are additionally kept in a table indexed by [`EdgeId`].
///
/// # Examples
/// ```
/// use matchings::prelude::*;
///
/// let g = AdjArray::from_edges(4, [(0, 1), (1, 2), (2, 3)]);
/// assert_eq!(g.number_of_nodes(), 4);
/// assert_eq!(g.number_of_edges(), 3);
/// assert_eq!(g.degree_of(1), 2);
/// ```
#[derive(Clone, Default)]
pub struct AdjArray {
    adj: Vec<Vec<HalfEdge>>,
    endpoints: Vec<Edge>,
}

/// Weighted undirected graph with stable edge ids.
///
/// # Examples
/// ```
/// use matchings::prelude::*;
///
/// let g = WeightedAdjArray::from_weighted_edges(3, [(0, 1, 1.0), (1, 2, 2.0), (0, 2, 3.0)]);
/// assert_eq!(g.edge_weight(2), 3.0);
/// assert_eq!(g.edge_endpoints(2), Edge(0, 2));
/// ```
#[derive(Clone, Default)]
pub struct WeightedAdjArray {
    graph: AdjArray,
    weights: Vec<Weight>,
}

impl AdjArray {
    /// Creates a graph with `n` nodes and no edges.
    pub fn new(n: NumNodes) -> Self {
        Self {
            adj: vec![Vec::new(); n as usize],
            endpoints: Vec::new(),
        }
    }

    /// Creates a graph with `n` nodes from an edge iterator.
    ///
    /// Edge ids follow iteration order. Duplicate edges (in either
    /// orientation) and self-loops **panic**: the matching algorithms
    /// require simple graphs.
    pub fn from_edges<E, I>(n: NumNodes, edges: I) -> Self
    where
        E: Into<Edge>,
        I: IntoIterator<Item = E>,
    {
        let mut graph = Self::new(n);
        for edge in edges {
            let Edge(u, v) = edge.into();
            graph.add_edge(u, v);
        }
        graph
    }

    /// Adds the edge `{u, v}` and returns its id.
    ///
    /// **Panics** if `u >= n`, `v >= n`, `u == v`, or the edge already exists.
    pub fn add_edge(&mut self, u: Node, v: Node) -> EdgeId {
        assert!(u != v, "self-loop ({u},{v}) not allowed");
        assert!(
            !self.has_edge(u, v),
            "parallel edge ({u},{v}) not allowed"
        );

        let id = self.endpoints.len() as EdgeId;
        self.endpoints.push(Edge(u, v).normalized());
        self.adj[u as usize].push(HalfEdge { node: v, id });
        self.adj[v as usize].push(HalfEdge { node: u, id });
        id
    }

    /// Returns `true` if the edge `{u, v}` exists.
    ///
    /// **Panics if `u >= n`.**
    pub fn has_edge(&self, u: Node, v: Node) -> bool {
        self.adj[u as usize].iter().any(|h| h.node == v)
    }
}

impl GraphNodeOrder for AdjArray {
    fn number_of_nodes(&self) -> NumNodes {
        self.adj.len() as NumNodes
    }
}

impl GraphEdgeOrder for AdjArray {
    fn number_of_edges(&self) -> NumEdges {
        self.endpoints.len() as NumEdges
    }
}

impl AdjacencyGraph for AdjArray {
    type HalfEdgeIter<'a> = std::iter::Copied<std::slice::Iter<'a, HalfEdge>>;

    fn half_edges_of(&self, u: Node) -> Self::HalfEdgeIter<'_> {
        self.adj[u as usize].iter().copied()
    }

    fn edge_endpoints(&self, id: EdgeId) -> Edge {
        self.endpoints[id as usize]
    }

    fn degree_of(&self, u: Node) -> NumNodes {
        self.adj[u as usize].len() as NumNodes
    }
}

impl WeightedAdjArray {
    /// Creates a graph with `n` nodes and no edges.
    pub fn new(n: NumNodes) -> Self {
        Self {
            graph: AdjArray::new(n),
            weights: Vec::new(),
        }
    }

    /// Creates a graph with `n` nodes from a `(u, v, weight)` iterator.
    ///
    /// Edge ids follow iteration order; the same panics as
    /// [`AdjArray::from_edges`] apply. Negative weights are rejected by the
    /// weighted matching algorithms, not here.
    pub fn from_weighted_edges<I>(n: NumNodes, edges: I) -> Self
    where
        I: IntoIterator<Item = (Node, Node, Weight)>,
    {
        let mut graph = Self::new(n);
        for (u, v, w) in edges {
            graph.add_edge(u, v, w);
        }
        graph
    }

    /// Creates an unweighted view of an edge list: every edge gets weight `1`.
    pub fn from_edges<E, I>(n: NumNodes, edges: I) -> Self
    where
        E: Into<Edge>,
        I: IntoIterator<Item = E>,
    {
        Self::from_weighted_edges(
            n,
            edges.into_iter().map(|e| {
                let Edge(u, v) = e.into();
                (u, v, 1.0)
            }),
        )
    }

    /// Adds the edge `{u, v}` with the given weight and returns its id.
    ///
    /// **Panics** on self-loops, parallel edges, or out-of-range endpoints.
    pub fn add_edge(&mut self, u: Node, v: Node, w: Weight) -> EdgeId {
        let id = self.graph.add_edge(u, v);
        self.weights.push(w);
        id
    }

    /// Returns `true` if the edge `{u, v}` exists.
    pub fn has_edge(&self, u: Node, v: Node) -> bool {
        self.graph.has_edge(u, v)
    }
}

impl GraphNodeOrder for WeightedAdjArray {
    fn number_of_nodes(&self) -> NumNodes {
        self.graph.number_of_nodes()
    }
}

impl GraphEdgeOrder for WeightedAdjArray {
    fn number_of_edges(&self) -> NumEdges {
        self.graph.number_of_edges()
    }
}

impl AdjacencyGraph for WeightedAdjArray {
    type HalfEdgeIter<'a> = std::iter::Copied<std::slice::Iter<'a, HalfEdge>>;

    fn half_edges_of(&self, u: Node) -> Self::HalfEdgeIter<'_> {
        self.graph.half_edges_of(u)
    }

    fn edge_endpoints(&self, id: EdgeId) -> Edge {
        self.graph.edge_endpoints(id)
    }

    fn degree_of(&self, u: Node) -> NumNodes {
        self.graph.degree_of(u)
    }
}

impl WeightedAdjacency for WeightedAdjArray {
    fn edge_weight(&self, id: EdgeId) -> Weight {
        self.weights[id as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn from_edges_assigns_ids_in_order() {
        let g = AdjArray::from_edges(4, [(0, 1), (2, 1), (2, 3)]);
        assert_eq!(g.number_of_edges(), 3);
        assert_eq!(g.edge_endpoints(0), Edge(0, 1));
        assert_eq!(g.edge_endpoints(1), Edge(1, 2));
        assert_eq!(g.edge_endpoints(2), Edge(2, 3));
        assert_eq!(
            g.edges_with_ids().map(|(e, _)| e).collect_vec(),
            vec![Edge(0, 1), Edge(1, 2), Edge(2, 3)]
        );
    }

    #[test]
    fn half_edges_carry_matching_ids() {
        let rng = &mut Pcg64Mcg::seed_from_u64(123);

        for n in [5 as NumNodes, 10, 20] {
            let mut edges = Vec::new();
            for u in 0..n {
                for v in (u + 1)..n {
                    if rng.random_bool(0.4) {
                        edges.push((u, v, rng.random_range(0.0..10.0)));
                    }
                }
            }
            let g = WeightedAdjArray::from_weighted_edges(n, edges.clone());

            assert_eq!(g.number_of_edges() as usize, edges.len());

            for u in g.vertices() {
                for (h, w) in g.weighted_half_edges_of(u) {
                    let Edge(a, b) = g.edge_endpoints(h.id);
                    assert_eq!(Edge(a, b), Edge(u, h.node).normalized());
                    assert_eq!(w, edges[h.id as usize].2);
                }
            }

            let degree_sum: NumNodes = g.vertices().map(|u| g.degree_of(u)).sum();
            assert_eq!(degree_sum, 2 * g.number_of_edges());
        }
    }

    #[test]
    #[should_panic]
    fn rejects_self_loops() {
        AdjArray::from_edges(3, [(1, 1)]);
    }

    #[test]
    #[should_panic]
    fn rejects_parallel_edges() {
        AdjArray::from_edges(3, [(0, 1), (1, 0)]);
    }
}
