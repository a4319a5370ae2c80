/*!
# Matchings

This module defines the [`Matching`] value type produced by all algorithms in
this crate, together with the [`MaximumMatching`] convenience trait that runs
a chosen algorithm directly on a graph.

A *matching* is a set of edges without shared endpoints. It is represented as
a symmetric partner mapping: `partner(u) == Some(v)` iff `partner(v) ==
Some(u)` and `{u, v}` is a matched edge.
*/

use itertools::Itertools;

use crate::{
    blossom::{EdmondsMatching, GabowMatching, MicaliGabowMatching},
    edge::*,
    mv::MicaliVaziraniMatching,
    node::*,
    ops::*,
};

/// Selects which weighted matching algorithm [`MaximumMatching`] runs.
///
/// All three compute the same optimum; they differ in the data structures
/// used to find the next tight edge and dual adjustment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WeightedAlgorithm {
    /// Edmonds' original blossom algorithm, `O(n * m^2)`.
    Edmonds,
    /// Gabow's variant with per-blossom best-edge tables, `O(n^3)`.
    Gabow,
    /// The Micali-Gabow variant with priority-queue dualities,
    /// `O(n * m * alpha(n, m))`.
    MicaliGabow,
}

/// A matching of a graph: a symmetric `node -> node` partner mapping.
///
/// # Examples
/// ```
/// use matchings::prelude::*;
///
/// let g = WeightedAdjArray::from_weighted_edges(3, [(0, 1, 1.0), (1, 2, 2.0), (0, 2, 3.0)]);
/// let m = g.maximum_weight_matching(WeightedAlgorithm::Edmonds);
///
/// assert_eq!(m.cardinality(), 1);
/// assert_eq!(m.pairs(), vec![(0, 2)]);
/// assert_eq!(m.partner(0), Some(2));
/// assert_eq!(m.partner(1), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Matching {
    mate: Vec<Option<Node>>,
}

impl Matching {
    /// Creates a matching from a partner vector.
    ///
    /// **Panics** (in debug builds) if the mapping is not symmetric.
    pub(crate) fn from_mates(mate: Vec<Option<Node>>) -> Self {
        let matching = Self { mate };
        debug_assert!(matching.is_symmetric());
        matching
    }

    /// Returns the matched partner of `v`, or `None` if `v` is exposed.
    ///
    /// **Panics if `v >= n`.**
    #[inline]
    pub fn partner(&self, v: Node) -> Option<Node> {
        self.mate[v as usize]
    }

    /// Returns `true` if `v` is covered by the matching.
    ///
    /// **Panics if `v >= n`.**
    #[inline]
    pub fn is_matched(&self, v: Node) -> bool {
        self.mate[v as usize].is_some()
    }

    /// Number of matched pairs.
    pub fn cardinality(&self) -> NumNodes {
        (self.mate.iter().flatten().count() / 2) as NumNodes
    }

    /// Returns each matched pair once as `(u, v)` with `u <= v`, sorted
    /// lexicographically.
    pub fn pairs(&self) -> Vec<(Node, Node)> {
        self.mate
            .iter()
            .enumerate()
            .filter_map(|(u, &p)| {
                let v = p?;
                (u as Node <= v).then_some((u as Node, v))
            })
            .collect_vec()
    }

    /// Total weight of the matched edges.
    pub fn total_weight<G: WeightedAdjacency>(&self, graph: &G) -> Weight {
        self.pairs()
            .into_iter()
            .map(|(u, v)| {
                graph
                    .half_edges_of(u)
                    .find(|h| h.node == v)
                    .map(|h| graph.edge_weight(h.id))
                    .expect("matched pair is not an edge of the graph")
            })
            .sum()
    }

    /// Returns `true` if the partner mapping is symmetric.
    fn is_symmetric(&self) -> bool {
        self.mate.iter().enumerate().all(|(u, &p)| match p {
            Some(v) => self.mate.get(v as usize) == Some(&Some(u as Node)),
            None => true,
        })
    }

    /// Returns `true` if this is a valid matching of `graph`: the mapping is
    /// symmetric and every matched pair is an edge.
    pub fn is_valid<G: AdjacencyGraph>(&self, graph: &G) -> bool {
        self.mate.len() == graph.len()
            && self.is_symmetric()
            && self
                .pairs()
                .into_iter()
                .all(|(u, v)| graph.half_edges_of(u).any(|h| h.node == v))
    }
}

impl std::fmt::Debug for Matching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.pairs().into_iter().map(|(u, v)| Edge(u, v)))
            .finish()
    }
}

/// A trait providing maximum matching algorithms on undirected graphs.
///
/// Implemented for every graph offering [`AdjacencyGraph`] /
/// [`WeightedAdjacency`]. For the full control surface (duals, reuse of the
/// solver value), use the algorithm structs directly.
pub trait MaximumMatching: AdjacencyGraph {
    /// Computes a **maximum-cardinality matching** using the Micali-Vazirani
    /// algorithm in `O(m * sqrt(n))`.
    fn maximum_cardinality_matching(&self) -> Matching {
        let mut algo = MicaliVaziraniMatching::new(self);
        algo.run();
        algo.take_matching()
    }

    /// Computes a **maximum-weight matching** with the chosen weighted
    /// blossom variant.
    ///
    /// The optimum is the maximum total weight over all matchings (not
    /// necessarily perfect ones).
    ///
    /// **Panics** if the graph has an edge of negative weight.
    fn maximum_weight_matching(&self, algo: WeightedAlgorithm) -> Matching
    where
        Self: WeightedAdjacency,
    {
        match algo {
            WeightedAlgorithm::Edmonds => {
                let mut algo = EdmondsMatching::new(self);
                algo.run();
                algo.take_matching()
            }
            WeightedAlgorithm::Gabow => {
                let mut algo = GabowMatching::new(self);
                algo.run();
                algo.take_matching()
            }
            WeightedAlgorithm::MicaliGabow => {
                let mut algo = MicaliGabowMatching::new(self);
                algo.run();
                algo.take_matching()
            }
        }
    }
}

impl<G: AdjacencyGraph> MaximumMatching for G {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::AdjArray;

    #[test]
    fn pairs_are_normalized_and_sorted() {
        let mut mate = vec![None; 6];
        mate[4] = Some(1);
        mate[1] = Some(4);
        mate[0] = Some(3);
        mate[3] = Some(0);
        let m = Matching::from_mates(mate);

        assert_eq!(m.pairs(), vec![(0, 3), (1, 4)]);
        assert_eq!(m.cardinality(), 2);
        assert!(m.is_matched(4));
        assert!(!m.is_matched(2));
    }

    #[test]
    fn validity_checks_edges() {
        let g = AdjArray::from_edges(4, [(0, 1), (2, 3)]);

        let mut mate = vec![None; 4];
        mate[0] = Some(1);
        mate[1] = Some(0);
        assert!(Matching::from_mates(mate).is_valid(&g));

        let mut mate = vec![None; 4];
        mate[0] = Some(2);
        mate[2] = Some(0);
        assert!(!Matching::from_mates(mate).is_valid(&g));
    }
}
