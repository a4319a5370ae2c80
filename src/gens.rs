/*!
# Random Graph Generation

A small `G(n,p)`-style generator producing random simple weighted graphs,
mainly for tests and benchmarks of the matching algorithms.

# Examples
```
use matchings::{gens::RandomGraph, prelude::*};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

let rng = &mut Pcg64Mcg::seed_from_u64(42);
let g = RandomGraph::new()
    .nodes(10)
    .edge_prob(0.3)
    .weight_range(1.0..=5.0)
    .generate(rng);

assert_eq!(g.number_of_nodes(), 10);
assert!((0..g.number_of_edges()).all(|id| g.edge_weight(id) >= 1.0));
```
*/

use std::ops::RangeInclusive;

use rand::Rng;

use crate::{edge::*, node::*, repr::WeightedAdjArray};

/// Builder for random simple weighted graphs.
///
/// Every possible edge `{u, v}` is included independently with the
/// configured probability; included edges draw their weight uniformly from
/// the configured range.
#[derive(Debug, Clone)]
pub struct RandomGraph {
    n: NumNodes,
    p: f64,
    weights: RangeInclusive<Weight>,
}

impl Default for RandomGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomGraph {
    /// Creates a generator with no nodes, `p = 0.5`, and unit weights.
    pub fn new() -> Self {
        Self {
            n: 0,
            p: 0.5,
            weights: 1.0..=1.0,
        }
    }

    /// Sets the number of nodes (builder-style).
    pub fn nodes(mut self, n: NumNodes) -> Self {
        self.n = n;
        self
    }

    /// Sets the probability of including each edge.
    ///
    /// # Panics
    /// Panics if `p` is not in `[0.0, 1.0]`.
    pub fn edge_prob(mut self, p: f64) -> Self {
        assert!((0.0..=1.0).contains(&p), "invalid probability {p}");
        self.p = p;
        self
    }

    /// Sets the weight range. Weights are drawn uniformly; for exact
    /// arithmetic in the weighted matchers, prefer integer bounds combined
    /// with [`RandomGraph::integer_weights`].
    ///
    /// # Panics
    /// Panics if the range is empty or contains negative values.
    pub fn weight_range(mut self, range: RangeInclusive<Weight>) -> Self {
        assert!(range.start() <= range.end(), "empty weight range");
        assert!(*range.start() >= 0.0, "negative weights not allowed");
        self.weights = range;
        self
    }

    /// Generates a graph, drawing all randomness from `rng`.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> WeightedAdjArray {
        let mut graph = WeightedAdjArray::new(self.n);
        for u in 0..self.n {
            for v in (u + 1)..self.n {
                if rng.random_bool(self.p) {
                    let w = if self.weights.start() == self.weights.end() {
                        *self.weights.start()
                    } else {
                        rng.random_range(self.weights.clone())
                    };
                    graph.add_edge(u, v, w);
                }
            }
        }
        graph
    }

    /// Generates a graph whose weights are rounded to integers, keeping the
    /// weighted matchers exact.
    pub fn integer_weights<R: Rng>(&self, rng: &mut R) -> WeightedAdjArray {
        let mut graph = WeightedAdjArray::new(self.n);
        let (lo, hi) = (
            self.weights.start().floor() as i64,
            self.weights.end().floor() as i64,
        );
        for u in 0..self.n {
            for v in (u + 1)..self.n {
                if rng.random_bool(self.p) {
                    graph.add_edge(u, v, rng.random_range(lo..=hi) as Weight);
                }
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn generates_simple_graphs_in_bounds() {
        let rng = &mut Pcg64Mcg::seed_from_u64(7);
        let g = RandomGraph::new()
            .nodes(30)
            .edge_prob(0.2)
            .weight_range(2.0..=9.0)
            .generate(rng);

        assert_eq!(g.number_of_nodes(), 30);
        for id in 0..g.number_of_edges() {
            let Edge(u, v) = g.edge_endpoints(id);
            assert!(u < v && v < 30);
            let w = g.edge_weight(id);
            assert!((2.0..=9.0).contains(&w));
        }
    }

    #[test]
    fn same_seed_same_graph() {
        let gen = RandomGraph::new().nodes(16).edge_prob(0.4);
        let a = gen.generate(&mut Pcg64Mcg::seed_from_u64(3));
        let b = gen.generate(&mut Pcg64Mcg::seed_from_u64(3));
        assert_eq!(a.number_of_edges(), b.number_of_edges());
        for id in 0..a.number_of_edges() {
            assert_eq!(a.edge_endpoints(id), b.edge_endpoints(id));
        }
    }

    #[test]
    fn extreme_probabilities() {
        let rng = &mut Pcg64Mcg::seed_from_u64(1);
        let empty = RandomGraph::new().nodes(8).edge_prob(0.0).generate(rng);
        assert_eq!(empty.number_of_edges(), 0);

        let complete = RandomGraph::new().nodes(8).edge_prob(1.0).generate(rng);
        assert_eq!(complete.number_of_edges(), 8 * 7 / 2);
    }
}
