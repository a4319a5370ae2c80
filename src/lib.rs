/*!
`matchings` is a library of **maximum matching algorithms** for general
(non-bipartite) undirected graphs:

- **Maximum-weight matching** via the primal-dual blossom method, in three
  variants sharing one skeleton:
  - [`EdmondsMatching`](blossom::EdmondsMatching) — `O(n * m^2)`, plain scans.
  - [`GabowMatching`](blossom::GabowMatching) — `O(n^3)`, best-edge tables.
  - [`MicaliGabowMatching`](blossom::MicaliGabowMatching) —
    `O(n * m * alpha(n, m))`, priority-queue dualities.
- **Maximum-cardinality matching** via the Micali-Vazirani algorithm
  ([`MicaliVaziraniMatching`](mv::MicaliVaziraniMatching)) — `O(m * sqrt(n))`.

# Representation

Nodes are `u32` values `0..n`; every edge carries a stable `u32` id and, for
the weighted algorithms, a non-negative `f64` weight. The algorithms are
generic over the capability traits in [`ops`]; [`repr`] provides ready-made
adjacency-array representations.

# Usage

```
use matchings::prelude::*;

// a 5-cycle with a heavy pendant edge: forces one blossom
let g = WeightedAdjArray::from_weighted_edges(6, [
    (0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 0, 1.0),
    (0, 5, 10.0),
]);

let matching = g.maximum_weight_matching(WeightedAlgorithm::MicaliGabow);
assert_eq!(matching.pairs(), vec![(0, 5), (1, 2), (3, 4)]);
assert_eq!(matching.total_weight(&g), 12.0);

// cardinality only: same graph, unweighted view
let matching = g.maximum_cardinality_matching();
assert_eq!(matching.cardinality(), 3);
```

# Determinism

Runs on identical inputs produce identical matchings: all tie-breaking is by
edge or blossom id, and no randomized data structure leaks iteration order
into results.

# Exactness

With integer-valued weights every dual update is a dyadic rational and the
computation is exact. Arbitrary floating-point weights are accepted; ties
may then be broken by rounding.
*/

pub mod blossom;
pub mod edge;
pub mod gens;
pub mod matching;
pub mod mv;
pub mod node;
pub mod ops;
pub mod pq;
pub mod repr;
#[cfg(test)]
pub(crate) mod testing;

/// `matchings::prelude` exports the graph types, capability traits, and all
/// algorithm entry points.
pub mod prelude {
    pub use super::{
        blossom::{EdmondsMatching, GabowMatching, MicaliGabowMatching},
        edge::*,
        matching::{Matching, MaximumMatching, WeightedAlgorithm},
        mv::MicaliVaziraniMatching,
        node::*,
        ops::*,
        repr::{AdjArray, WeightedAdjArray},
    };
}
