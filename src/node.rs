/*!
# Node Representation

Nodes are plain `u32` values in the range `0..n` where `n` is the number of
nodes in the graph. This keeps per-node state in dense arrays and lets nodes
index them directly, which the matching algorithms do constantly.
*/

use stream_bitset::bitset::BitSetImpl;

/// A node of a graph, 0-indexed.
pub type Node = u32;

/// Number of nodes in a graph.
///
/// There can be at most `2^32 - 1` nodes in a graph.
pub type NumNodes = u32;

/// BitSet indexed by nodes.
pub type NodeBitSet = BitSetImpl<Node>;
