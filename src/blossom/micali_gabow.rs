//! The Micali-Gabow variant: linear scans are replaced by priority queues
//! with uniform shifts, so a dual adjustment is a constant number of
//! `O(1)` shifts and every delta candidate is a queue minimum.
//!
//! - `u_even` / `u_odd` hold the duals of even / odd vertices; free duals
//!   stay in a plain array.
//! - `z_even` / `z_odd` hold the duals of non-trivial top-level blossoms.
//! - `good_edges` holds edges between distinct even blossoms at `pi / 2`.
//! - `even_edges` holds edges from even vertices into odd or free blossoms,
//!   one group per target blossom; free groups shift, odd groups are frozen.
//! - A concatenable queue per blossom stores its nodes in traversal order;
//!   the root annotation is the blossom handle, which makes top-level lookup
//!   a tree-root query and keeps blossom merges `O(log n)`.

use crate::{
    edge::*,
    node::*,
    pq::{ConcatQueues, GroupedQueue, ShiftableQueue, NO_ANNOTATION},
};

use super::{blossom_algorithm, BlossomCore, BlossomId, BlossomVariant, EdgeInfo, Label};

pub(crate) struct MicaliGabowVariant {
    /// Canonical node duals; authoritative for free vertices during a stage
    /// and for everyone between stages.
    u: Vec<Weight>,
    u_even: ShiftableQueue,
    u_odd: ShiftableQueue,
    /// Blossom duals keyed by blossom id, for non-trivial top-level blossoms.
    z_even: ShiftableQueue,
    z_odd: ShiftableQueue,
    /// Edges between distinct even top-level blossoms, priority `pi / 2`.
    /// Entries whose endpoints merged are discarded lazily.
    good_edges: ShiftableQueue,
    /// Edges from even vertices into odd/free blossoms, grouped by target.
    even_edges: GroupedQueue,
    /// Node sequences per blossom, rebuilt each stage; the root annotation
    /// is the blossom id.
    concat: ConcatQueues,
}

impl MicaliGabowVariant {
    fn top(&self, v: Node) -> BlossomId {
        BlossomId(self.concat.annotation_of(v))
    }

    /// Current dual of a vertex, wherever it is stored.
    fn u_of(&self, v: Node) -> Weight {
        self.u_even
            .priority(v)
            .or_else(|| self.u_odd.priority(v))
            .unwrap_or(self.u[v as usize])
    }

    fn slack(&self, core: &BlossomCore, id: EdgeId) -> Weight {
        let (x, y) = core.endpoints(id);
        self.u_of(x) + self.u_of(y) - core.weight(id)
    }

    /// Scans all edges leaving `nodes` (vertices that just became even,
    /// inside top-level blossom `b`) into the slack queues.
    fn scan_nodes(&mut self, core: &BlossomCore, b: BlossomId, nodes: &[Node]) {
        for &x in nodes {
            for h in core.half_edges_of(x) {
                let target = self.top(h.node);
                if target == b {
                    continue;
                }
                let pi = self.slack(core, h.id);
                match core.arena[target].label {
                    Label::Even => {
                        if !self.good_edges.contains(h.id) {
                            self.good_edges.insert(h.id, pi / 2.0);
                        }
                    }
                    Label::Odd | Label::Free => {
                        self.even_edges.insert(target.0, h.id, pi);
                    }
                }
            }
        }
    }

    /// Drops `good_edges` entries whose endpoints meanwhile share a blossom.
    fn clear_not_good_edges(&mut self, core: &BlossomCore) {
        while let Some((id, _)) = self.good_edges.find_min() {
            let (x, y) = core.endpoints(id);
            if self.top(x) == self.top(y) {
                self.good_edges.remove(id);
            } else {
                break;
            }
        }
    }

    /// Concatenable-queue root of the tree holding blossom `b`'s nodes.
    fn tree_root_of(&self, core: &BlossomCore, b: BlossomId) -> u32 {
        self.concat.root_of(core.arena.nodes_of(b)[0])
    }

    /// Orients an edge so that the even endpoint comes first.
    fn oriented_from_even(&self, core: &BlossomCore, id: EdgeId) -> EdgeInfo {
        let (x, y) = core.endpoints(id);
        if core.arena[self.top(x)].label == Label::Even {
            core.edge_from(id, x)
        } else {
            core.edge_from(id, y)
        }
    }
}

impl BlossomVariant for MicaliGabowVariant {
    fn new(core: &BlossomCore) -> Self {
        let n = core.number_of_nodes() as usize;
        let m = core.number_of_edges() as usize;
        Self {
            u: vec![core.max_edge_weight() / 2.0; n],
            u_even: ShiftableQueue::new(n),
            u_odd: ShiftableQueue::new(n),
            z_even: ShiftableQueue::new(n),
            z_odd: ShiftableQueue::new(n),
            good_edges: ShiftableQueue::new(m),
            even_edges: GroupedQueue::new(m),
            concat: ConcatQueues::with_capacity(n),
        }
    }

    fn initialize_stage(&mut self, core: &mut BlossomCore) {
        let n = core.number_of_nodes();
        self.u_even.clear();
        self.u_odd.clear();
        self.z_even.clear();
        self.z_odd.clear();
        self.good_edges.clear();
        self.even_edges = GroupedQueue::new(core.number_of_edges() as usize);

        // rebuild the node sequences; element refs coincide with vertices
        self.concat.clear();
        for _ in 0..n {
            self.concat.make_elem(NO_ANNOTATION);
        }

        let top: Vec<u32> = core.top_level.iter().copied().collect();
        for &bid in &top {
            let b = BlossomId(bid);
            let nodes = core.arena.nodes_of(b);
            let mut root = nodes[0];
            for &v in &nodes[1..] {
                root = self.concat.concat(root, v);
            }
            self.concat.set_annotation(root, bid);

            match core.arena[b].label {
                Label::Even => {
                    for v in nodes {
                        self.u_even.insert(v, self.u[v as usize]);
                    }
                    if !core.arena[b].is_trivial() {
                        self.z_even.insert(bid, core.arena[b].z);
                    }
                }
                Label::Free => self.even_edges.new_group(bid, true),
                Label::Odd => unreachable!("odd blossom at stage start"),
            }
        }

        for &bid in &top {
            let b = BlossomId(bid);
            if core.arena[b].label == Label::Even {
                let nodes = core.arena.nodes_of(b);
                self.scan_nodes(core, b, &nodes);
            }
        }
    }

    fn finish_stage(&mut self, core: &mut BlossomCore) {
        for (v, p) in self.u_even.iter() {
            self.u[v as usize] = p;
        }
        for (v, p) in self.u_odd.iter() {
            self.u[v as usize] = p;
        }
        let z_entries: Vec<(u32, Weight)> = self.z_even.iter().chain(self.z_odd.iter()).collect();
        for (bid, z) in z_entries {
            core.arena[BlossomId(bid)].z = z;
        }
    }

    fn initialize_substage(&mut self, _core: &mut BlossomCore) {}

    fn has_useful_edges(&mut self, core: &mut BlossomCore) -> bool {
        self.clear_not_good_edges(core);
        if matches!(self.good_edges.find_min(), Some((_, p)) if p <= 0.0) {
            return true;
        }
        matches!(self.even_edges.find_min_shifting(), Some((_, _, p)) if p <= 0.0)
    }

    fn get_useful_edge(&mut self, core: &mut BlossomCore) -> Option<EdgeInfo> {
        self.clear_not_good_edges(core);
        if let Some((id, p)) = self.good_edges.find_min() {
            if p <= 0.0 {
                self.good_edges.remove(id);
                return Some(self.oriented_from_even(core, id));
            }
        }
        if let Some((_, id, p)) = self.even_edges.find_min_shifting() {
            if p <= 0.0 {
                self.even_edges.remove(id);
                return Some(self.oriented_from_even(core, id));
            }
        }
        None
    }

    fn label_odd(&mut self, core: &mut BlossomCore, b: BlossomId) {
        for v in core.arena.nodes_of(b) {
            self.u_odd.insert(v, self.u[v as usize]);
        }
        if !core.arena[b].is_trivial() {
            self.z_odd.insert(b.0, core.arena[b].z);
        }
        self.even_edges.set_shifting(b.0, false);
    }

    fn label_even(&mut self, core: &mut BlossomCore, b: BlossomId) {
        let nodes = core.arena.nodes_of(b);
        for &v in &nodes {
            self.u_even.insert(v, self.u[v as usize]);
        }
        if !core.arena[b].is_trivial() {
            self.z_even.insert(b.0, core.arena[b].z);
        }
        // edges from even blossoms into b now connect two even blossoms
        for (id, pi) in self.even_edges.delete_group(b.0) {
            if !self.good_edges.contains(id) {
                self.good_edges.insert(id, pi / 2.0);
            }
        }
        self.scan_nodes(core, b, &nodes);
    }

    fn handle_new_blossom(&mut self, core: &mut BlossomCore, b: BlossomId) {
        let children: Vec<(BlossomId, Label)> = core.arena[b]
            .sub_blossoms
            .iter()
            .map(|&(c, _)| (c, core.arena[c].label))
            .collect();

        // move duals of previously odd children to the even side; absorbed
        // blossoms freeze their z inside the record
        for &(c, label) in &children {
            match label {
                Label::Odd => {
                    for v in core.arena.nodes_of(c) {
                        let val = self.u_odd.remove(v).expect("odd vertex dual missing");
                        self.u_even.insert(v, val);
                    }
                    if !core.arena[c].is_trivial() {
                        let z = self.z_odd.remove(c.0).expect("odd blossom dual missing");
                        core.arena[c].z = z;
                    }
                    // edges into c are rescanned from inside below
                    self.even_edges.delete_group(c.0);
                }
                Label::Even => {
                    if !core.arena[c].is_trivial() {
                        let z = self.z_even.remove(c.0).expect("even blossom dual missing");
                        core.arena[c].z = z;
                    }
                }
                Label::Free => unreachable!("free blossom absorbed into a cycle"),
            }
        }

        // concatenate the node sequences in cycle order
        let mut root = self.tree_root_of(core, children[0].0);
        for &(c, _) in &children[1..] {
            root = self.concat.concat(root, self.tree_root_of(core, c));
        }
        self.concat.set_annotation(root, b.0);

        self.z_even.insert(b.0, 0.0);

        // vertices of previously odd children are now even sources
        for &(c, label) in &children {
            if label == Label::Odd {
                let nodes = core.arena.nodes_of(c);
                self.scan_nodes(core, b, &nodes);
            }
        }
    }

    fn handle_subblossom_shift(&mut self, _core: &mut BlossomCore, _b: BlossomId, _sub: BlossomId) {}

    fn handle_odd_blossom_expansion(&mut self, core: &mut BlossomCore, b: BlossomId) {
        self.z_odd.remove(b.0);

        // split the node sequence back into per-child sequences
        let children: Vec<BlossomId> = core.arena[b]
            .sub_blossoms
            .iter()
            .map(|&(c, _)| c)
            .collect();
        for window in children.windows(2) {
            let (left, _rest) = self.concat.split_after(core.arena[window[0]].last_node);
            self.concat.set_annotation(left, window[0].0);
        }
        let last = *children.last().unwrap();
        let last_root = self.concat.root_of(core.arena[last].last_node);
        self.concat.set_annotation(last_root, last.0);

        // dual storage and groups follow the new labels
        for &c in &children {
            match core.arena[c].label {
                Label::Even => {
                    for v in core.arena.nodes_of(c) {
                        let val = self.u_odd.remove(v).expect("odd vertex dual missing");
                        self.u_even.insert(v, val);
                    }
                    if !core.arena[c].is_trivial() {
                        self.z_even.insert(c.0, core.arena[c].z);
                    }
                }
                Label::Odd => {
                    if !core.arena[c].is_trivial() {
                        self.z_odd.insert(c.0, core.arena[c].z);
                    }
                    self.even_edges.new_group(c.0, false);
                }
                Label::Free => {
                    for v in core.arena.nodes_of(c) {
                        let val = self.u_odd.remove(v).expect("odd vertex dual missing");
                        self.u[v as usize] = val;
                    }
                    self.even_edges.new_group(c.0, true);
                }
            }
        }

        // redistribute the edges that pointed into the expanded blossom
        for (id, pi) in self.even_edges.delete_group(b.0) {
            let (x, y) = core.endpoints(id);
            let (bx, by) = (self.top(x), self.top(y));
            if bx == by {
                continue;
            }
            if core.arena[bx].label == Label::Even && core.arena[by].label == Label::Even {
                if !self.good_edges.contains(id) {
                    self.good_edges.insert(id, pi / 2.0);
                }
            } else {
                let target = if core.arena[bx].label == Label::Even {
                    by
                } else {
                    bx
                };
                self.even_edges.insert(target.0, id, pi);
            }
        }

        for &c in &children {
            if core.arena[c].label == Label::Even {
                let nodes = core.arena.nodes_of(c);
                self.scan_nodes(core, c, &nodes);
            }
        }
    }

    fn handle_even_blossom_expansion(&mut self, _core: &mut BlossomCore, _b: BlossomId) {
        // only happens at stage finish; all stage structures are rebuilt on
        // the next initialize_stage
    }

    fn calc_delta1(&mut self, _core: &mut BlossomCore) -> Weight {
        self.u_even
            .find_min()
            .map_or(Weight::INFINITY, |(_, p)| p)
    }

    fn calc_delta2(&mut self, _core: &mut BlossomCore) -> Weight {
        self.even_edges
            .find_min_shifting()
            .map_or(Weight::INFINITY, |(_, _, p)| p)
    }

    fn calc_delta3(&mut self, core: &mut BlossomCore) -> Weight {
        self.clear_not_good_edges(core);
        self.good_edges
            .find_min()
            .map_or(Weight::INFINITY, |(_, p)| p)
    }

    fn calc_delta4(&mut self, _core: &mut BlossomCore) -> Weight {
        self.z_odd
            .find_min()
            .map_or(Weight::INFINITY, |(_, z)| z / 2.0)
    }

    fn adjust_by_delta(&mut self, _core: &mut BlossomCore, delta: Weight) {
        self.u_even.shift_all(-delta);
        self.u_odd.shift_all(delta);
        self.z_even.shift_all(2.0 * delta);
        self.z_odd.shift_all(-2.0 * delta);
        self.good_edges.shift_all(-delta);
        self.even_edges.shift_shifting(-delta);
    }

    fn find_delta2_useful_edges(&mut self, _core: &mut BlossomCore) {
        // tight entries surface through the queue minimum directly
    }

    fn find_delta3_useful_edges(&mut self, _core: &mut BlossomCore) {}

    fn odd_blossoms_to_expand(&mut self, _core: &mut BlossomCore) -> Vec<BlossomId> {
        self.z_odd
            .iter()
            .filter(|&(_, z)| z <= 0.0)
            .map(|(bid, _)| BlossomId(bid))
            .collect()
    }

    fn get_blossom(&self, _core: &BlossomCore, v: Node) -> BlossomId {
        self.top(v)
    }
}

blossom_algorithm!(
    /// Maximum-weight matching with the Micali-Gabow variant,
    /// `O(n * m * alpha(n, m))`.
    ///
    /// Replaces the linear delta scans with priority queues supporting
    /// uniform shifts ([`crate::pq::ShiftableQueue`],
    /// [`crate::pq::GroupedQueue`]) and finds top-level blossoms through
    /// concatenable node queues ([`crate::pq::ConcatQueues`]).
    ///
    /// # Examples
    /// ```
    /// use matchings::prelude::*;
    ///
    /// let g = WeightedAdjArray::from_weighted_edges(6, [
    ///     (0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 0, 1.0),
    ///     (0, 5, 10.0),
    /// ]);
    /// let mut algo = MicaliGabowMatching::new(&g);
    /// algo.run();
    /// assert_eq!(algo.matching().total_weight(&g), 12.0);
    /// ```
    MicaliGabowMatching,
    MicaliGabowVariant
);
