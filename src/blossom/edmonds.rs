//! Edmonds' original weighted variant: all deltas and useful edges are found
//! by scanning, giving `O(n * m^2)` without auxiliary structures.

use std::collections::VecDeque;

use crate::{edge::*, node::*};

use super::{blossom_algorithm, BlossomCore, BlossomId, BlossomVariant, EdgeInfo, Label};

pub(crate) struct EdmondsVariant {
    /// Top-level blossom of every vertex, maintained incrementally.
    current_blossom: Vec<BlossomId>,
    /// Node duals.
    u: Vec<Weight>,
    /// FIFO of tight edges awaiting consideration.
    useful_edges: VecDeque<EdgeInfo>,
}

impl EdmondsVariant {
    /// Slack of an edge between different top-level blossoms. No blossom
    /// contains both endpoints, so only the node duals contribute.
    fn slack(&self, core: &BlossomCore, id: EdgeId) -> Weight {
        let (x, y) = core.endpoints(id);
        self.u[x as usize] + self.u[y as usize] - core.weight(id)
    }

    fn is_useful(&self, core: &BlossomCore, x: Node, y: Node, id: EdgeId) -> bool {
        let bx = self.current_blossom[x as usize];
        let by = self.current_blossom[y as usize];
        if bx == by || self.slack(core, id) > 0.0 {
            return false;
        }
        matches!(
            (core.arena[bx].label, core.arena[by].label),
            (Label::Even, Label::Even) | (Label::Even, Label::Free) | (Label::Free, Label::Even)
        )
    }

    /// Feeds all tight edges leaving an even blossom into the queue.
    fn scan_blossom(&mut self, core: &BlossomCore, b: BlossomId) {
        for x in core.arena.nodes_of(b) {
            for h in core.half_edges_of(x) {
                if self.current_blossom[h.node as usize] != b
                    && self.is_useful(core, x, h.node, h.id)
                {
                    self.useful_edges.push_back(core.edge_from(h.id, x));
                }
            }
        }
    }

    fn remap(&mut self, core: &BlossomCore, b: BlossomId) {
        for v in core.arena.nodes_of(b) {
            self.current_blossom[v as usize] = b;
        }
    }
}

impl BlossomVariant for EdmondsVariant {
    fn new(core: &BlossomCore) -> Self {
        Self {
            current_blossom: (0..core.number_of_nodes())
                .map(|v| core.arena.trivial(v))
                .collect(),
            u: vec![core.max_edge_weight() / 2.0; core.number_of_nodes() as usize],
            useful_edges: VecDeque::new(),
        }
    }

    fn initialize_stage(&mut self, core: &mut BlossomCore) {
        self.useful_edges.clear();
        for &b in core.top_level.clone().iter() {
            let b = BlossomId(b);
            if core.arena[b].label == Label::Even {
                self.scan_blossom(core, b);
            }
        }
    }

    fn finish_stage(&mut self, _core: &mut BlossomCore) {}

    fn initialize_substage(&mut self, _core: &mut BlossomCore) {}

    fn has_useful_edges(&mut self, _core: &mut BlossomCore) -> bool {
        !self.useful_edges.is_empty()
    }

    fn get_useful_edge(&mut self, _core: &mut BlossomCore) -> Option<EdgeInfo> {
        self.useful_edges.pop_front()
    }

    fn label_odd(&mut self, _core: &mut BlossomCore, _b: BlossomId) {}

    fn label_even(&mut self, core: &mut BlossomCore, b: BlossomId) {
        self.scan_blossom(core, b);
    }

    fn handle_new_blossom(&mut self, core: &mut BlossomCore, b: BlossomId) {
        self.remap(core, b);
        // previously odd children turned even with the merge; their edges
        // now leave an even blossom and may be useful
        for i in 0..core.arena[b].sub_blossoms.len() {
            let (c, _) = core.arena[b].sub_blossoms[i];
            if core.arena[c].label == Label::Odd {
                for x in core.arena.nodes_of(c) {
                    for h in core.half_edges_of(x) {
                        if self.current_blossom[h.node as usize] != b
                            && self.is_useful(core, x, h.node, h.id)
                        {
                            self.useful_edges.push_back(core.edge_from(h.id, x));
                        }
                    }
                }
            }
        }
    }

    fn handle_subblossom_shift(&mut self, _core: &mut BlossomCore, _b: BlossomId, _sub: BlossomId) {}

    fn handle_odd_blossom_expansion(&mut self, core: &mut BlossomCore, b: BlossomId) {
        for i in 0..core.arena[b].sub_blossoms.len() {
            let (c, _) = core.arena[b].sub_blossoms[i];
            self.remap(core, c);
        }
        for i in 0..core.arena[b].sub_blossoms.len() {
            let (c, _) = core.arena[b].sub_blossoms[i];
            if core.arena[c].label == Label::Even {
                self.scan_blossom(core, c);
            }
        }
    }

    fn handle_even_blossom_expansion(&mut self, core: &mut BlossomCore, b: BlossomId) {
        for i in 0..core.arena[b].sub_blossoms.len() {
            let (c, _) = core.arena[b].sub_blossoms[i];
            self.remap(core, c);
        }
    }

    fn calc_delta1(&mut self, core: &mut BlossomCore) -> Weight {
        let mut delta = Weight::INFINITY;
        for &b in &core.top_level {
            let b = BlossomId(b);
            if core.arena[b].label == Label::Even {
                for v in core.arena.nodes_of(b) {
                    delta = delta.min(self.u[v as usize]);
                }
            }
        }
        delta
    }

    fn calc_delta2(&mut self, core: &mut BlossomCore) -> Weight {
        let mut delta = Weight::INFINITY;
        for id in 0..core.number_of_edges() {
            let (x, y) = core.endpoints(id);
            let bx = self.current_blossom[x as usize];
            let by = self.current_blossom[y as usize];
            if matches!(
                (core.arena[bx].label, core.arena[by].label),
                (Label::Even, Label::Free) | (Label::Free, Label::Even)
            ) {
                delta = delta.min(self.slack(core, id));
            }
        }
        delta
    }

    fn calc_delta3(&mut self, core: &mut BlossomCore) -> Weight {
        let mut delta = Weight::INFINITY;
        for id in 0..core.number_of_edges() {
            let (x, y) = core.endpoints(id);
            let bx = self.current_blossom[x as usize];
            let by = self.current_blossom[y as usize];
            if bx != by
                && core.arena[bx].label == Label::Even
                && core.arena[by].label == Label::Even
            {
                delta = delta.min(self.slack(core, id) / 2.0);
            }
        }
        delta
    }

    fn calc_delta4(&mut self, core: &mut BlossomCore) -> Weight {
        let mut delta = Weight::INFINITY;
        for &b in &core.top_level {
            let b = BlossomId(b);
            if core.arena[b].label == Label::Odd && !core.arena[b].is_trivial() {
                delta = delta.min(core.arena[b].z / 2.0);
            }
        }
        delta
    }

    fn adjust_by_delta(&mut self, core: &mut BlossomCore, delta: Weight) {
        for &b in core.top_level.clone().iter() {
            let b = BlossomId(b);
            match core.arena[b].label {
                Label::Even => {
                    for v in core.arena.nodes_of(b) {
                        self.u[v as usize] -= delta;
                    }
                    if !core.arena[b].is_trivial() {
                        core.arena[b].z += 2.0 * delta;
                    }
                }
                Label::Odd => {
                    for v in core.arena.nodes_of(b) {
                        self.u[v as usize] += delta;
                    }
                    if !core.arena[b].is_trivial() {
                        core.arena[b].z -= 2.0 * delta;
                    }
                }
                Label::Free => {}
            }
        }
    }

    fn find_delta2_useful_edges(&mut self, core: &mut BlossomCore) {
        for id in 0..core.number_of_edges() {
            let (x, y) = core.endpoints(id);
            let bx = self.current_blossom[x as usize];
            let by = self.current_blossom[y as usize];
            let labels = (core.arena[bx].label, core.arena[by].label);
            if self.slack(core, id) <= 0.0 {
                if labels == (Label::Even, Label::Free) {
                    self.useful_edges.push_back(core.edge_from(id, x));
                } else if labels == (Label::Free, Label::Even) {
                    self.useful_edges.push_back(core.edge_from(id, y));
                }
            }
        }
    }

    fn find_delta3_useful_edges(&mut self, core: &mut BlossomCore) {
        for id in 0..core.number_of_edges() {
            let (x, y) = core.endpoints(id);
            let bx = self.current_blossom[x as usize];
            let by = self.current_blossom[y as usize];
            if bx != by
                && core.arena[bx].label == Label::Even
                && core.arena[by].label == Label::Even
                && self.slack(core, id) <= 0.0
            {
                self.useful_edges.push_back(core.edge_from(id, x));
            }
        }
    }

    fn odd_blossoms_to_expand(&mut self, core: &mut BlossomCore) -> Vec<BlossomId> {
        core.top_level
            .iter()
            .map(|&b| BlossomId(b))
            .filter(|&b| {
                core.arena[b].label == Label::Odd
                    && !core.arena[b].is_trivial()
                    && core.arena[b].z <= 0.0
            })
            .collect()
    }

    fn get_blossom(&self, _core: &BlossomCore, v: Node) -> BlossomId {
        self.current_blossom[v as usize]
    }
}

blossom_algorithm!(
    /// Maximum-weight matching with Edmonds' original blossom algorithm.
    ///
    /// Recomputes dual adjustments and tight edges by scanning the whole
    /// graph, giving `O(n * m^2)` time with no auxiliary structures. The
    /// variant of choice for small graphs and as a reference for the faster
    /// variants.
    ///
    /// # Examples
    /// ```
    /// use matchings::prelude::*;
    ///
    /// // weighted triangle: the single heaviest edge wins
    /// let g = WeightedAdjArray::from_weighted_edges(3, [(0, 1, 1.0), (1, 2, 2.0), (0, 2, 3.0)]);
    /// let mut algo = EdmondsMatching::new(&g);
    /// algo.run();
    /// assert_eq!(algo.matching().pairs(), vec![(0, 2)]);
    /// ```
    EdmondsMatching,
    EdmondsVariant
);
