//! Gabow's `O(n^3)` variant: every even blossom keeps the tightest edge to
//! each other even blossom, and every non-even vertex keeps the tightest
//! edge arriving from an even vertex. Delta computations then scan best
//! entries instead of all edges.

use std::collections::VecDeque;

use fxhash::FxHashMap;

use crate::{edge::*, node::*};

use super::{blossom_algorithm, BlossomCore, BlossomId, BlossomVariant, EdgeInfo, Label};

/// Best-edge table of one even top-level blossom: for each other even
/// top-level blossom, the minimum-slack connecting edge.
#[derive(Default)]
struct GabowBlossomData {
    best_edges: FxHashMap<u32, EdgeInfo>,
    /// Cached minimum over `best_edges`; revalidated lazily because opposite
    /// blossoms may have merged since it was computed.
    best_edge: Option<EdgeInfo>,
}

pub(crate) struct GabowVariant {
    current_blossom: Vec<BlossomId>,
    u: Vec<Weight>,
    edge_queue: VecDeque<EdgeInfo>,
    data: FxHashMap<u32, GabowBlossomData>,
    /// Per vertex: tightest edge from an even vertex into it (oriented
    /// even-side first). Sources stay even for the rest of the stage, so
    /// entries never go stale; targets are revalidated on use.
    vertex_best: Vec<Option<EdgeInfo>>,
}

impl GabowVariant {
    fn slack(&self, core: &BlossomCore, id: EdgeId) -> Weight {
        let (x, y) = core.endpoints(id);
        self.u[x as usize] + self.u[y as usize] - core.weight(id)
    }

    /// Keeps the tighter of two candidate edges, breaking ties by edge id.
    fn tighter(&self, core: &BlossomCore, a: EdgeInfo, b: EdgeInfo) -> EdgeInfo {
        let (sa, sb) = (self.slack(core, a.id), self.slack(core, b.id));
        if sa < sb || (sa == sb && a.id < b.id) {
            a
        } else {
            b
        }
    }

    fn remap(&mut self, core: &BlossomCore, b: BlossomId) {
        for v in core.arena.nodes_of(b) {
            self.current_blossom[v as usize] = b;
        }
    }

    /// Scans all edges leaving the vertices in `nodes` (sources just turned
    /// even): records best-edge entries, updates per-vertex bests, and
    /// queues already tight edges. Entries are merged into `acc`.
    fn scan_sources(
        &mut self,
        core: &BlossomCore,
        b: BlossomId,
        nodes: &[Node],
        acc: &mut GabowBlossomData,
    ) {
        for &x in nodes {
            for h in core.half_edges_of(x) {
                let by = self.current_blossom[h.node as usize];
                if by == b {
                    continue;
                }
                let edge = core.edge_from(h.id, x);
                match core.arena[by].label {
                    Label::Even => {
                        let entry = acc.best_edges.entry(by.0).or_insert(edge);
                        *entry = self.tighter(core, *entry, edge);
                        if self.slack(core, h.id) <= 0.0 {
                            self.edge_queue.push_back(edge);
                        }
                    }
                    Label::Odd | Label::Free => {
                        let best = match self.vertex_best[h.node as usize] {
                            Some(old) => self.tighter(core, old, edge),
                            None => edge,
                        };
                        self.vertex_best[h.node as usize] = Some(best);
                        if core.arena[by].label == Label::Free && self.slack(core, h.id) <= 0.0 {
                            self.edge_queue.push_back(edge);
                        }
                    }
                }
            }
        }
    }

    /// Recomputes the cached minimum of a table, dropping entries whose
    /// opposite side was absorbed into `b` itself.
    fn refresh_best(&mut self, core: &BlossomCore, b: BlossomId) {
        let data = self.data.remove(&b.0).unwrap_or_default();
        let mut refreshed = GabowBlossomData::default();
        for (_, edge) in data.best_edges {
            let opposite = self.current_blossom[edge.v as usize];
            if opposite == b {
                continue;
            }
            let entry = refreshed.best_edges.entry(opposite.0).or_insert(edge);
            *entry = self.tighter(core, *entry, edge);
        }
        refreshed.best_edge = refreshed
            .best_edges
            .values()
            .copied()
            .reduce(|a, e| self.tighter(core, a, e));
        self.data.insert(b.0, refreshed);
    }
}

impl BlossomVariant for GabowVariant {
    fn new(core: &BlossomCore) -> Self {
        Self {
            current_blossom: (0..core.number_of_nodes())
                .map(|v| core.arena.trivial(v))
                .collect(),
            u: vec![core.max_edge_weight() / 2.0; core.number_of_nodes() as usize],
            edge_queue: VecDeque::new(),
            data: FxHashMap::default(),
            vertex_best: vec![None; core.number_of_nodes() as usize],
        }
    }

    fn initialize_stage(&mut self, core: &mut BlossomCore) {
        self.edge_queue.clear();
        self.data.clear();
        self.vertex_best.iter_mut().for_each(|b| *b = None);

        let top: Vec<u32> = core.top_level.iter().copied().collect();
        for b in top {
            let b = BlossomId(b);
            if core.arena[b].label == Label::Even {
                let nodes = core.arena.nodes_of(b);
                let mut acc = GabowBlossomData::default();
                self.scan_sources(core, b, &nodes, &mut acc);
                self.data.insert(b.0, acc);
                self.refresh_best(core, b);
            }
        }
    }

    fn finish_stage(&mut self, _core: &mut BlossomCore) {}

    fn initialize_substage(&mut self, _core: &mut BlossomCore) {}

    fn has_useful_edges(&mut self, _core: &mut BlossomCore) -> bool {
        !self.edge_queue.is_empty()
    }

    fn get_useful_edge(&mut self, _core: &mut BlossomCore) -> Option<EdgeInfo> {
        self.edge_queue.pop_front()
    }

    fn label_odd(&mut self, _core: &mut BlossomCore, _b: BlossomId) {}

    fn label_even(&mut self, core: &mut BlossomCore, b: BlossomId) {
        let nodes = core.arena.nodes_of(b);
        let mut acc = GabowBlossomData::default();
        self.scan_sources(core, b, &nodes, &mut acc);
        self.data.insert(b.0, acc);
        self.refresh_best(core, b);
    }

    fn handle_new_blossom(&mut self, core: &mut BlossomCore, b: BlossomId) {
        self.remap(core, b);

        let mut acc = GabowBlossomData::default();
        for i in 0..core.arena[b].sub_blossoms.len() {
            let (c, _) = core.arena[b].sub_blossoms[i];
            match core.arena[c].label {
                Label::Even => {
                    // merge the child's table, re-keyed by the current
                    // opposite blossoms
                    if let Some(child) = self.data.remove(&c.0) {
                        for (_, edge) in child.best_edges {
                            let opposite = self.current_blossom[edge.v as usize];
                            if opposite == b {
                                continue;
                            }
                            let entry = acc.best_edges.entry(opposite.0).or_insert(edge);
                            *entry = self.tighter(core, *entry, edge);
                        }
                    }
                }
                Label::Odd => {
                    // vertices of odd children just turned even; their edges
                    // have never been scanned from this side
                    let nodes = core.arena.nodes_of(c);
                    self.scan_sources(core, b, &nodes, &mut acc);
                }
                Label::Free => unreachable!("free blossom absorbed into a cycle"),
            }
        }
        self.data.insert(b.0, acc);
        self.refresh_best(core, b);
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
                self.label_even(core, c);
            }
        }
    }

    fn handle_even_blossom_expansion(&mut self, core: &mut BlossomCore, b: BlossomId) {
        self.data.remove(&b.0);
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
        for &b in &core.top_level {
            let b = BlossomId(b);
            if core.arena[b].label == Label::Free {
                for v in core.arena.nodes_of(b) {
                    if let Some(edge) = self.vertex_best[v as usize] {
                        delta = delta.min(self.slack(core, edge.id));
                    }
                }
            }
        }
        delta
    }

    fn calc_delta3(&mut self, core: &mut BlossomCore) -> Weight {
        let top: Vec<u32> = core.top_level.iter().copied().collect();
        let mut delta = Weight::INFINITY;
        for b in top {
            let b = BlossomId(b);
            if core.arena[b].label != Label::Even {
                continue;
            }
            // revalidate the cached best: its opposite endpoint may have
            // been absorbed into b since the cache was computed
            let stale = match self.data.get(&b.0).and_then(|d| d.best_edge) {
                Some(edge) => self.current_blossom[edge.v as usize] == b,
                None => false,
            };
            if stale {
                self.refresh_best(core, b);
            }
            if let Some(edge) = self.data.get(&b.0).and_then(|d| d.best_edge) {
                delta = delta.min(self.slack(core, edge.id) / 2.0);
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
        for &b in core.top_level.clone().iter() {
            let b = BlossomId(b);
            if core.arena[b].label == Label::Free {
                for v in core.arena.nodes_of(b) {
                    if let Some(edge) = self.vertex_best[v as usize] {
                        if self.slack(core, edge.id) <= 0.0 {
                            self.edge_queue.push_back(edge);
                        }
                    }
                }
            }
        }
    }

    fn find_delta3_useful_edges(&mut self, core: &mut BlossomCore) {
        for &b in core.top_level.clone().iter() {
            let b = BlossomId(b);
            if core.arena[b].label != Label::Even {
                continue;
            }
            if let Some(edge) = self.data.get(&b.0).and_then(|d| d.best_edge) {
                if self.current_blossom[edge.v as usize] != b
                    && self.slack(core, edge.id) <= 0.0
                {
                    self.edge_queue.push_back(edge);
                }
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
    /// Maximum-weight matching with Gabow's `O(n^3)` blossom variant.
    ///
    /// Keeps, for every even top-level blossom, a table of the tightest edge
    /// to every other even blossom (merged when blossoms are created), and
    /// for every non-even vertex the tightest edge arriving from an even
    /// vertex. Dual adjustments then only scan best entries.
    ///
    /// # Examples
    /// ```
    /// use matchings::prelude::*;
    ///
    /// let g = WeightedAdjArray::from_weighted_edges(4, [
    ///     (0, 1, 2.0), (1, 2, 1.0), (2, 3, 2.0), (0, 3, 1.0),
    /// ]);
    /// let mut algo = GabowMatching::new(&g);
    /// algo.run();
    /// assert_eq!(algo.matching().total_weight(&g), 4.0);
    /// ```
    GabowMatching,
    GabowVariant
);
