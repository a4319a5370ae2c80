/*!
# Weighted Blossom Algorithms

This module implements **maximum-weight matching** on general undirected
graphs via the primal-dual blossom method. Three variants share one control
skeleton and differ only in the data structures used to find the next tight
edge and the next dual adjustment:

- [`EdmondsMatching`] — recomputes everything by scanning, `O(n * m^2)`.
- [`GabowMatching`] — per-blossom best-edge tables, `O(n^3)`.
- [`MicaliGabowMatching`] — priority-queue dualities, `O(n * m * alpha)`.

## Skeleton

The driver alternates *stages*; each stage grows alternating trees from all
exposed blossoms and ends either by augmenting along one augmenting path or
by proving optimality through the dual variables. Within a stage, *substages*
consume tight edges; when none remain, the duals are adjusted by the smallest
of four candidate deltas and odd blossoms whose dual reaches zero are
expanded.

Augmentation through a blossom only records the blossom's new base; the
interior matching is flipped lazily at stage end, which keeps the cost of a
stage proportional to the augmenting path instead of the total number of
nodes inside blossoms.

The variants plug into the skeleton through [`BlossomVariant`], a hook trait
mirroring the points where the control loop consults variant state.
*/

mod core;
mod edmonds;
mod gabow;
mod micali_gabow;
mod structure;

pub use edmonds::EdmondsMatching;
pub use gabow::GabowMatching;
pub use micali_gabow::MicaliGabowMatching;

pub(crate) use self::core::BlossomCore;
pub(crate) use structure::{Blossom, BlossomArena, BlossomId, EdgeInfo, Label};

use smallvec::SmallVec;

use crate::{edge::*, matching::Matching, node::*, ops::*};

/// Hooks through which a weighted variant plugs into the blossom skeleton.
///
/// Every hook receives the shared [`BlossomCore`]; the variant keeps its own
/// acceleration structures (dual storage, edge queues, blossom tables) and
/// must keep them consistent with the structural changes the skeleton
/// reports.
pub(crate) trait BlossomVariant {
    fn new(core: &BlossomCore) -> Self;

    /// Per-stage setup after the driver has labelled all exposed blossoms
    /// even and everything else free.
    fn initialize_stage(&mut self, core: &mut BlossomCore);

    /// Per-stage teardown before lazy flips and zero-dual expansions; folds
    /// stage-local dual storage back into canonical storage.
    fn finish_stage(&mut self, core: &mut BlossomCore);

    /// Reset of the useful-edge stream at the start of a substage.
    fn initialize_substage(&mut self, core: &mut BlossomCore);

    fn has_useful_edges(&mut self, core: &mut BlossomCore) -> bool;
    fn get_useful_edge(&mut self, core: &mut BlossomCore) -> Option<EdgeInfo>;

    /// A free blossom was labelled odd (its backtrack edge is already set).
    fn label_odd(&mut self, core: &mut BlossomCore, b: BlossomId);

    /// A free blossom was labelled even; tight incident edges must enter the
    /// useful-edge stream.
    fn label_even(&mut self, core: &mut BlossomCore, b: BlossomId);

    /// A new blossom was created; child structures must be merged. The
    /// children still carry their pre-merge labels.
    fn handle_new_blossom(&mut self, core: &mut BlossomCore, b: BlossomId);

    /// The cyclic order of `b` was rotated so that `sub` is now first.
    fn handle_subblossom_shift(&mut self, core: &mut BlossomCore, b: BlossomId, sub: BlossomId);

    /// An odd blossom was expanded mid-stage; its children are top-level and
    /// carry their new labels.
    fn handle_odd_blossom_expansion(&mut self, core: &mut BlossomCore, b: BlossomId);

    /// A blossom was expanded at stage finish.
    fn handle_even_blossom_expansion(&mut self, core: &mut BlossomCore, b: BlossomId);

    fn calc_delta1(&mut self, core: &mut BlossomCore) -> Weight;
    fn calc_delta2(&mut self, core: &mut BlossomCore) -> Weight;
    fn calc_delta3(&mut self, core: &mut BlossomCore) -> Weight;
    fn calc_delta4(&mut self, core: &mut BlossomCore) -> Weight;
    fn adjust_by_delta(&mut self, core: &mut BlossomCore, delta: Weight);

    /// Feed edges that became tight through a delta-2 / delta-3 adjustment
    /// into the useful-edge stream.
    fn find_delta2_useful_edges(&mut self, core: &mut BlossomCore);
    fn find_delta3_useful_edges(&mut self, core: &mut BlossomCore);

    /// Odd non-trivial top-level blossoms whose dual reached zero.
    fn odd_blossoms_to_expand(&mut self, core: &mut BlossomCore) -> Vec<BlossomId>;

    /// Top-level blossom containing a vertex.
    fn get_blossom(&self, core: &BlossomCore, v: Node) -> BlossomId;
}

/// Driver running the blossom skeleton with a concrete variant.
pub(crate) struct BlossomMatching<'a, G, V> {
    graph: &'a G,
    core: BlossomCore,
    variant: V,
    finished: bool,
}

impl<'a, G: WeightedAdjacency, V: BlossomVariant> BlossomMatching<'a, G, V> {
    pub fn new(graph: &'a G) -> Self {
        for id in 0..graph.number_of_edges() {
            assert!(
                graph.edge_weight(id) >= 0.0,
                "negative weight on edge {id}"
            );
        }
        let core = BlossomCore::new(graph);
        let variant = V::new(&core);
        Self {
            graph,
            core,
            variant,
            finished: false,
        }
    }

    pub fn run(&mut self) {
        if self.finished {
            return;
        }
        while self.run_stage() {}
        self.expand_final_blossoms();
        self.finished = true;
        debug_assert!(self.core.matching().is_valid(self.graph));
    }

    pub fn matching(&self) -> Matching {
        assert!(self.finished, "matching requested before run()");
        self.core.matching()
    }

    // ---------- Stage control ----------

    /// Runs one stage. Returns `true` iff an augmentation happened (so more
    /// stages may follow); `false` means the matching is optimal.
    fn run_stage(&mut self) -> bool {
        if !self
            .core
            .top_level
            .iter()
            .any(|&b| self.core.is_exposed(BlossomId(b)))
        {
            return false;
        }

        self.initialize_stage();

        let augmented = loop {
            if self.run_substage() {
                break true;
            }

            let d1 = self.variant.calc_delta1(&mut self.core);
            let d2 = self.variant.calc_delta2(&mut self.core);
            let d3 = self.variant.calc_delta3(&mut self.core);
            let d4 = self.variant.calc_delta4(&mut self.core);
            let delta = d1.min(d2).min(d3).min(d4);
            debug_assert!(delta.is_finite());

            self.variant.adjust_by_delta(&mut self.core, delta);

            // ties resolve towards delta1: a zero exposed dual ends the run
            if delta == d1 {
                break false;
            }
            if delta == d2 {
                self.variant.find_delta2_useful_edges(&mut self.core);
            } else if delta == d3 {
                self.variant.find_delta3_useful_edges(&mut self.core);
            }

            loop {
                let to_expand = self.variant.odd_blossoms_to_expand(&mut self.core);
                if to_expand.is_empty() {
                    break;
                }
                for b in to_expand {
                    self.expand_odd_blossom(b);
                }
            }
        };

        self.finish_stage();
        augmented
    }

    fn initialize_stage(&mut self) {
        let top: Vec<_> = self.core.top_level.iter().copied().collect();
        for b in top {
            let b = BlossomId(b);
            let exposed = self.core.is_exposed(b);
            let blossom = &mut self.core.arena[b];
            blossom.label = if exposed { Label::Even } else { Label::Free };
            blossom.backtrack_edge = None;
            blossom.visited = false;
            blossom.base_blossoms.clear();
        }
        self.variant.initialize_stage(&mut self.core);
    }

    fn finish_stage(&mut self) {
        self.variant.finish_stage(&mut self.core);

        // resolve pending lazy augmentations
        let top: Vec<_> = self.core.top_level.iter().copied().collect();
        for b in top {
            self.lazy_augment_path_in_blossom(BlossomId(b));
        }

        // blossoms with zero dual do not persist into the next stage
        let mut stack: Vec<BlossomId> = self
            .core
            .top_level
            .iter()
            .map(|&b| BlossomId(b))
            .filter(|&b| !self.core.arena[b].is_trivial() && self.core.arena[b].z <= 0.0)
            .collect();
        while let Some(b) = stack.pop() {
            self.expand_even_blossom(b);
            for i in 0..self.core.arena[b].sub_blossoms.len() {
                let c = self.core.arena[b].sub_blossoms[i].0;
                if !self.core.arena[c].is_trivial() && self.core.arena[c].z <= 0.0 {
                    stack.push(c);
                }
            }
        }

        self.core.check_consistency();
    }

    /// Consumes tight edges until one of them augments the matching.
    fn run_substage(&mut self) -> bool {
        self.variant.initialize_substage(&mut self.core);
        while self.variant.has_useful_edges(&mut self.core) {
            let Some(edge) = self.variant.get_useful_edge(&mut self.core) else {
                break;
            };
            if self.consider_edge(edge) {
                return true;
            }
        }
        false
    }

    // ---------- Edge consideration ----------

    /// Processes one tight edge; returns `true` iff it led to augmentation.
    fn consider_edge(&mut self, edge: EdgeInfo) -> bool {
        let bu = self.variant.get_blossom(&self.core, edge.u);
        let bv = self.variant.get_blossom(&self.core, edge.v);
        if bu == bv {
            return false;
        }

        match (self.core.arena[bu].label, self.core.arena[bv].label) {
            (Label::Even, Label::Even) => self.backtrack(bu, bv, edge),
            (Label::Even, Label::Free) => {
                self.grow(bv, edge);
                false
            }
            (Label::Free, Label::Even) => {
                self.grow(bu, edge.reverse());
                false
            }
            _ => false,
        }
    }

    /// Attaches the free blossom `b` to the tree through `edge` (oriented
    /// into `b`), labelling it odd and its matched partner even.
    fn grow(&mut self, b: BlossomId, edge: EdgeInfo) {
        debug_assert_eq!(self.core.arena[b].label, Label::Free);
        self.core.arena[b].label = Label::Odd;
        self.core.arena[b].backtrack_edge = Some(edge);
        self.variant.label_odd(&mut self.core, b);

        let base = self.core.arena[b].base;
        let (partner, id) = self.core.matched[base as usize]
            .expect("non-exposed free blossom must be matched");
        let bp = self.variant.get_blossom(&self.core, partner);
        debug_assert_eq!(self.core.arena[bp].label, Label::Free);
        self.core.arena[bp].label = Label::Even;
        self.core.arena[bp].backtrack_edge = Some(self.core.edge_from(id, base));
        self.variant.label_even(&mut self.core, bp);
    }

    // ---------- Backtracking ----------

    /// Walks from both endpoints of a tight even-even edge towards the tree
    /// roots. Either the walks collide in a common ancestor (then a new
    /// blossom is created) or they reach two distinct exposed roots (then
    /// the matching is augmented). Returns `true` iff augmented.
    fn backtrack(&mut self, bu: BlossomId, bv: BlossomId, edge: EdgeInfo) -> bool {
        let mut u_path: Vec<(BlossomId, EdgeInfo)> = Vec::new();
        let mut v_path: Vec<(BlossomId, EdgeInfo)> = Vec::new();
        let mut visited = vec![bu, bv];
        self.core.arena[bu].visited = true;
        self.core.arena[bv].visited = true;

        let mut iter_u = bu;
        let mut iter_v = bv;
        let mut ancestor = None;

        'walk: loop {
            let mut advanced = false;
            for side in 0..2 {
                let (iter, path) = if side == 0 {
                    (&mut iter_u, &mut u_path)
                } else {
                    (&mut iter_v, &mut v_path)
                };
                let Some(back) = self.core.arena[*iter].backtrack_edge else {
                    continue;
                };
                path.push((*iter, back));
                let next = self.variant.get_blossom(&self.core, back.u);
                *iter = next;
                if self.core.arena[next].visited {
                    ancestor = Some(next);
                    break 'walk;
                }
                self.core.arena[next].visited = true;
                visited.push(next);
                advanced = true;
            }
            if !advanced {
                break;
            }
        }

        for b in visited {
            self.core.arena[b].visited = false;
        }

        match ancestor {
            Some(a) => {
                Self::cut_path_at(&mut u_path, a);
                Self::cut_path_at(&mut v_path, a);
                self.create_new_blossom(a, &u_path, &v_path, edge);
                false
            }
            None => {
                self.augment_path(bu, bv, &u_path, &v_path, edge);
                true
            }
        }
    }

    /// Truncates a backtrack path at the common ancestor, keeping only the
    /// entries strictly below it.
    fn cut_path_at(path: &mut Vec<(BlossomId, EdgeInfo)>, cut: BlossomId) {
        if let Some(i) = path.iter().position(|&(b, _)| b == cut) {
            path.truncate(i);
        }
    }

    // ---------- Blossom creation ----------

    /// Folds the two backtrack paths and the triggering edge into a new even
    /// blossom around their common ancestor.
    fn create_new_blossom(
        &mut self,
        ancestor: BlossomId,
        u_path: &[(BlossomId, EdgeInfo)],
        v_path: &[(BlossomId, EdgeInfo)],
        edge: EdgeInfo,
    ) {
        debug_assert_eq!((u_path.len() + v_path.len()) % 2, 0);

        // cycle in traversal order, starting at the ancestor; each child is
        // paired with the edge to its successor (oriented out of the child)
        let mut subs: SmallVec<[(BlossomId, EdgeInfo); 3]> = SmallVec::new();
        subs.push((ancestor, u_path.last().map(|p| p.1).unwrap_or(edge)));
        for j in (1..u_path.len()).rev() {
            subs.push((u_path[j].0, u_path[j - 1].1));
        }
        if !u_path.is_empty() {
            subs.push((u_path[0].0, edge));
        }
        for &(b, back) in v_path {
            subs.push((b, back.reverse()));
        }

        let base = self.core.arena[ancestor].base;
        let backtrack_edge = self.core.arena[ancestor].backtrack_edge;
        let last_node = self.core.arena[subs.last().unwrap().0].last_node;

        let b_new = self.core.arena.create(Blossom {
            parent: None,
            initial_base: base,
            base,
            last_node,
            sub_blossoms: subs,
            base_blossoms: Vec::new(),
            label: Label::Even,
            backtrack_edge,
            visited: false,
            z: 0.0,
        });

        for i in 0..self.core.arena[b_new].sub_blossoms.len() {
            let c = self.core.arena[b_new].sub_blossoms[i].0;
            self.core.arena[c].parent = Some(b_new);
            self.core.top_level.remove(&c.0);
        }
        self.core.top_level.insert(b_new.0);

        self.variant.handle_new_blossom(&mut self.core, b_new);
        self.core.check_consistency();
    }

    // ---------- Augmentation ----------

    /// Toggles the matching along the augmenting path `root .. bu -edge- bv
    /// .. root'`. Interior blossom flips are deferred: only the new bases
    /// are recorded here.
    fn augment_path(
        &mut self,
        bu: BlossomId,
        bv: BlossomId,
        u_path: &[(BlossomId, EdgeInfo)],
        v_path: &[(BlossomId, EdgeInfo)],
        edge: EdgeInfo,
    ) {
        debug_assert_eq!(u_path.len() % 2, 0);
        debug_assert_eq!(v_path.len() % 2, 0);

        // unmatch the previously matched tree edges first so the guarded
        // partner updates never clobber fresh entries
        for path in [u_path, v_path] {
            for (j, &(_, back)) in path.iter().enumerate() {
                if j % 2 == 0 {
                    self.core.swap_edge_in_matching(back.id);
                }
            }
        }
        self.core.swap_edge_in_matching(edge.id);
        for path in [u_path, v_path] {
            for (j, &(_, back)) in path.iter().enumerate() {
                if j % 2 == 1 {
                    self.core.swap_edge_in_matching(back.id);
                }
            }
        }

        self.record_new_bases(bu, u_path, edge.u);
        self.record_new_bases(bv, v_path, edge.v);
    }

    /// Records the post-augmentation base for every blossom on one side of
    /// the augmenting path, including the exposed root.
    fn record_new_bases(
        &mut self,
        start: BlossomId,
        path: &[(BlossomId, EdgeInfo)],
        entry: Node,
    ) {
        let mut blossoms: Vec<BlossomId> = path.iter().map(|p| p.0).collect();
        if let Some(last) = path.last() {
            blossoms.push(self.variant.get_blossom(&self.core, last.1.u));
        } else {
            blossoms.push(start);
        }

        for (j, &b) in blossoms.iter().enumerate() {
            let new_base = if j == 0 {
                entry
            } else if j % 2 == 1 {
                path[j].1.v
            } else {
                path[j - 1].1.u
            };
            if self.core.arena[b].is_trivial() {
                debug_assert_eq!(self.core.arena[b].base, new_base);
                continue;
            }
            self.core.arena[b].base = new_base;
            self.core.arena[b].base_blossoms = self.core.arena.chain_below(new_base, b);
        }
    }

    // ---------- Lazy interior flips ----------

    /// Applies a recorded base change: flips the interior matching and
    /// rotates the cycle so the new base child comes first.
    fn lazy_augment_path_in_blossom(&mut self, b: BlossomId) {
        if self.core.arena[b].base_blossoms.is_empty() {
            return;
        }
        let target = self.core.arena[b].base;
        self.core.arena[b].base_blossoms.clear();
        self.move_base_to(b, target);
    }

    /// Makes the interior matching of `b` consistent with base vertex `v`.
    /// Assumes the interior currently matches the first sub-blossom's base.
    fn move_base_to(&mut self, b: BlossomId, v: Node) {
        if self.core.arena[b].is_trivial() {
            debug_assert_eq!(self.core.arena[b].base, v);
            return;
        }

        let subs = self.core.arena[b].sub_blossoms.clone();
        let len = subs.len();
        let t = subs
            .iter()
            .position(|&(c, _)| self.core.arena.contains(c, v))
            .expect("new base must lie inside the blossom");

        if t > 0 {
            // toggle the even-length arc between the old and the new base
            // child; every child on the arc follows its newly matched edge
            if t % 2 == 0 {
                for &(_, e) in &subs[..t] {
                    self.core.swap_edge_in_matching(e.id);
                }
                for i in 0..t {
                    let x = if i % 2 == 0 {
                        subs[i].1.u
                    } else {
                        subs[i - 1].1.v
                    };
                    self.move_base_to(subs[i].0, x);
                }
            } else {
                for &(_, e) in &subs[t..] {
                    self.core.swap_edge_in_matching(e.id);
                }
                self.move_base_to(subs[0].0, subs[len - 1].1.v);
                for j in t + 1..len {
                    let x = if (j - t) % 2 == 1 {
                        subs[j].1.u
                    } else {
                        subs[j - 1].1.v
                    };
                    self.move_base_to(subs[j].0, x);
                }
            }
        }

        self.move_base_to(subs[t].0, v);

        if t > 0 {
            let rotated: SmallVec<[(BlossomId, EdgeInfo); 3]> =
                subs[t..].iter().chain(subs[..t].iter()).copied().collect();
            self.core.arena[b].sub_blossoms = rotated;
            self.core.arena[b].last_node = self.core.arena[subs[t - 1].0].last_node;
            self.variant
                .handle_subblossom_shift(&mut self.core, b, subs[t].0);
        }
        self.core.arena[b].base = v;
    }

    // ---------- Expansion ----------

    /// Expands an odd blossom whose dual reached zero: the children become
    /// top-level, the even-length arc between the entry child and the base
    /// child joins the tree with alternating labels, the rest becomes free.
    fn expand_odd_blossom(&mut self, b: BlossomId) {
        debug_assert_eq!(self.core.arena[b].label, Label::Odd);
        debug_assert!(!self.core.arena[b].is_trivial());
        debug_assert!(self.core.arena[b].z <= 0.0);

        let subs = self.core.arena[b].sub_blossoms.clone();
        let len = subs.len();
        let entry_edge = self.core.arena[b]
            .backtrack_edge
            .expect("odd blossom without backtrack edge");
        let t = subs
            .iter()
            .position(|&(c, _)| self.core.arena.contains(c, entry_edge.v))
            .expect("backtrack edge must end inside the blossom");

        self.core.top_level.remove(&b.0);
        for &(c, _) in &subs {
            self.core.arena[c].parent = None;
            self.core.arena[c].label = Label::Free;
            self.core.arena[c].backtrack_edge = None;
            self.core.top_level.insert(c.0);
        }

        // walk the even-length arc from the entry child towards the base
        // child, alternating odd/even labels
        self.core.arena[subs[t].0].label = Label::Odd;
        self.core.arena[subs[t].0].backtrack_edge = Some(entry_edge);
        if t % 2 == 0 {
            for j in (0..t).rev() {
                let c = subs[j].0;
                self.core.arena[c].label = if (t - j) % 2 == 1 {
                    Label::Even
                } else {
                    Label::Odd
                };
                self.core.arena[c].backtrack_edge = Some(subs[j].1.reverse());
            }
        } else {
            for j in t + 1..len {
                let c = subs[j].0;
                self.core.arena[c].label = if (j - t) % 2 == 1 {
                    Label::Even
                } else {
                    Label::Odd
                };
                self.core.arena[c].backtrack_edge = Some(subs[j - 1].1);
            }
            self.core.arena[subs[0].0].label = Label::Odd;
            self.core.arena[subs[0].0].backtrack_edge = Some(subs[len - 1].1);
        }
        debug_assert_eq!(self.core.arena[subs[0].0].label, Label::Odd);

        self.variant.handle_odd_blossom_expansion(&mut self.core, b);
        self.core.check_consistency();
    }

    /// Releases the children of a blossom at stage finish.
    fn expand_even_blossom(&mut self, b: BlossomId) {
        debug_assert!(self.core.arena[b].base_blossoms.is_empty());
        self.core.top_level.remove(&b.0);
        for i in 0..self.core.arena[b].sub_blossoms.len() {
            let c = self.core.arena[b].sub_blossoms[i].0;
            self.core.arena[c].parent = None;
            self.core.arena[c].label = Label::Free;
            self.core.arena[c].backtrack_edge = None;
            self.core.top_level.insert(c.0);
        }
        self.variant.handle_even_blossom_expansion(&mut self.core, b);
    }

    /// Flattens every surviving blossom once the algorithm has terminated.
    fn expand_final_blossoms(&mut self) {
        loop {
            let non_trivial: Vec<BlossomId> = self
                .core
                .top_level
                .iter()
                .map(|&b| BlossomId(b))
                .filter(|&b| !self.core.arena[b].is_trivial())
                .collect();
            if non_trivial.is_empty() {
                break;
            }
            for b in non_trivial {
                self.expand_even_blossom(b);
            }
        }
    }
}

/// Generates the public wrapper around [`BlossomMatching`] for one variant.
macro_rules! blossom_algorithm {
    ($(#[$attr:meta])* $name:ident, $variant:ty) => {
        $(#[$attr])*
        pub struct $name<'a, G> {
            inner: crate::blossom::BlossomMatching<'a, G, $variant>,
        }

        impl<'a, G: crate::ops::WeightedAdjacency> $name<'a, G> {
            /// Sets up the algorithm for the given graph.
            ///
            /// **Panics** if the graph has an edge of negative weight.
            pub fn new(graph: &'a G) -> Self {
                Self {
                    inner: crate::blossom::BlossomMatching::new(graph),
                }
            }

            /// Runs the algorithm to completion. Subsequent calls are no-ops.
            pub fn run(&mut self) {
                self.inner.run();
            }

            /// Returns the computed matching.
            ///
            /// **Panics** if called before [`Self::run`].
            pub fn matching(&self) -> crate::matching::Matching {
                self.inner.matching()
            }

            /// Consumes the algorithm and returns the computed matching.
            ///
            /// **Panics** if called before [`Self::run`].
            pub fn take_matching(self) -> crate::matching::Matching {
                self.inner.matching()
            }
        }
    };
}

pub(crate) use blossom_algorithm;

#[cfg(test)]
mod tests {
    use crate::{
        edge::Edge,
        gens::RandomGraph,
        matching::{Matching, MaximumMatching, WeightedAlgorithm},
        node::NumNodes,
        ops::*,
        repr::WeightedAdjArray,
        testing::max_weight_brute_force,
    };
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    const ALL: [WeightedAlgorithm; 3] = [
        WeightedAlgorithm::Edmonds,
        WeightedAlgorithm::Gabow,
        WeightedAlgorithm::MicaliGabow,
    ];

    fn solve(g: &WeightedAdjArray, algo: WeightedAlgorithm) -> Matching {
        let m = g.maximum_weight_matching(algo);
        assert!(m.is_valid(g));
        m
    }

    #[test]
    fn unweighted_triangle_matches_one_pair() {
        let g = WeightedAdjArray::from_edges(3, [(0, 1), (1, 2), (0, 2)]);
        for algo in ALL {
            assert_eq!(solve(&g, algo).cardinality(), 1);
        }
    }

    #[test]
    fn unweighted_four_clique_is_perfect() {
        let g = WeightedAdjArray::from_edges(4, [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        for algo in ALL {
            assert_eq!(solve(&g, algo).cardinality(), 2);
        }
    }

    #[test]
    fn unweighted_path_of_five_vertices() {
        let g = WeightedAdjArray::from_edges(5, [(0, 1), (1, 2), (2, 3), (3, 4)]);
        for algo in ALL {
            assert_eq!(solve(&g, algo).cardinality(), 2);
        }
    }

    #[test]
    fn weighted_triangle_takes_the_heavy_edge() {
        let g = WeightedAdjArray::from_weighted_edges(3, [(0, 1, 1.0), (1, 2, 2.0), (0, 2, 3.0)]);
        for algo in ALL {
            let m = solve(&g, algo);
            assert_eq!(m.pairs(), vec![(0, 2)]);
            assert_eq!(m.total_weight(&g), 3.0);
        }
    }

    #[test]
    fn light_pair_beats_single_heavy_edge() {
        let g = WeightedAdjArray::from_weighted_edges(4, [(0, 1, 3.0), (1, 2, 5.0), (2, 3, 3.0)]);
        for algo in ALL {
            let m = solve(&g, algo);
            assert_eq!(m.pairs(), vec![(0, 1), (2, 3)]);
            assert_eq!(m.total_weight(&g), 6.0);
        }
    }

    #[test]
    fn petersen_graph_gets_a_perfect_matching() {
        let outer = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)];
        let spokes = [(0, 5), (1, 6), (2, 7), (3, 8), (4, 9)];
        let inner = [(5, 7), (7, 9), (9, 6), (6, 8), (8, 5)];
        let g = WeightedAdjArray::from_edges(10, outer.into_iter().chain(spokes).chain(inner));
        for algo in ALL {
            let m = solve(&g, algo);
            assert_eq!(m.cardinality(), 5);
            assert_eq!(m.total_weight(&g), 5.0);
        }
    }

    #[test]
    fn blossom_stress_cycle_with_heavy_pendant() {
        // the 5-cycle forces a blossom to form and later expand; the heavy
        // pendant edge must end up matched
        let g = WeightedAdjArray::from_weighted_edges(
            6,
            [
                (0, 1, 1.0),
                (1, 2, 1.0),
                (2, 3, 1.0),
                (3, 4, 1.0),
                (4, 0, 1.0),
                (0, 5, 10.0),
            ],
        );
        for algo in ALL {
            let m = solve(&g, algo);
            assert_eq!(m.pairs(), vec![(0, 5), (1, 2), (3, 4)]);
            assert_eq!(m.total_weight(&g), 12.0);
        }
    }

    #[test]
    fn nested_blossoms_resolve_correctly() {
        // two triangles joined by a path; optimum must pick across them
        let g = WeightedAdjArray::from_weighted_edges(
            8,
            [
                (0, 1, 2.0),
                (1, 2, 2.0),
                (0, 2, 2.0),
                (2, 3, 3.0),
                (3, 4, 1.0),
                (4, 5, 2.0),
                (5, 6, 2.0),
                (4, 6, 2.0),
                (6, 7, 3.0),
            ],
        );
        let expect = max_weight_brute_force(
            8,
            &[
                (0, 1, 2.0),
                (1, 2, 2.0),
                (0, 2, 2.0),
                (2, 3, 3.0),
                (3, 4, 1.0),
                (4, 5, 2.0),
                (5, 6, 2.0),
                (4, 6, 2.0),
                (6, 7, 3.0),
            ],
        );
        for algo in ALL {
            assert_eq!(solve(&g, algo).total_weight(&g), expect);
        }
    }

    #[test]
    fn isolated_vertices_are_ignored() {
        let g = WeightedAdjArray::from_weighted_edges(6, [(1, 2, 4.0), (3, 4, 2.0)]);
        for algo in ALL {
            let m = solve(&g, algo);
            assert_eq!(m.pairs(), vec![(1, 2), (3, 4)]);
            assert!(!m.is_matched(0));
            assert!(!m.is_matched(5));
        }
    }

    #[test]
    fn empty_and_edgeless_graphs() {
        for algo in ALL {
            let g = WeightedAdjArray::new(0);
            assert_eq!(solve(&g, algo).cardinality(), 0);

            let g = WeightedAdjArray::new(5);
            assert_eq!(solve(&g, algo).cardinality(), 0);
        }
    }

    #[test]
    fn variants_agree_with_brute_force_on_random_graphs() {
        let rng = &mut Pcg64Mcg::seed_from_u64(0xb10550);

        for n in [4 as NumNodes, 6, 8, 10, 12] {
            for p in [0.2, 0.4, 0.7] {
                for _ in 0..10 {
                    let g = RandomGraph::new()
                        .nodes(n)
                        .edge_prob(p)
                        .weight_range(0.0..=8.0)
                        .integer_weights(rng);
                    let edges: Vec<_> = (0..g.number_of_edges())
                        .map(|id| {
                            let Edge(u, v) = g.edge_endpoints(id);
                            (u, v, g.edge_weight(id))
                        })
                        .collect();
                    let expect = max_weight_brute_force(n, &edges);

                    for algo in ALL {
                        let m = solve(&g, algo);
                        assert_eq!(
                            m.total_weight(&g),
                            expect,
                            "{algo:?} on n={n}, edges={edges:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let g = RandomGraph::new()
            .nodes(18)
            .edge_prob(0.35)
            .weight_range(0.0..=6.0)
            .integer_weights(&mut Pcg64Mcg::seed_from_u64(17));

        for algo in ALL {
            let first = solve(&g, algo);
            for _ in 0..3 {
                assert_eq!(solve(&g, algo).pairs(), first.pairs());
            }
        }
    }

    #[test]
    #[should_panic]
    fn negative_weights_are_rejected() {
        let g = WeightedAdjArray::from_weighted_edges(2, [(0, 1, -1.0)]);
        let mut algo = super::EdmondsMatching::new(&g);
        algo.run();
    }

    #[test]
    #[should_panic]
    fn matching_before_run_panics() {
        let g = WeightedAdjArray::from_weighted_edges(2, [(0, 1, 1.0)]);
        let algo = super::EdmondsMatching::new(&g);
        let _ = algo.matching();
    }
}
