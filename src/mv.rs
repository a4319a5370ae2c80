/*!
# Micali-Vazirani Maximum-Cardinality Matching

Phased `O(m * sqrt(n))` maximum-cardinality matching for general graphs.
Unlike the weighted blossom variants, this engine does not share the
stage/dual skeleton: each **phase** finds a maximal set of vertex-disjoint
augmenting paths of minimum length and flips them all, which bounds the
number of phases by `O(sqrt(n))`.

A phase runs in three steps:

1. **Level assignment** — alternating breadth-first search from all exposed
   vertices computes `even_level` / `odd_level` per vertex. Edges become
   *props* (tree edges) or *bridges* (equal-tenacity cross edges, indexed by
   tenacity).
2. **Bridge processing** — every bridge launches a **double depth-first
   search**: a green and a red search descend the contracted predecessor
   structure from the two endpoints, always advancing the deeper one, each
   painting the vertices it claims. When a search steps onto the other's
   head the vertex is contested: the red search retreats and looks for an
   alternative route, never backing past its **barrier**; if it has none,
   it keeps the vertex, the barrier moves there, and the green search
   reroutes instead. If both searches reach exposed vertices, their parent
   chains form an augmenting path, which is opened through the blooms and
   flipped. If neither side can reroute, the contested vertex is the
   bottleneck and becomes the base of a new **bloom** whose members are the
   painted vertices.
3. **Erasure** — vertices on used paths are erased; vertices whose
   remaining predecessors are all erased become useless and are erased too,
   cascading through successor lists.

Blooms are phase-local, flat structures; `base_star` resolves the topmost
bloom base through a union-find that is rebuilt every phase. Opening a bloom
at an inner vertex climbs to the peak on the vertex's color side, crosses
the bridge, and descends the other color to the base; the two color classes
keep the tracks vertex-disjoint.
*/

use fxhash::{FxHashMap, FxHashSet};

use crate::{edge::*, matching::Matching, node::*, ops::*};

const INF_LEVEL: u32 = u32::MAX;
const NO_COLOR: u32 = 0;
const NO_NODE: Node = Node::MAX;

/// A flat, phase-local contracted odd cycle.
struct Bloom {
    base: Node,
    green_color: u32,
    red_color: u32,
    /// Bridge endpoint whose search root is `green_root`.
    green_peak: Node,
    green_root: Node,
    red_peak: Node,
    red_root: Node,
}

#[derive(Clone)]
struct VertexData {
    even_level: u32,
    odd_level: u32,
    /// Predecessors through prop edges (one level down before contraction).
    predecessors: Vec<Node>,
    /// Cursor into `predecessors`, shared by all searches of a phase.
    pred_it: usize,
    /// Successors of prop edges, for erasure cascading.
    successors: Vec<Node>,
    /// Number of not-yet-erased predecessors.
    count: u32,
    /// Search side that claimed the vertex during bridge processing.
    color: u32,
    /// Search-tree parent (a contracted representative) and the real
    /// predecessor through which the vertex was entered.
    parent: Node,
    parent_via: Node,
    /// Innermost enclosing bloom, if any.
    bloom: Option<usize>,
    erased: bool,
}

impl VertexData {
    fn reset(&mut self) {
        self.even_level = INF_LEVEL;
        self.odd_level = INF_LEVEL;
        self.predecessors.clear();
        self.pred_it = 0;
        self.successors.clear();
        self.count = 0;
        self.color = NO_COLOR;
        self.parent = NO_NODE;
        self.parent_via = NO_NODE;
        self.bloom = None;
        self.erased = false;
    }

    fn min_level(&self) -> u32 {
        self.even_level.min(self.odd_level)
    }

    /// Outer: the shortest alternating walk from an exposed vertex is even.
    fn outer(&self) -> bool {
        self.even_level < self.odd_level
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum EdgeKind {
    /// Not yet classified; may still become a bridge at a later level.
    None,
    Prop,
    Bridge,
}

/// Union-find over vertices resolving the topmost bloom base.
struct BloomBases {
    parent: Vec<u32>,
    /// Base vertex associated with each set root.
    base: Vec<Node>,
}

impl BloomBases {
    fn new(n: NumNodes) -> Self {
        Self {
            parent: (0..n).collect(),
            base: (0..n).collect(),
        }
    }

    fn reset(&mut self) {
        for (i, p) in self.parent.iter_mut().enumerate() {
            *p = i as u32;
        }
        for (i, b) in self.base.iter_mut().enumerate() {
            *b = i as Node;
        }
    }

    fn find(&mut self, v: u32) -> u32 {
        if self.parent[v as usize] != v {
            let root = self.find(self.parent[v as usize]);
            self.parent[v as usize] = root;
        }
        self.parent[v as usize]
    }

    /// Current base of the topmost bloom enclosing `v` (or `v` itself).
    fn base_star(&mut self, v: Node) -> Node {
        let root = self.find(v);
        self.base[root as usize]
    }

    /// Absorbs `v`'s set into the set of the bloom base `b`.
    fn absorb(&mut self, v: Node, b: Node) {
        let rv = self.find(v);
        let rb = self.find(b);
        if rv != rb {
            let base = self.base[rb as usize];
            self.parent[rv as usize] = rb;
            self.base[rb as usize] = base;
        }
    }
}

/// One contracted descent step: the real predecessor taken and the
/// representative it lands on after contraction.
type Step = (Node, Node);

/// One move attempt of a search during the double DFS.
enum Advance {
    /// Claimed a fresh representative through the given real predecessor.
    Moved { to: Node, via: Node },
    /// The candidate is the other search's head.
    Meet { via: Node },
    /// No predecessor edges left at this vertex.
    Exhausted,
}

/// Outcome of the double DFS for one bridge.
enum DdfsOutcome {
    /// Both endpoints contract into the same bloom already.
    Nothing,
    /// The searches got stuck on a common vertex: base of a new bloom.
    Bottleneck { base: Node },
    /// Both searches reached distinct exposed vertices.
    Paths { green_head: Node, red_head: Node },
}

/// Maximum-cardinality matching with the Micali-Vazirani algorithm,
/// `O(m * sqrt(n))`.
///
/// # Examples
/// ```
/// use matchings::prelude::*;
///
/// // a 5-cycle with a pendant vertex: three pairs can be matched
/// let g = AdjArray::from_edges(6, [
///     (0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 5),
/// ]);
/// let mut algo = MicaliVaziraniMatching::new(&g);
/// algo.run();
/// assert_eq!(algo.matching().cardinality(), 3);
/// ```
pub struct MicaliVaziraniMatching<'a, G> {
    graph: &'a G,
    n: NumNodes,
    adj: Vec<Vec<HalfEdge>>,
    endpoints: Vec<Edge>,

    mate: Vec<Option<Node>>,
    match_edge: Vec<EdgeId>,

    vertices: Vec<VertexData>,
    edge_kind: Vec<EdgeKind>,
    candidates: Vec<Vec<Node>>,
    bridges: Vec<Vec<EdgeId>>,
    blooms: Vec<Bloom>,
    bloom_bases: BloomBases,
    /// Vertices painted by the current bridge's double DFS.
    bridge_support: Vec<Node>,
    color_counter: u32,
    finished: bool,
}

impl<'a, G: AdjacencyGraph> MicaliVaziraniMatching<'a, G> {
    /// Sets up the algorithm for the given graph.
    pub fn new(graph: &'a G) -> Self {
        let n = graph.number_of_nodes();
        // min levels stay below n, second levels below one tenacity more;
        // sized generously so level and bridge indices never clip
        let levels = 4 * n as usize + 8;
        Self {
            graph,
            n,
            adj: graph
                .vertices()
                .map(|u| graph.half_edges_of(u).collect())
                .collect(),
            endpoints: graph.edges_with_ids().map(|(e, _)| e).collect(),
            mate: vec![None; n as usize],
            match_edge: vec![0; n as usize],
            vertices: vec![
                VertexData {
                    even_level: INF_LEVEL,
                    odd_level: INF_LEVEL,
                    predecessors: Vec::new(),
                    pred_it: 0,
                    successors: Vec::new(),
                    count: 0,
                    color: NO_COLOR,
                    parent: NO_NODE,
                    parent_via: NO_NODE,
                    bloom: None,
                    erased: false,
                };
                n as usize
            ],
            edge_kind: vec![EdgeKind::None; graph.number_of_edges() as usize],
            candidates: vec![Vec::new(); levels],
            bridges: vec![Vec::new(); levels],
            blooms: Vec::new(),
            bloom_bases: BloomBases::new(n),
            bridge_support: Vec::new(),
            color_counter: NO_COLOR,
            finished: false,
        }
    }

    /// Runs phases until no augmenting path remains.
    pub fn run(&mut self) {
        if self.finished {
            return;
        }
        while self.search() {}
        self.finished = true;
        debug_assert!(self.matching_unchecked().is_valid(self.graph));
    }

    /// Returns the computed matching.
    ///
    /// **Panics** if called before [`Self::run`].
    pub fn matching(&self) -> Matching {
        assert!(self.finished, "matching requested before run()");
        self.matching_unchecked()
    }

    /// Consumes the algorithm and returns the computed matching.
    ///
    /// **Panics** if called before [`Self::run`].
    pub fn take_matching(self) -> Matching {
        assert!(self.finished, "matching requested before run()");
        self.matching_unchecked()
    }

    fn matching_unchecked(&self) -> Matching {
        Matching::from_mates(self.mate.clone())
    }

    // ---------- Phase driver ----------

    /// One phase: level search, bridge processing, erasure. Returns `true`
    /// iff at least one augmentation happened.
    fn search(&mut self) -> bool {
        self.reset_phase();

        let mut exposed = 0;
        for v in 0..self.n {
            if self.mate[v as usize].is_none() {
                self.vertices[v as usize].even_level = 0;
                self.candidates[0].push(v);
                exposed += 1;
            }
        }
        if exposed < 2 {
            return false;
        }

        let mut augmented = false;
        for level in 0..self.candidates.len() {
            let scan = std::mem::take(&mut self.candidates[level]);
            for v in scan {
                if self.vertices[v as usize].erased {
                    continue;
                }
                if self.vertices[v as usize].even_level == level as u32 {
                    self.scan_outer(v, level as u32);
                } else if self.vertices[v as usize].odd_level == level as u32 {
                    self.scan_inner(v, level as u32);
                }
            }

            // every bridge of this tenacity is processed; the augmentations
            // found here are vertex-disjoint thanks to the erasures between
            // them, forming a maximal set of shortest augmenting paths
            let bridges = std::mem::take(&mut self.bridges[level]);
            for id in bridges {
                let tenacity = 2 * level as u32 + 1;
                if self.bloss_aug(id, tenacity) {
                    augmented = true;
                }
            }
            // longer paths are left for the next phase's fresh levels
            if augmented {
                break;
            }
        }
        augmented
    }

    fn reset_phase(&mut self) {
        self.vertices.iter_mut().for_each(VertexData::reset);
        self.edge_kind.iter_mut().for_each(|k| *k = EdgeKind::None);
        self.candidates.iter_mut().for_each(Vec::clear);
        self.bridges.iter_mut().for_each(Vec::clear);
        self.blooms.clear();
        self.bloom_bases.reset();
        self.bridge_support.clear();
        self.color_counter = NO_COLOR;
    }

    // ---------- Level assignment ----------

    /// Scans the unmatched edges of an outer vertex at its even level.
    fn scan_outer(&mut self, v: Node, level: u32) {
        for i in 0..self.adj[v as usize].len() {
            let HalfEdge { node: u, id } = self.adj[v as usize][i];
            if self.vertices[u as usize].erased
                || self.edge_kind[id as usize] != EdgeKind::None
                || self.mate[v as usize] == Some(u)
            {
                continue;
            }
            let u_even = self.vertices[u as usize].even_level;
            if u_even < INF_LEVEL {
                // both endpoints reachable on even walks: a bridge
                self.edge_kind[id as usize] = EdgeKind::Bridge;
                let tenacity = level + u_even + 1;
                self.bridges[(tenacity / 2) as usize].push(id);
            } else if self.vertices[u as usize].odd_level >= level + 1 {
                if self.vertices[u as usize].odd_level == INF_LEVEL {
                    self.vertices[u as usize].odd_level = level + 1;
                    self.candidates[(level + 1) as usize].push(u);
                }
                self.edge_kind[id as usize] = EdgeKind::Prop;
                self.vertices[u as usize].predecessors.push(v);
                self.vertices[u as usize].count += 1;
                self.vertices[v as usize].successors.push(u);
            }
            // otherwise the edge may still turn into a bridge once u gets
            // its even level through a bloom; leave it unclassified
        }
    }

    /// Scans the matched edge of an inner vertex at its odd level.
    fn scan_inner(&mut self, v: Node, level: u32) {
        let Some(u) = self.mate[v as usize] else {
            return;
        };
        let id = self.match_edge[v as usize];
        if self.vertices[u as usize].erased || self.edge_kind[id as usize] != EdgeKind::None {
            return;
        }
        if self.vertices[u as usize].odd_level < INF_LEVEL {
            self.edge_kind[id as usize] = EdgeKind::Bridge;
            let tenacity = level + self.vertices[u as usize].odd_level + 1;
            self.bridges[(tenacity / 2) as usize].push(id);
        } else {
            debug_assert_eq!(self.vertices[u as usize].even_level, INF_LEVEL);
            self.vertices[u as usize].even_level = level + 1;
            self.candidates[(level + 1) as usize].push(u);
            self.edge_kind[id as usize] = EdgeKind::Prop;
            self.vertices[u as usize].predecessors.push(v);
            self.vertices[u as usize].count += 1;
            self.vertices[v as usize].successors.push(u);
        }
    }

    // ---------- Bridge processing ----------

    /// Processes one bridge: either grows a bloom or augments. Returns
    /// `true` iff an augmentation happened.
    fn bloss_aug(&mut self, id: EdgeId, tenacity: u32) -> bool {
        let Edge(s, t) = self.endpoints[id as usize];
        if self.vertices[s as usize].erased || self.vertices[t as usize].erased {
            return false;
        }

        self.color_counter += 1;
        let green_color = self.color_counter;
        self.color_counter += 1;
        let red_color = self.color_counter;

        self.bridge_support.clear();
        let mut support = std::mem::take(&mut self.bridge_support);

        let outcome = self.double_dfs(s, t, green_color, red_color, &mut support);
        let augmented = match outcome {
            DdfsOutcome::Nothing => false,
            DdfsOutcome::Bottleneck { base } => {
                self.form_bloom(s, t, tenacity, base, (green_color, red_color), &support);
                false
            }
            DdfsOutcome::Paths {
                green_head,
                red_head,
            } => {
                let green_steps = self.chain_steps(green_head);
                let red_steps = self.chain_steps(red_head);
                let mut path = self.expand_side(s, &green_steps);
                path.reverse();
                path.extend(self.expand_side(t, &red_steps));
                self.augment_and_erase(&path);
                // release the painted support so later bridges of this
                // phase may route through the surviving vertices again
                for &v in &support {
                    let data = &mut self.vertices[v as usize];
                    data.color = NO_COLOR;
                    data.parent = NO_NODE;
                    data.parent_via = NO_NODE;
                    data.pred_it = 0;
                }
                true
            }
        };

        self.bridge_support = support;
        augmented
    }

    /// The double depth-first search of one bridge: a green search from
    /// `base*(s)` and a red search from `base*(t)` descend the contracted
    /// predecessor structure, the deeper head moving first. Contested
    /// vertices are resolved red-first: red retreats (never past the
    /// barrier) and reroutes; failing that it keeps the vertex, the barrier
    /// moves there, and green reroutes. The searches end on two distinct
    /// exposed vertices (augmenting path) or on a common bottleneck (bloom
    /// base).
    fn double_dfs(
        &mut self,
        s: Node,
        t: Node,
        green: u32,
        red: u32,
        support: &mut Vec<Node>,
    ) -> DdfsOutcome {
        let g0 = self.bloom_bases.base_star(s);
        let r0 = self.bloom_bases.base_star(t);
        if g0 == r0 || self.vertices[g0 as usize].erased || self.vertices[r0 as usize].erased {
            return DdfsOutcome::Nothing;
        }

        self.claim(g0, green, NO_NODE, NO_NODE, support);
        self.claim(r0, red, NO_NODE, NO_NODE, support);
        let mut cg = g0;
        let mut cr = r0;
        let mut barrier = r0;

        loop {
            if self.vertices[cg as usize].min_level() == 0
                && self.vertices[cr as usize].min_level() == 0
            {
                return DdfsOutcome::Paths {
                    green_head: cg,
                    red_head: cr,
                };
            }

            if self.vertices[cg as usize].min_level() >= self.vertices[cr as usize].min_level() {
                // green moves
                match self.ddfs_advance(cg, cr) {
                    Advance::Moved { to, via } => {
                        self.claim(to, green, cg, via, support);
                        cg = to;
                    }
                    Advance::Meet { via } => {
                        // green wants red's head
                        let v = cr;
                        if let Some(new_red) = self.ddfs_reroute(v, barrier, true, red, support) {
                            // red abandoned the vertex; green takes it over
                            let data = &mut self.vertices[v as usize];
                            data.color = green;
                            data.parent = cg;
                            data.parent_via = via;
                            cg = v;
                            cr = new_red;
                        } else {
                            barrier = v;
                            match self.ddfs_reroute(cg, g0, false, green, support) {
                                Some(new_green) => cg = new_green,
                                None => return DdfsOutcome::Bottleneck { base: v },
                            }
                        }
                    }
                    Advance::Exhausted => {
                        if cg == g0 {
                            // the searches meet at the other's head before a
                            // side can exhaust; resolve to the last secured
                            // junction if this state is ever reached
                            debug_assert!(false, "green search exhausted without meeting");
                            return DdfsOutcome::Bottleneck { base: barrier };
                        }
                        cg = self.vertices[cg as usize].parent;
                    }
                }
            } else {
                // red moves
                match self.ddfs_advance(cr, cg) {
                    Advance::Moved { to, via } => {
                        self.claim(to, red, cr, via, support);
                        cr = to;
                    }
                    Advance::Meet { via } => {
                        // red wants green's head; red reroutes first
                        let v = cg;
                        if let Some(new_red) = self.ddfs_reroute(cr, barrier, false, red, support)
                        {
                            cr = new_red;
                        } else {
                            // red takes the vertex; green must reroute
                            let green_parent = self.vertices[v as usize].parent;
                            let data = &mut self.vertices[v as usize];
                            data.color = red;
                            data.parent = cr;
                            data.parent_via = via;
                            barrier = v;
                            cr = v;
                            if v == g0 {
                                return DdfsOutcome::Bottleneck { base: v };
                            }
                            match self.ddfs_reroute(green_parent, g0, false, green, support) {
                                Some(new_green) => cg = new_green,
                                None => return DdfsOutcome::Bottleneck { base: v },
                            }
                        }
                    }
                    Advance::Exhausted => {
                        if cr == barrier {
                            debug_assert!(false, "red search exhausted without meeting");
                            return DdfsOutcome::Bottleneck { base: barrier };
                        }
                        cr = self.vertices[cr as usize].parent;
                    }
                }
            }
        }
    }

    /// Paints a representative for one search side.
    fn claim(&mut self, v: Node, color: u32, parent: Node, via: Node, support: &mut Vec<Node>) {
        let data = &mut self.vertices[v as usize];
        data.color = color;
        data.parent = parent;
        data.parent_via = via;
        support.push(v);
    }

    /// Tries to move the search centered at `from` one step down, consuming
    /// the shared predecessor cursor. Colored candidates are skipped unless
    /// they are the other search's head.
    fn ddfs_advance(&mut self, from: Node, other_head: Node) -> Advance {
        while self.vertices[from as usize].pred_it < self.vertices[from as usize].predecessors.len()
        {
            let p = self.vertices[from as usize].predecessors
                [self.vertices[from as usize].pred_it];
            self.vertices[from as usize].pred_it += 1;
            if self.vertices[p as usize].erased {
                continue;
            }
            let u = self.bloom_bases.base_star(p);
            if self.vertices[u as usize].erased {
                continue;
            }
            if self.vertices[u as usize].color == NO_COLOR {
                return Advance::Moved { to: u, via: p };
            }
            if u == other_head {
                return Advance::Meet { via: p };
            }
        }
        Advance::Exhausted
    }

    /// Searches for an unclaimed alternative for one side: scans the
    /// remaining predecessors of `start` (unless the vertex is being
    /// abandoned), then retreats along the parent chain, never past
    /// `limit`. Claims and returns the new head on success.
    fn ddfs_reroute(
        &mut self,
        start: Node,
        limit: Node,
        abandon_start: bool,
        color: u32,
        support: &mut Vec<Node>,
    ) -> Option<Node> {
        let mut cur = start;
        if abandon_start {
            if cur == limit {
                return None;
            }
            cur = self.vertices[cur as usize].parent;
        }
        loop {
            if let Advance::Moved { to, via } = self.ddfs_advance(cur, NO_NODE) {
                self.claim(to, color, cur, via, support);
                return Some(to);
            }
            if cur == limit {
                return None;
            }
            cur = self.vertices[cur as usize].parent;
        }
    }

    /// Contracted descent steps from a search root down to `head`, read off
    /// the parent chain the double DFS left behind.
    fn chain_steps(&self, head: Node) -> Vec<Step> {
        let mut steps = Vec::new();
        let mut cur = head;
        while self.vertices[cur as usize].parent != NO_NODE {
            steps.push((self.vertices[cur as usize].parent_via, cur));
            cur = self.vertices[cur as usize].parent;
        }
        steps.reverse();
        steps
    }

    /// Creates a bloom from a bottleneck: the painted support keeps its
    /// colors and parent chains for path opening, gets the missing second
    /// levels, and merges into the base.
    fn form_bloom(
        &mut self,
        green_peak: Node,
        red_peak: Node,
        tenacity: u32,
        base: Node,
        (green_color, red_color): (u32, u32),
        support: &[Node],
    ) {
        let green_root = self.bloom_bases.base_star(green_peak);
        let red_root = self.bloom_bases.base_star(red_peak);

        // the base is the bottleneck itself, not a member
        self.vertices[base as usize].color = NO_COLOR;
        self.vertices[base as usize].parent = NO_NODE;

        let bloom_idx = self.blooms.len();
        self.blooms.push(Bloom {
            base,
            green_color,
            red_color,
            green_peak,
            green_root,
            red_peak,
            red_root,
        });

        for &v in support {
            if v == base {
                continue;
            }
            let data = &mut self.vertices[v as usize];
            debug_assert!(data.bloom.is_none());
            data.bloom = Some(bloom_idx);
            // the second level becomes known: tenacity minus the first
            if data.outer() {
                if data.odd_level == INF_LEVEL {
                    data.odd_level = tenacity - data.even_level;
                    self.candidates[data.odd_level as usize].push(v);
                }
            } else if data.even_level == INF_LEVEL {
                data.even_level = tenacity - data.odd_level;
                self.candidates[data.even_level as usize].push(v);
            }
            self.bloom_bases.absorb(v, base);
        }
    }

    // ---------- Path opening ----------

    /// Expands one side of an augmenting path: the real descent from the
    /// bridge endpoint through its blooms to its search root, then the
    /// contracted steps down to the exposed vertex.
    fn expand_side(&mut self, peak: Node, steps: &[Step]) -> Vec<Node> {
        let root = self.bloom_bases.base_star(peak);
        let mut path = self.descend_to(peak, root);
        for &(via, landing) in steps {
            let segment = self.descend_to(via, landing);
            path.extend(segment);
        }
        path
    }

    /// Real alternating path from `v` down through its bloom chain until
    /// reaching `target` (a base on the chain).
    fn descend_to(&mut self, v: Node, target: Node) -> Vec<Node> {
        let mut path = vec![v];
        let mut cur = v;
        while cur != target {
            let bloom = self.vertices[cur as usize]
                .bloom
                .expect("descent stuck outside a bloom");
            let segment = self.open(cur, bloom);
            path.extend_from_slice(&segment[1..]);
            cur = self.blooms[bloom].base;
        }
        path
    }

    /// Opens a bloom at `x`: an alternating path from `x` to the bloom
    /// base. Outer vertices descend directly; inner vertices climb to the
    /// peak on their color side, cross the bridge, and descend the other
    /// color to the base — the color classes keep the two tracks disjoint.
    fn open(&mut self, x: Node, bloom: usize) -> Vec<Node> {
        if self.vertices[x as usize].outer() {
            self.open_outer(x, bloom)
        } else {
            self.open_inner(x, bloom)
        }
    }

    /// Greedy descent from an outer member to the bloom base: every
    /// predecessor descent inside the support reaches the base.
    fn open_outer(&mut self, x: Node, bloom: usize) -> Vec<Node> {
        let base = self.blooms[bloom].base;
        let mut path = vec![x];
        let mut cur = x;
        while cur != base {
            let mut advanced = false;
            for i in 0..self.vertices[cur as usize].predecessors.len() {
                let p = self.vertices[cur as usize].predecessors[i];
                if self.vertices[p as usize].erased {
                    continue;
                }
                let w = self.member_rep(p, bloom, base);
                let segment = self.descend_to(p, w);
                path.extend(segment);
                cur = w;
                advanced = true;
                break;
            }
            assert!(advanced, "unerased vertex without unerased predecessor");
        }
        path
    }

    /// Opens an inner member: climbs to the peak on `x`'s color side and
    /// descends from the other peak to the base through the other color.
    fn open_inner(&mut self, x: Node, bloom: usize) -> Vec<Node> {
        let b = &self.blooms[bloom];
        let base = b.base;
        let (peak_same, color_same, peak_other, color_other) =
            if self.vertices[x as usize].color == b.green_color {
                (b.green_peak, b.green_color, b.red_peak, b.red_color)
            } else {
                (b.red_peak, b.red_color, b.green_peak, b.green_color)
            };
        debug_assert_eq!(self.member_rep(peak_same, bloom, base), {
            let b = &self.blooms[bloom];
            if color_same == b.green_color {
                b.green_root
            } else {
                b.red_root
            }
        });

        let mut up = self.find_path(peak_same, x, bloom, color_same);
        up.reverse();
        up.extend(self.find_path(peak_other, base, bloom, color_other));
        up
    }

    /// Alternating descent from `high` to `low` through predecessor edges,
    /// restricted to members of `bloom` painted `color`; strictly deeper
    /// blooms are crossed through their bases and expanded recursively.
    fn find_path(&mut self, high: Node, low: Node, bloom: usize, color: u32) -> Vec<Node> {
        if high == low {
            return vec![high];
        }

        // contracted depth-first search over the bloom's members
        let start = self.member_rep(high, bloom, low);
        let mut parents: FxHashMap<Node, (Node, Node)> = FxHashMap::default();
        let mut stack: Vec<(Node, usize)> = vec![(start, 0)];
        let mut visited: FxHashSet<Node> = FxHashSet::default();
        visited.insert(start);
        let mut found = start == low;

        while !found {
            let Some(&mut (v, ref mut idx)) = stack.last_mut() else {
                panic!("no opening path inside bloom");
            };
            if *idx >= self.vertices[v as usize].predecessors.len() {
                stack.pop();
                continue;
            }
            let p = self.vertices[v as usize].predecessors[*idx];
            *idx += 1;
            if self.vertices[p as usize].erased {
                continue;
            }
            let w = self.member_rep(p, bloom, low);
            if visited.contains(&w) {
                continue;
            }
            let acceptable = w == low
                || (self.vertices[w as usize].bloom == Some(bloom)
                    && self.vertices[w as usize].color == color
                    && !self.vertices[w as usize].erased);
            if !acceptable {
                continue;
            }
            visited.insert(w);
            parents.insert(w, (v, p));
            if w == low {
                found = true;
            } else {
                stack.push((w, 0));
            }
        }

        // reconstruct the contracted chain, then expand each step
        let mut chain: Vec<Step> = Vec::new();
        let mut cur = low;
        while cur != start {
            let (from, via) = parents[&cur];
            chain.push((via, cur));
            cur = from;
        }
        chain.reverse();

        let mut path = self.descend_to(high, start);
        for (via, landing) in chain {
            let segment = self.descend_to(via, landing);
            path.extend(segment);
        }
        path
    }

    /// Representative of `v` at the nesting depth of `bloom`: follows bases
    /// of strictly deeper blooms until landing on a member of `bloom` (or
    /// on `low`).
    fn member_rep(&mut self, v: Node, bloom: usize, low: Node) -> Node {
        let mut cur = v;
        loop {
            if cur == low || self.vertices[cur as usize].bloom == Some(bloom) {
                return cur;
            }
            match self.vertices[cur as usize].bloom {
                Some(deeper) => cur = self.blooms[deeper].base,
                None => return cur,
            }
        }
    }

    // ---------- Augmentation and erasure ----------

    /// Flips the matching along a real alternating path between two exposed
    /// vertices, then erases the used vertices and everything that becomes
    /// useless.
    fn augment_and_erase(&mut self, path: &[Node]) {
        debug_assert!(path.len() % 2 == 0);
        debug_assert!(self.mate[path[0] as usize].is_none());
        debug_assert!(self.mate[path[path.len() - 1] as usize].is_none());

        for pair in path.chunks(2) {
            let (a, b) = (pair[0], pair[1]);
            self.mate[a as usize] = Some(b);
            self.mate[b as usize] = Some(a);
            let id = self.edge_between(a, b);
            self.match_edge[a as usize] = id;
            self.match_edge[b as usize] = id;
        }

        self.erase(path.to_vec());
    }

    fn edge_between(&self, a: Node, b: Node) -> EdgeId {
        self.adj[a as usize]
            .iter()
            .find(|h| h.node == b)
            .map(|h| h.id)
            .expect("path vertices must be adjacent")
    }

    /// Erases the given vertices; successors losing their last predecessor
    /// cascade.
    fn erase(&mut self, mut queue: Vec<Node>) {
        for &v in &queue {
            self.vertices[v as usize].erased = true;
        }
        while let Some(v) = queue.pop() {
            for i in 0..self.vertices[v as usize].successors.len() {
                let u = self.vertices[v as usize].successors[i];
                if self.vertices[u as usize].erased {
                    continue;
                }
                self.vertices[u as usize].count -= 1;
                if self.vertices[u as usize].count == 0 {
                    self.vertices[u as usize].erased = true;
                    queue.push(u);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::AdjArray;
    use crate::testing::max_cardinality_brute_force;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    fn solve(g: &AdjArray) -> Matching {
        let mut algo = MicaliVaziraniMatching::new(g);
        algo.run();
        algo.take_matching()
    }

    #[test]
    fn triangle_matches_one_pair() {
        let g = AdjArray::from_edges(3, [(0, 1), (1, 2), (0, 2)]);
        let m = solve(&g);
        assert!(m.is_valid(&g));
        assert_eq!(m.cardinality(), 1);
    }

    #[test]
    fn complete_four_clique_is_perfect() {
        let g = AdjArray::from_edges(4, [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        let m = solve(&g);
        assert!(m.is_valid(&g));
        assert_eq!(m.cardinality(), 2);
    }

    #[test]
    fn path_of_five_vertices() {
        let g = AdjArray::from_edges(5, [(0, 1), (1, 2), (2, 3), (3, 4)]);
        let m = solve(&g);
        assert!(m.is_valid(&g));
        assert_eq!(m.cardinality(), 2);
    }

    #[test]
    fn petersen_graph_has_perfect_matching() {
        let outer = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)];
        let spokes = [(0, 5), (1, 6), (2, 7), (3, 8), (4, 9)];
        let inner = [(5, 7), (7, 9), (9, 6), (6, 8), (8, 5)];
        let g = AdjArray::from_edges(10, outer.into_iter().chain(spokes).chain(inner));
        let m = solve(&g);
        assert!(m.is_valid(&g));
        assert_eq!(m.cardinality(), 5);
    }

    #[test]
    fn blossom_with_pendant_vertex() {
        // 5-cycle forcing a bloom plus a pendant attached to its entry
        let g = AdjArray::from_edges(6, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 5)]);
        let m = solve(&g);
        assert!(m.is_valid(&g));
        assert_eq!(m.cardinality(), 3);
    }

    #[test]
    fn theta_graph_is_matched_perfectly() {
        // a path with a second route between its middle vertices
        let edges = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (2, 6),
            (6, 7),
            (7, 3),
        ];
        let g = AdjArray::from_edges(8, edges);
        let m = solve(&g);
        assert!(m.is_valid(&g));
        assert_eq!(m.cardinality(), max_cardinality_brute_force(8, &edges));
    }

    #[test]
    fn overlapping_blossoms_need_contested_searches() {
        // two odd cycles sharing a stem: bridge searches from both sides
        // compete for the shared descent and must split the routes
        let edges = [
            (0, 1),
            (1, 2),
            (2, 0),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 6),
            (6, 4),
            (1, 5),
        ];
        let g = AdjArray::from_edges(7, edges);
        let m = solve(&g);
        assert!(m.is_valid(&g));
        assert_eq!(m.cardinality(), max_cardinality_brute_force(7, &edges));
    }

    #[test]
    fn isolated_vertices_stay_unmatched() {
        let g = AdjArray::from_edges(5, [(1, 2)]);
        let m = solve(&g);
        assert!(m.is_valid(&g));
        assert_eq!(m.cardinality(), 1);
        assert!(!m.is_matched(0));
        assert!(!m.is_matched(3));
    }

    #[test]
    fn matches_brute_force_on_random_graphs() {
        let rng = &mut Pcg64Mcg::seed_from_u64(0x5eed);

        for n in [4 as NumNodes, 6, 8, 10, 12] {
            for density in [0.15, 0.3, 0.5] {
                for _ in 0..20 {
                    let mut edges = Vec::new();
                    for u in 0..n {
                        for v in (u + 1)..n {
                            if rng.random_bool(density) {
                                edges.push((u, v));
                            }
                        }
                    }
                    let g = AdjArray::from_edges(n, edges.clone());
                    let m = solve(&g);
                    assert!(m.is_valid(&g));
                    assert_eq!(
                        m.cardinality(),
                        max_cardinality_brute_force(n, &edges),
                        "wrong cardinality on n={n}, edges={edges:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let rng = &mut Pcg64Mcg::seed_from_u64(99);
        let mut edges = Vec::new();
        for u in 0..20 as NumNodes {
            for v in (u + 1)..20 {
                if rng.random_bool(0.3) {
                    edges.push((u, v));
                }
            }
        }
        let g = AdjArray::from_edges(20, edges);
        let first = solve(&g);
        for _ in 0..3 {
            assert_eq!(solve(&g).pairs(), first.pairs());
        }
    }
}
