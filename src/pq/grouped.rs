//! Grouped min-priority queue with per-group offsets and freezing.

use std::{cmp::Reverse, collections::BinaryHeap};

use fxhash::FxHashMap;

use crate::edge::Weight;

use super::TotalWeight;

type InnerEntry = Reverse<(TotalWeight, u32, u32)>;

struct Group {
    heap: BinaryHeap<InnerEntry>,
    /// Keys ever inserted into this group, in insertion order. May contain
    /// keys that have since been removed or moved; drains filter them out.
    members: Vec<u32>,
    base: Weight,
    anchor: Weight,
    shifting: bool,
    version: u32,
    len: usize,
}

impl Group {
    fn offset(&self, global_shift: Weight) -> Weight {
        self.base
            + if self.shifting {
                global_shift - self.anchor
            } else {
                0.0
            }
    }
}

/// A min-priority queue whose keys are partitioned into **groups**.
///
/// Each group carries an additive offset. Groups are either *shifting* or
/// *frozen*: [`GroupedQueue::shift_shifting`] adds a constant to the priority
/// of every key in every shifting group in `O(1)`, while frozen groups keep
/// their priorities. The minimum over all shifting groups is reported in
/// `O(log)` amortized.
///
/// The matching algorithms use one group per odd or free top-level blossom:
/// free groups shift with each dual adjustment, odd groups are frozen.
///
/// Keys are globally unique across groups. Ties break towards the smaller
/// key, then the smaller group id.
///
/// # Examples
/// ```
/// use matchings::pq::GroupedQueue;
///
/// let mut q = GroupedQueue::new(16);
/// q.new_group(0, true);
/// q.new_group(1, false);
/// q.insert(0, 4, 3.0);
/// q.insert(1, 9, 1.0);
///
/// // group 1 is frozen, so the shifting minimum comes from group 0
/// assert_eq!(q.find_min_shifting(), Some((0, 4, 3.0)));
/// q.shift_shifting(-2.0);
/// assert_eq!(q.find_min_shifting(), Some((0, 4, 1.0)));
/// assert_eq!(q.priority(9), Some(1.0));
/// ```
pub struct GroupedQueue {
    groups: FxHashMap<u32, Group>,
    stored: Vec<Option<Weight>>,
    key_group: Vec<u32>,
    key_epoch: Vec<u32>,
    global_shift: Weight,
    /// Lazy outer heap over shifting groups; priorities stored relative to
    /// `global_shift` so entries stay valid across shifts.
    outer: BinaryHeap<Reverse<(TotalWeight, u32, u32)>>,
}

impl GroupedQueue {
    /// Creates an empty queue for keys in `0..universe`.
    pub fn new(universe: usize) -> Self {
        Self {
            groups: FxHashMap::default(),
            stored: vec![None; universe],
            key_group: vec![0; universe],
            key_epoch: vec![0; universe],
            global_shift: 0.0,
            outer: BinaryHeap::new(),
        }
    }

    /// Creates an empty group.
    ///
    /// **Panics** if the group already exists.
    pub fn new_group(&mut self, group: u32, shifting: bool) {
        let prev = self.groups.insert(
            group,
            Group {
                heap: BinaryHeap::new(),
                members: Vec::new(),
                base: 0.0,
                anchor: self.global_shift,
                shifting,
                version: 0,
                len: 0,
            },
        );
        assert!(prev.is_none(), "group {group} already exists");
    }

    /// Returns `true` if the group exists.
    pub fn has_group(&self, group: u32) -> bool {
        self.groups.contains_key(&group)
    }

    /// Number of keys currently in the group.
    ///
    /// **Panics** if the group does not exist.
    pub fn group_len(&self, group: u32) -> usize {
        self.groups[&group].len
    }

    /// Returns `true` if `key` is in some group.
    pub fn contains(&self, key: u32) -> bool {
        self.stored[key as usize].is_some()
    }

    /// Inserts `key` into `group` with the given priority, replacing any
    /// previous entry of `key` (possibly in another group).
    ///
    /// **Panics** if the group does not exist.
    pub fn insert(&mut self, group: u32, key: u32, priority: Weight) {
        if self.contains(key) {
            self.remove(key);
        }

        let k = key as usize;
        let g = self.groups.get_mut(&group).expect("unknown group");
        let stored = priority - g.offset(self.global_shift);

        self.stored[k] = Some(stored);
        self.key_group[k] = group;
        self.key_epoch[k] = self.key_epoch[k].wrapping_add(1);

        g.heap
            .push(Reverse((TotalWeight(stored), key, self.key_epoch[k])));
        g.members.push(key);
        g.len += 1;
        g.version = g.version.wrapping_add(1);

        self.refresh_outer(group);
    }

    /// Removes `key` and returns its current priority, if present.
    pub fn remove(&mut self, key: u32) -> Option<Weight> {
        let stored = self.stored[key as usize].take()?;
        let group = self.key_group[key as usize];
        let g = self
            .groups
            .get_mut(&group)
            .expect("entry points at a deleted group");
        let priority = stored + g.offset(self.global_shift);
        g.len -= 1;
        g.version = g.version.wrapping_add(1);
        self.refresh_outer(group);
        Some(priority)
    }

    /// Returns the current priority of `key`, if present.
    pub fn priority(&self, key: u32) -> Option<Weight> {
        let stored = self.stored[key as usize]?;
        let g = &self.groups[&self.key_group[key as usize]];
        Some(stored + g.offset(self.global_shift))
    }

    /// Returns the group `key` currently belongs to, if present.
    pub fn group_of(&self, key: u32) -> Option<u32> {
        self.contains(key).then(|| self.key_group[key as usize])
    }

    /// Marks `group` as shifting or frozen. Current priorities are kept;
    /// only future [`GroupedQueue::shift_shifting`] calls are affected.
    ///
    /// **Panics** if the group does not exist.
    pub fn set_shifting(&mut self, group: u32, shifting: bool) {
        let shift = self.global_shift;
        let g = self.groups.get_mut(&group).expect("unknown group");
        if g.shifting == shifting {
            return;
        }
        g.base = g.offset(shift);
        g.anchor = shift;
        g.shifting = shifting;
        g.version = g.version.wrapping_add(1);
        self.refresh_outer(group);
    }

    /// Adds `delta` to the priority of every key in every shifting group.
    pub fn shift_shifting(&mut self, delta: Weight) {
        self.global_shift += delta;
    }

    /// Returns the minimum `(group, key, priority)` over all **shifting**
    /// groups.
    pub fn find_min_shifting(&mut self) -> Option<(u32, u32, Weight)> {
        while let Some(&Reverse((TotalWeight(rel), group, version))) = self.outer.peek() {
            let Some(g) = self.groups.get_mut(&group) else {
                self.outer.pop();
                continue;
            };
            if !g.shifting || g.version != version {
                self.outer.pop();
                continue;
            }
            match Self::clean_top(g, &self.stored, &self.key_epoch) {
                Some((stored, key)) if stored + g.base - g.anchor == rel => {
                    return Some((group, key, rel + self.global_shift));
                }
                _ => {
                    // the recorded minimum is gone; requeue the real one
                    self.outer.pop();
                    let version = g.version;
                    if let Some((stored, _)) = Self::clean_top(g, &self.stored, &self.key_epoch) {
                        let rel = stored + g.base - g.anchor;
                        self.outer.push(Reverse((TotalWeight(rel), group, version)));
                    }
                }
            }
        }
        None
    }

    /// Removes every key of `group` and deletes the group. Returns the
    /// removed `(key, priority)` entries in insertion order.
    ///
    /// **Panics** if the group does not exist.
    pub fn delete_group(&mut self, group: u32) -> Vec<(u32, Weight)> {
        let g = self.groups.remove(&group).expect("unknown group");
        let offset = g.offset(self.global_shift);

        let mut entries = Vec::with_capacity(g.len);
        for key in g.members {
            let k = key as usize;
            if self.key_group[k] == group {
                if let Some(stored) = self.stored[k].take() {
                    entries.push((key, stored + offset));
                }
            }
        }
        debug_assert_eq!(entries.len(), g.len);
        entries
    }

    /// Discards the group's stale inner-heap entries and returns its real
    /// minimum `(stored, key)`.
    fn clean_top(
        g: &mut Group,
        stored: &[Option<Weight>],
        key_epoch: &[u32],
    ) -> Option<(Weight, u32)> {
        while let Some(&Reverse((TotalWeight(s), key, epoch))) = g.heap.peek() {
            let k = key as usize;
            if stored[k] == Some(s) && key_epoch[k] == epoch {
                return Some((s, key));
            }
            g.heap.pop();
        }
        None
    }

    /// Records the group's current minimum in the outer heap.
    fn refresh_outer(&mut self, group: u32) {
        let Some(g) = self.groups.get_mut(&group) else {
            return;
        };
        if !g.shifting {
            return;
        }
        let version = g.version;
        if let Some((stored, _)) = Self::clean_top(g, &self.stored, &self.key_epoch) {
            let rel = stored + g.base - g.anchor;
            self.outer.push(Reverse((TotalWeight(rel), group, version)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_groups_keep_their_priorities() {
        let mut q = GroupedQueue::new(10);
        q.new_group(0, true);
        q.new_group(1, false);

        q.insert(0, 2, 5.0);
        q.insert(1, 3, 5.0);

        q.shift_shifting(-3.0);
        assert_eq!(q.priority(2), Some(2.0));
        assert_eq!(q.priority(3), Some(5.0));
        assert_eq!(q.find_min_shifting(), Some((0, 2, 2.0)));
    }

    #[test]
    fn toggling_freezes_at_current_value() {
        let mut q = GroupedQueue::new(10);
        q.new_group(7, true);
        q.insert(7, 0, 4.0);

        q.shift_shifting(-1.0);
        q.set_shifting(7, false);
        q.shift_shifting(-1.0);
        assert_eq!(q.priority(0), Some(3.0));
        assert_eq!(q.find_min_shifting(), None);

        q.set_shifting(7, true);
        q.shift_shifting(-1.0);
        assert_eq!(q.priority(0), Some(2.0));
        assert_eq!(q.find_min_shifting(), Some((7, 0, 2.0)));
    }

    #[test]
    fn min_tracks_removals_across_groups() {
        let mut q = GroupedQueue::new(16);
        q.new_group(0, true);
        q.new_group(1, true);

        q.insert(0, 4, 4.0);
        q.insert(0, 5, 2.0);
        q.insert(1, 6, 3.0);

        assert_eq!(q.find_min_shifting(), Some((0, 5, 2.0)));
        q.remove(5);
        assert_eq!(q.find_min_shifting(), Some((1, 6, 3.0)));
        q.remove(6);
        assert_eq!(q.find_min_shifting(), Some((0, 4, 4.0)));
    }

    #[test]
    fn delete_group_returns_entries_in_insertion_order() {
        let mut q = GroupedQueue::new(16);
        q.new_group(0, true);
        q.new_group(1, false);
        q.insert(0, 9, 1.0);
        q.insert(0, 3, 2.0);
        q.insert(0, 7, 3.0);
        q.remove(3);
        // moving a key to another group must not leave it in the old one
        q.insert(1, 7, 8.0);

        q.shift_shifting(0.5);
        let entries = q.delete_group(0);
        assert_eq!(entries, vec![(9, 1.5)]);
        assert!(!q.contains(9));
        assert_eq!(q.priority(7), Some(8.0));
    }
}
