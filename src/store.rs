//! store
//!
//! The hierarchical store: three coupled indexes over one record table.
//!
//! # Architecture
//!
//! [`TreeStore`] owns a single authoritative record table plus two derived
//! indexes:
//!
//! - Item Table: id → record (insertion-ordered)
//! - Parent Index: id → parent link
//! - Children Index: parent link → set of child ids
//!
//! Every public operation reads or mutates the three together, never
//! independently. The only code paths that touch the derived indexes are
//! the internal `link`/`unlink` pair, shared by construction, add,
//! remove, and reparent, so the indexes cannot drift apart.
//!
//! # Invariants
//!
//! After every public operation:
//!
//! - Every indexed id has exactly one Parent Index entry, equal to the
//!   record's `parent` field
//! - Every id with parent link `P` is a member of Children Index\[`P`\]
//! - Every indexed id has a (possibly empty) children bucket, so child
//!   enumeration of a known id never needs a present-check
//! - Walking parent links from any id reaches the root marker within a
//!   number of steps bounded by the item count
//! - Removal erases an id from all three indexes before it can reappear
//!
//! # Error model
//!
//! Reads never fail: a missing id yields `None` or an empty `Vec`.
//! Mutations whose precondition does not hold (duplicate id on add,
//! unknown id on remove/update, cycle-introducing reparent) return
//! `false` and leave every index untouched.
//!
//! # Example
//!
//! ```
//! use arbor::store::TreeStore;
//! use arbor::item::ItemPatch;
//! use arbor::types::ItemId;
//!
//! let store = TreeStore::from_json(
//!     r#"[
//!         {"id": "1", "parent": null, "label": "A"},
//!         {"id": 2, "parent": 1, "label": "B"},
//!         {"id": 3, "parent": 2, "label": "C"}
//!     ]"#,
//! )
//! .unwrap();
//!
//! let ids: Vec<_> = store.descendants(&ItemId::Num(1))
//!     .iter()
//!     .map(|item| item.id.clone())
//!     .collect();
//! assert!(ids.contains(&ItemId::Num(2)));
//! assert!(ids.contains(&ItemId::Num(3)));
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;

use crate::item::{InputError, ItemPatch, RawItem, TreeItem};
use crate::types::{ItemId, ParentLink};

/// The store contract: construction aside, the eight operations every
/// hierarchical-store consumer relies on.
///
/// [`TreeStore`] is the canonical implementation; consumers that want to
/// substitute a fake in tests can depend on this trait instead.
pub trait Storable {
    /// Every record, in insertion/assignment order.
    fn items(&self) -> Vec<&TreeItem>;

    /// Point lookup; `None` for an unknown id.
    fn item(&self, id: &ItemId) -> Option<&TreeItem>;

    /// Direct children; empty for an unknown or childless id.
    fn children(&self, id: &ItemId) -> Vec<&TreeItem>;

    /// Every descendant of `id`, excluding `id` itself.
    fn descendants(&self, id: &ItemId) -> Vec<&TreeItem>;

    /// `id` itself followed by each successive parent.
    fn ancestors(&self, id: &ItemId) -> Vec<&TreeItem>;

    /// Insert a new record; `false` if the id already exists.
    fn add(&mut self, item: TreeItem) -> bool;

    /// Remove a record and its whole subtree; `false` if unknown.
    fn remove(&mut self, id: &ItemId) -> bool;

    /// Apply a partial update; `false` if unknown or cycle-introducing.
    fn update(&mut self, patch: ItemPatch) -> bool;
}

/// In-memory hierarchical store.
///
/// Built once from a batch of raw records, then mutated one record at a
/// time. Single-threaded and synchronous: no operation blocks, retries,
/// or times out, and callers sharing a store across threads must
/// serialize access externally.
///
/// Lookups hand out references borrowed from the store, so the borrow
/// checker enforces re-fetching after any mutation.
#[derive(Debug, Default, Clone)]
pub struct TreeStore {
    /// Item Table: the authoritative record contents.
    items: IndexMap<ItemId, TreeItem>,
    /// Parent Index: derived, kept in sync with the Item Table.
    parents: HashMap<ItemId, ParentLink>,
    /// Children Index: the inverse of the Parent Index.
    children: HashMap<ParentLink, HashSet<ItemId>>,
}

impl TreeStore {
    /// Build a store from an initial batch of records.
    ///
    /// Raw identifier fields are normalized per
    /// [`crate::item::IDENTIFIER_FIELDS`]; records with duplicate ids
    /// silently overwrite earlier ones (last write wins — the source data
    /// is assumed pre-validated upstream).
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<TreeItem>,
    {
        let mut store = Self::default();
        for item in items {
            store.load(item.into());
        }
        store
    }

    /// Build a store from a JSON array of raw records.
    ///
    /// This is the shape the source system feeds its grid:
    /// `[{"id": "1", "parent": null, "label": "A"}, …]`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Malformed`] if the JSON is not an array of
    /// records. Loose identifiers are never an error; see
    /// [`crate::types::ItemId`].
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        Ok(Self::new(RawItem::parse_batch(json)?))
    }

    /// Number of records currently indexed.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `id` is currently indexed.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Every record, in insertion/assignment order of the Item Table.
    ///
    /// The order is stable for a given sequence of mutations; no other
    /// ordering is guaranteed.
    pub fn items(&self) -> Vec<&TreeItem> {
        self.items.values().collect()
    }

    /// Look up a record by id.
    ///
    /// Never errors: an unknown id yields `None`.
    pub fn item(&self, id: &ItemId) -> Option<&TreeItem> {
        self.items.get(id)
    }

    /// Direct children of `id`.
    ///
    /// Empty if `id` is unknown or childless. Order is set-derived and
    /// unspecified; compare results as sets.
    pub fn children(&self, id: &ItemId) -> Vec<&TreeItem> {
        self.children_of(&ParentLink::Node(id.clone()))
    }

    /// Top-level records (children of the root marker).
    pub fn roots(&self) -> Vec<&TreeItem> {
        self.children_of(&ParentLink::Root)
    }

    fn children_of(&self, link: &ParentLink) -> Vec<&TreeItem> {
        match self.children.get(link) {
            Some(ids) => ids.iter().filter_map(|id| self.items.get(id)).collect(),
            None => Vec::new(),
        }
    }

    /// Every descendant of `id` (the full subtree, excluding `id` itself).
    ///
    /// Breadth-first over an explicit worklist, so depth is bounded only
    /// by memory, not the call stack. Each reachable descendant appears
    /// exactly once; the visited set keeps the traversal finite even if
    /// the index were ever corrupted into a cycle.
    pub fn descendants(&self, id: &ItemId) -> Vec<&TreeItem> {
        let mut result = Vec::new();
        let mut seen: HashSet<&ItemId> = HashSet::new();
        let mut queue: VecDeque<&ItemId> = VecDeque::new();

        if let Some(direct) = self.children.get(&ParentLink::Node(id.clone())) {
            queue.extend(direct.iter());
        }

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(item) = self.items.get(current) {
                result.push(item);
            }
            if let Some(kids) = self.children.get(&ParentLink::Node(current.clone())) {
                queue.extend(kids.iter());
            }
        }

        result
    }

    /// The chain from `id` up to the topmost reachable record.
    ///
    /// Returns `id` itself followed by each successive parent, stopping
    /// at the root marker or at a dangling parent reference (a parent id
    /// with no Item Table entry must not loop or crash). Empty if `id`
    /// itself is unknown. The walk is additionally bounded by the item
    /// count as a safety net.
    pub fn ancestors(&self, id: &ItemId) -> Vec<&TreeItem> {
        let mut result = Vec::new();
        let Some(mut current) = self.items.get(id) else {
            return result;
        };
        result.push(current);

        for _ in 0..self.items.len() {
            let ParentLink::Node(parent_id) = &current.parent else {
                break;
            };
            let Some(parent) = self.items.get(parent_id) else {
                break;
            };
            result.push(parent);
            current = parent;
        }

        result
    }

    /// Insert a new record.
    ///
    /// Not an upsert: returns `false` without side effects if the id is
    /// already indexed. On success the record enters all three indexes,
    /// including an empty children bucket for the new id, and is linked
    /// into its parent's bucket (created if the parent is not yet known).
    pub fn add(&mut self, item: TreeItem) -> bool {
        if self.items.contains_key(&item.id) {
            return false;
        }
        self.link(item);
        true
    }

    /// Remove a record and its entire subtree.
    ///
    /// Returns `false` without side effects if `id` is unknown. On
    /// success, every member of `{id} ∪ descendants(id)` leaves its
    /// parent's children bucket, the Item Table, its own children bucket,
    /// and the Parent Index — in one synchronous call, with no
    /// partial-failure state observable.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        if !self.items.contains_key(id) {
            return false;
        }

        let mut doomed: Vec<ItemId> = vec![id.clone()];
        doomed.extend(self.descendants(id).iter().map(|item| item.id.clone()));

        for did in &doomed {
            self.unlink(did);
            self.items.shift_remove(did);
            self.children.remove(&ParentLink::Node(did.clone()));
            self.parents.remove(did);
        }
        true
    }

    /// Apply a partial update to an existing record.
    ///
    /// Supplied fields replace the existing ones; absent fields are left
    /// unchanged (shallow merge). A supplied `parent` that differs from
    /// the current one relinks the record: it leaves the old parent's
    /// children bucket and enters the new one (created if the new parent
    /// is not yet known). The subtree below the record is not revisited —
    /// children follow their parent implicitly because lookups are
    /// index-driven.
    ///
    /// Returns `false` without side effects if `id` is unknown, or if the
    /// supplied parent is the record itself or any of its descendants
    /// (reparenting must not introduce a cycle).
    pub fn update(&mut self, patch: ItemPatch) -> bool {
        let Some(existing) = self.items.get(&patch.id) else {
            return false;
        };

        if let Some(new_parent) = &patch.parent {
            if *new_parent != existing.parent && self.would_cycle(&patch.id, new_parent) {
                return false;
            }
        }

        let id = patch.id;
        if let Some(new_parent) = patch.parent {
            let unchanged = self.parents.get(&id) == Some(&new_parent);
            if !unchanged {
                self.unlink(&id);
                self.children
                    .entry(new_parent.clone())
                    .or_default()
                    .insert(id.clone());
                self.parents.insert(id.clone(), new_parent.clone());
                if let Some(item) = self.items.get_mut(&id) {
                    item.parent = new_parent;
                }
            }
        }

        if let Some(label) = patch.label {
            if let Some(item) = self.items.get_mut(&id) {
                item.label = label;
            }
        }
        true
    }

    /// Load one record during bulk construction (last write wins).
    fn load(&mut self, item: TreeItem) {
        if self.items.contains_key(&item.id) {
            // Duplicate input id: detach the earlier record before the
            // overwrite so the old parent's bucket holds no stale child.
            self.unlink(&item.id);
        }
        self.link(item);
    }

    /// Enter a record into all three indexes.
    fn link(&mut self, item: TreeItem) {
        let id = item.id.clone();
        let parent = item.parent.clone();
        self.parents.insert(id.clone(), parent.clone());
        self.children.entry(parent).or_default().insert(id.clone());
        // The record's own bucket must exist even while empty, so child
        // enumeration of any known id never needs a present-check.
        self.children
            .entry(ParentLink::Node(id.clone()))
            .or_default();
        self.items.insert(id, item);
    }

    /// Detach a record from its parent's children bucket.
    fn unlink(&mut self, id: &ItemId) {
        if let Some(parent) = self.parents.get(id) {
            if let Some(bucket) = self.children.get_mut(parent) {
                bucket.remove(id);
            }
        }
    }

    /// Whether assigning `new_parent` to `id` would close a cycle.
    ///
    /// Walks parent links upward from the proposed parent; reaching `id`
    /// means the new parent sits inside `id`'s own subtree (or is `id`
    /// itself). The walk is bounded by the item count, so even a
    /// hypothetically corrupted index cannot hang it.
    fn would_cycle(&self, id: &ItemId, new_parent: &ParentLink) -> bool {
        let mut current = new_parent;
        for _ in 0..=self.items.len() {
            match current {
                ParentLink::Root => return false,
                ParentLink::Node(pid) => {
                    if pid == id {
                        return true;
                    }
                    match self.parents.get(pid) {
                        Some(next) => current = next,
                        // Dangling reference: no path back to `id`.
                        None => return false,
                    }
                }
            }
        }
        true
    }
}

impl Storable for TreeStore {
    fn items(&self) -> Vec<&TreeItem> {
        TreeStore::items(self)
    }

    fn item(&self, id: &ItemId) -> Option<&TreeItem> {
        TreeStore::item(self, id)
    }

    fn children(&self, id: &ItemId) -> Vec<&TreeItem> {
        TreeStore::children(self, id)
    }

    fn descendants(&self, id: &ItemId) -> Vec<&TreeItem> {
        TreeStore::descendants(self, id)
    }

    fn ancestors(&self, id: &ItemId) -> Vec<&TreeItem> {
        TreeStore::ancestors(self, id)
    }

    fn add(&mut self, item: TreeItem) -> bool {
        TreeStore::add(self, item)
    }

    fn remove(&mut self, id: &ItemId) -> bool {
        TreeStore::remove(self, id)
    }

    fn update(&mut self, patch: ItemPatch) -> bool {
        TreeStore::update(self, patch)
    }
}

impl<T: Into<TreeItem>> FromIterator<T> for TreeStore {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}
