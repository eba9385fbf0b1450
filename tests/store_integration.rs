//! End-to-end scenarios for the hierarchical store.
//!
//! These tests exercise the store through its public surface only: build
//! from the raw interchange shape, then read and mutate the way the
//! consuming layer does.

use std::collections::HashSet;

use arbor::item::{ItemPatch, TreeItem};
use arbor::store::TreeStore;
use arbor::types::{ItemId, ParentLink};

fn id(n: i64) -> ItemId {
    ItemId::Num(n)
}

fn id_set(items: &[&TreeItem]) -> HashSet<ItemId> {
    items.iter().map(|item| item.id.clone()).collect()
}

/// The canonical three-record fixture: "1" arrives as a string id.
fn sample() -> TreeStore {
    TreeStore::from_json(
        r#"[
            {"id": "1", "parent": null, "label": "A"},
            {"id": 2, "parent": 1, "label": "B"},
            {"id": 3, "parent": 2, "label": "C"}
        ]"#,
    )
    .unwrap()
}

#[test]
fn builds_tree_from_loose_json_records() {
    let store = sample();
    assert_eq!(store.len(), 3);
    // String "1" and native 1 meet at the same normalized key
    assert_eq!(store.item(&id(1)).unwrap().label, "A");
    assert_eq!(id_set(&store.roots()), HashSet::from([id(1)]));
}

#[test]
fn subtree_lookup_returns_all_levels() {
    let store = sample();
    assert_eq!(
        id_set(&store.descendants(&id(1))),
        HashSet::from([id(2), id(3)])
    );
}

#[test]
fn ancestor_chain_runs_bottom_to_top() {
    let store = sample();
    let chain: Vec<ItemId> = store
        .ancestors(&id(3))
        .iter()
        .map(|item| item.id.clone())
        .collect();
    assert_eq!(chain, [id(3), id(2), id(1)]);
}

#[test]
fn removing_a_branch_takes_its_subtree() {
    let mut store = sample();
    assert!(store.remove(&id(2)));
    assert!(store.item(&id(3)).is_none());
    assert!(store.children(&id(1)).is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn reparenting_moves_one_record_between_buckets() {
    let mut store = sample();
    assert!(store.update(ItemPatch::new(3).parent(1)));
    assert!(store.children(&id(2)).is_empty());
    assert_eq!(
        id_set(&store.children(&id(1))),
        HashSet::from([id(2), id(3)])
    );
}

#[test]
fn round_trip_every_inserted_record() {
    let mut store = sample();
    let extra = TreeItem::new(4, 3, "D");
    assert!(store.add(extra.clone()));
    assert_eq!(store.item(&id(4)), Some(&extra));

    // The latest update wins until removal
    assert!(store.update(ItemPatch::new(4).label("D2")));
    assert_eq!(store.item(&id(4)).unwrap().label, "D2");
    assert!(store.remove(&id(4)));
    assert_eq!(store.item(&id(4)), None);
}

#[test]
fn parent_children_duality_holds_for_every_record() {
    let store = sample();
    for item in store.items() {
        let siblings = match &item.parent {
            ParentLink::Root => store.roots(),
            ParentLink::Node(pid) => store.children(pid),
        };
        assert!(
            id_set(&siblings).contains(&item.id),
            "{} missing from its parent's children",
            item.id
        );
    }
}

#[test]
fn descendants_match_the_children_fixed_point() {
    let mut store = sample();
    // Widen the tree a little first
    assert!(store.add(TreeItem::new(4, 1, "D")));
    assert!(store.add(TreeItem::new(5, 4, "E")));

    let direct = id_set(&store.descendants(&id(1)));

    // Fixed point of repeatedly unioning children() from the root
    let mut closure: HashSet<ItemId> = HashSet::new();
    let mut frontier = vec![id(1)];
    while let Some(next) = frontier.pop() {
        for child in store.children(&next) {
            if closure.insert(child.id.clone()) {
                frontier.push(child.id.clone());
            }
        }
    }

    assert_eq!(direct, closure);
    // No duplicates either
    assert_eq!(store.descendants(&id(1)).len(), direct.len());
}

#[test]
fn failed_mutations_leave_the_store_untouched() {
    let mut store = sample();
    let before: Vec<TreeItem> = store.items().into_iter().cloned().collect();

    assert!(!store.add(TreeItem::root(2, "duplicate")));
    assert!(!store.remove(&id(42)));
    assert!(!store.update(ItemPatch::new(42).label("ghost")));
    assert!(!store.update(ItemPatch::new(1).parent(3))); // would cycle

    let after: Vec<TreeItem> = store.items().into_iter().cloned().collect();
    assert_eq!(before, after);
    for item in &before {
        let siblings = match &item.parent {
            ParentLink::Root => store.roots(),
            ParentLink::Node(pid) => store.children(pid),
        };
        assert!(id_set(&siblings).contains(&item.id));
    }
}

#[test]
fn self_parent_patch_is_rejected() {
    let mut store = sample();
    assert!(!store.update(ItemPatch::new(2).parent(2)));
    assert_eq!(store.item(&id(2)).unwrap().parent, ParentLink::from(1));
}

#[test]
fn text_fallback_ids_participate_fully() {
    let mut store = TreeStore::from_json(
        r#"[
            {"id": "drafts", "parent": null, "label": "Drafts"},
            {"id": 1, "parent": "drafts", "label": "First"}
        ]"#,
    )
    .unwrap();
    let drafts = ItemId::Text("drafts".into());

    assert_eq!(id_set(&store.children(&drafts)), HashSet::from([id(1)]));
    assert!(store.update(ItemPatch::new(id(1)).label("First draft")));
    assert!(store.remove(&drafts));
    assert!(store.is_empty());
}

#[test]
fn malformed_batch_is_an_input_error() {
    assert!(TreeStore::from_json("[{\"label\": \"no id\"}]").is_err());
    assert!(TreeStore::from_json("{}").is_err());
}

#[test]
fn deep_tree_survives_remove_and_traversal() {
    let mut items = vec![TreeItem::root(0, "root")];
    for n in 1..10_000_i64 {
        items.push(TreeItem::new(n, n - 1, format!("n{n}")));
    }
    let mut store = TreeStore::new(items);

    assert_eq!(store.descendants(&id(0)).len(), 9_999);
    assert_eq!(store.ancestors(&id(9_999)).len(), 10_000);

    // Cutting the chain halfway removes exactly the lower half
    assert!(store.remove(&id(5_000)));
    assert_eq!(store.len(), 5_000);
    assert!(store.item(&id(4_999)).is_some());
    assert!(store.item(&id(5_001)).is_none());
    assert!(store.children(&id(4_999)).is_empty());
}
