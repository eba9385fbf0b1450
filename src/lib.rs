//! Arbor - An in-memory hierarchical store for flat parented records
//!
//! Arbor indexes a flat collection of labeled, parented records into a
//! navigable tree: point lookup, child enumeration, full
//! descendant/ancestor traversal, and structural mutation (insert,
//! remove-with-subtree, reparent), with three internal indexes kept
//! mutually consistent at all times.
//!
//! # Architecture
//!
//! The crate is a single store plus the types crossing its boundary:
//!
//! - [`types`] - Strong identifier types: `RawId`, `ItemId`, `ParentLink`
//! - [`item`] - Record types: `RawItem`, `TreeItem`, `ItemPatch`
//! - [`store`] - The `TreeStore` and its `Storable` contract
//!
//! # Correctness Invariants
//!
//! Arbor maintains the following invariants:
//!
//! 1. The Item Table, Parent Index, and Children Index agree after every
//!    public operation
//! 2. Child enumeration of any known id never fails; absence is an empty
//!    result, never an error
//! 3. Walking parent links from any id terminates within the item count
//! 4. A removed id is fully erased from all indexes before it can be
//!    reinserted
//!
//! # Example
//!
//! ```
//! use arbor::store::TreeStore;
//! use arbor::item::{ItemPatch, TreeItem};
//! use arbor::types::ItemId;
//!
//! let mut store = TreeStore::new([
//!     TreeItem::root(1, "A"),
//!     TreeItem::new(2, 1, "B"),
//! ]);
//!
//! assert!(store.add(TreeItem::new(3, 2, "C")));
//! assert_eq!(store.descendants(&ItemId::Num(1)).len(), 2);
//!
//! // Reparent 3 directly under 1
//! assert!(store.update(ItemPatch::new(3).parent(1)));
//!
//! // Remove 2 and its (now empty) subtree
//! assert!(store.remove(&ItemId::Num(2)));
//! assert!(store.item(&ItemId::Num(3)).is_some());
//! ```

pub mod item;
pub mod store;
pub mod types;

pub use item::{ItemPatch, RawItem, TreeItem};
pub use store::{Storable, TreeStore};
pub use types::{ItemId, ParentLink, RawId};
