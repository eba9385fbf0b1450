//! item
//!
//! Record types crossing the store boundary.
//!
//! # Types
//!
//! - [`RawItem`] - The loosely-typed input DTO (identifiers may be strings)
//! - [`TreeItem`] - The normalized record held in the Item Table
//! - [`ItemPatch`] - A partial update: required id plus optional fields
//!
//! # Identifier set
//!
//! Only the fields named in [`IDENTIFIER_FIELDS`] undergo numeric-parse
//! normalization on load. `label` is payload: a numeric-looking label like
//! `"42"` is stored verbatim.
//!
//! # Example
//!
//! ```
//! use arbor::item::{RawItem, TreeItem};
//! use arbor::types::{ItemId, ParentLink};
//!
//! let raw: RawItem =
//!     serde_json::from_str(r#"{"id": "1", "parent": null, "label": "A"}"#).unwrap();
//! let item = TreeItem::from(raw);
//! assert_eq!(item.id, ItemId::Num(1));
//! assert_eq!(item.parent, ParentLink::Root);
//! assert_eq!(item.label, "A");
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::types::{ItemId, ParentLink, RawId};

/// The record fields that undergo string-to-integer normalization on load.
///
/// This is the configuration constant for the normalization pass; `label`
/// is deliberately absent. See [`RawItem`] for the DTO whose fields mirror
/// this set.
pub const IDENTIFIER_FIELDS: &[&str] = &["id", "parent"];

/// Errors from parsing raw input records.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to parse input records: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A raw input record, before identifier normalization.
///
/// This is the interchange shape the source system produces: `id` and
/// `parent` may each be an integer or a string, and `parent` may be JSON
/// `null` (or absent) for top-level records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    /// Record identifier; integer or numeric-looking string.
    pub id: RawId,

    /// Parent identifier; `None` is the root marker.
    #[serde(default)]
    pub parent: Option<RawId>,

    /// Display label; never normalized.
    pub label: String,
}

impl RawItem {
    /// Parse a JSON array of raw records.
    ///
    /// This is the only failable input path: the JSON must be an array of
    /// records with the [`RawItem`] shape. Identifier looseness (string
    /// vs. number) is not an error; it is resolved by normalization.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Malformed`] if the JSON does not parse as an
    /// array of records.
    pub fn parse_batch(json: &str) -> Result<Vec<RawItem>, InputError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A normalized record: the unit stored and indexed.
///
/// `id` is immutable once inserted; `parent` and `label` are mutable
/// through [`ItemPatch`]. Serializes back to the source interchange shape
/// (`parent` as `null` for top-level records).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
    /// Unique identifier.
    pub id: ItemId,

    /// Parent link; defaults to the root marker when absent from input.
    #[serde(default)]
    pub parent: ParentLink,

    /// Display label.
    pub label: String,
}

impl TreeItem {
    /// Create a record from already-normalized parts.
    pub fn new(id: impl Into<ItemId>, parent: impl Into<ParentLink>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: parent.into(),
            label: label.into(),
        }
    }

    /// Create a top-level record.
    pub fn root(id: impl Into<ItemId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: ParentLink::Root,
            label: label.into(),
        }
    }
}

impl From<RawItem> for TreeItem {
    /// Normalize a raw record.
    ///
    /// Applies the identifier normalization of [`crate::types::ItemId`] to
    /// exactly the [`IDENTIFIER_FIELDS`]; `label` passes through verbatim.
    fn from(raw: RawItem) -> Self {
        Self {
            id: ItemId::from(raw.id),
            parent: ParentLink::from(raw.parent),
            label: raw.label,
        }
    }
}

/// A partial update for an existing record.
///
/// `id` selects the record; `parent` and `label` replace the existing
/// fields when present and leave them untouched when absent (shallow
/// merge). In the JSON shape, an absent `parent` field means "untouched"
/// while an explicit `null` means "move to root" — matching the source
/// system's partial-update semantics.
///
/// # Example
///
/// ```
/// use arbor::item::ItemPatch;
/// use arbor::types::{ItemId, ParentLink};
///
/// let patch = ItemPatch::new(ItemId::Num(3))
///     .parent(ParentLink::from(1))
///     .label("renamed");
/// assert_eq!(patch.parent, Some(ParentLink::from(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    /// The record to update.
    pub id: ItemId,

    /// Replacement parent link, if supplied.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "parent_patch"
    )]
    pub parent: Option<ParentLink>,

    /// Replacement label, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ItemPatch {
    /// Start a patch for the given record.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            label: None,
        }
    }

    /// Supply a replacement parent link.
    pub fn parent(mut self, parent: impl Into<ParentLink>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Supply a replacement label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Deserialize the `parent` field of a patch.
///
/// The field being present at all means "replace": JSON `null` becomes
/// the root marker, not "untouched". Absence is handled by the serde
/// `default` and never reaches this function.
fn parent_patch<'de, D>(de: D) -> Result<Option<ParentLink>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(de)?;
    Ok(Some(ParentLink::from(raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_item_accepts_string_and_numeric_identifiers() {
        let items = RawItem::parse_batch(
            r#"[
                {"id": "1", "parent": null, "label": "A"},
                {"id": 2, "parent": 1, "label": "B"},
                {"id": 3, "parent": "2", "label": "C"}
            ]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, RawId::Text("1".into()));
        assert_eq!(items[1].parent, Some(RawId::Num(1)));
    }

    #[test]
    fn raw_item_missing_parent_means_root() {
        let item: RawItem = serde_json::from_str(r#"{"id": 1, "label": "A"}"#).unwrap();
        assert_eq!(item.parent, None);
        assert_eq!(TreeItem::from(item).parent, ParentLink::Root);
    }

    #[test]
    fn parse_batch_rejects_non_array_input() {
        assert!(RawItem::parse_batch(r#"{"id": 1, "label": "A"}"#).is_err());
        assert!(RawItem::parse_batch("not json").is_err());
    }

    #[test]
    fn normalization_covers_identifier_fields_only() {
        // id and parent normalize; a numeric-looking label stays text
        let raw: RawItem =
            serde_json::from_str(r#"{"id": "10", "parent": "20", "label": "30"}"#).unwrap();
        let item = TreeItem::from(raw);
        assert_eq!(item.id, ItemId::Num(10));
        assert_eq!(item.parent, ParentLink::from(20));
        assert_eq!(item.label, "30");
        assert_eq!(IDENTIFIER_FIELDS, ["id", "parent"]);
    }

    #[test]
    fn unparseable_identifier_kept_as_tagged_text() {
        let raw: RawItem =
            serde_json::from_str(r#"{"id": "widget", "parent": null, "label": "W"}"#).unwrap();
        let item = TreeItem::from(raw);
        assert_eq!(item.id, ItemId::Text("widget".into()));
    }

    #[test]
    fn tree_item_serializes_to_interchange_shape() {
        let item = TreeItem::root(1, "A");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "parent": null, "label": "A"})
        );
    }

    #[test]
    fn patch_parent_null_means_move_to_root() {
        let patch: ItemPatch = serde_json::from_str(r#"{"id": 3, "parent": null}"#).unwrap();
        assert_eq!(patch.parent, Some(ParentLink::Root));
        assert_eq!(patch.label, None);
    }

    #[test]
    fn patch_absent_parent_means_untouched() {
        let patch: ItemPatch = serde_json::from_str(r#"{"id": 3, "label": "C2"}"#).unwrap();
        assert_eq!(patch.parent, None);
        assert_eq!(patch.label, Some("C2".into()));
    }

    #[test]
    fn patch_builder_round_trips() {
        let patch = ItemPatch::new(3).parent(ParentLink::Root).label("top");
        let json = serde_json::to_string(&patch).unwrap();
        let back: ItemPatch = serde_json::from_str(&json).unwrap();
        assert_eq!(patch, back);
    }
}
