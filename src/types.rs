//! types
//!
//! Strong types for store identifiers.
//!
//! # Types
//!
//! - [`RawId`] - An identifier as it arrives from the outside: integer or text
//! - [`ItemId`] - A normalized identifier: numeric, or the tolerated text fallback
//! - [`ParentLink`] - A parent reference: the root marker or another item's id
//!
//! # Normalization
//!
//! Source data delivers identifiers as either native integers or
//! numeric-looking strings. Conversion from [`RawId`] to [`ItemId`] parses
//! text identifiers to `i64` (after trimming surrounding whitespace); text
//! that does not parse cleanly is kept as [`ItemId::Text`] rather than
//! rejected or silently coerced. The fallback is a distinct variant so
//! callers and tests can target it directly.
//!
//! # Examples
//!
//! ```
//! use arbor::types::{ItemId, RawId};
//!
//! // Numeric strings normalize to numbers
//! assert_eq!(ItemId::from(RawId::Text("42".into())), ItemId::Num(42));
//!
//! // Non-numeric strings survive as the tagged fallback
//! assert_eq!(
//!     ItemId::from(RawId::Text("section-a".into())),
//!     ItemId::Text("section-a".into())
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from strict identifier conversions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("identifier is not numeric: {0}")]
    NonNumericId(String),
}

/// An identifier field as it arrives from the outside world.
///
/// Input records may carry `id` and `parent` as either native integers or
/// strings. This type captures that looseness at the boundary; it is
/// normalized to [`ItemId`] before anything is indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// A native integer identifier.
    Num(i64),
    /// A string identifier, possibly numeric-looking.
    Text(String),
}

/// A normalized item identifier.
///
/// `Num` is the common case. `Text` is the deliberate leniency for source
/// strings that do not parse as integers: the record is still accepted
/// structurally, and downstream consumers must tolerate the non-numeric
/// key. `Num(1)` and `Text("1")` never collide because normalization
/// collapses every cleanly-parsing string into `Num`.
///
/// # Example
///
/// ```
/// use arbor::types::ItemId;
///
/// let id = ItemId::from(7);
/// assert_eq!(id.as_num().unwrap(), 7);
/// assert!(ItemId::Text("draft".into()).as_num().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "RawId")]
pub enum ItemId {
    /// A numeric identifier.
    Num(i64),
    /// A non-numeric identifier kept verbatim from the input.
    Text(String),
}

impl ItemId {
    /// Whether normalization produced a numeric identifier.
    pub fn is_num(&self) -> bool {
        matches!(self, Self::Num(_))
    }

    /// Get the numeric value, or an error for the text fallback.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::NonNumericId`] for [`ItemId::Text`].
    pub fn as_num(&self) -> Result<i64, TypeError> {
        match self {
            Self::Num(n) => Ok(*n),
            Self::Text(s) => Err(TypeError::NonNumericId(s.clone())),
        }
    }
}

impl From<RawId> for ItemId {
    /// Normalize a raw identifier.
    ///
    /// Text is trimmed and parsed as base-10 `i64`; on failure the
    /// original (untrimmed) string is kept as [`ItemId::Text`].
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Num(n) => Self::Num(n),
            RawId::Text(s) => match s.trim().parse::<i64>() {
                Ok(n) => Self::Num(n),
                Err(_) => Self::Text(s),
            },
        }
    }
}

impl From<ItemId> for RawId {
    fn from(id: ItemId) -> Self {
        match id {
            ItemId::Num(n) => Self::Num(n),
            ItemId::Text(s) => Self::Text(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

impl From<&str> for ItemId {
    /// Convenience conversion that applies the same normalization as
    /// `From<RawId>`.
    fn from(s: &str) -> Self {
        Self::from(RawId::Text(s.to_owned()))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A parent reference: either the root marker or another item's id.
///
/// Top-level records carry `Root` (serialized as JSON `null`, the source
/// system's "no parent" value). The Children Index is keyed by this type,
/// so enumerating top-level records is the same lookup as enumerating any
/// other parent's children.
///
/// # Example
///
/// ```
/// use arbor::types::{ItemId, ParentLink};
///
/// let link = ParentLink::Node(ItemId::Num(1));
/// assert!(!link.is_root());
/// assert_eq!(link.node(), Some(&ItemId::Num(1)));
/// assert_eq!(ParentLink::Root.node(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<RawId>", into = "Option<RawId>")]
pub enum ParentLink {
    /// The root marker: this record has no parent.
    Root,
    /// The id of the parent record.
    Node(ItemId),
}

impl ParentLink {
    /// Whether this is the root marker.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// The parent id, or `None` for the root marker.
    pub fn node(&self) -> Option<&ItemId> {
        match self {
            Self::Root => None,
            Self::Node(id) => Some(id),
        }
    }
}

impl Default for ParentLink {
    fn default() -> Self {
        Self::Root
    }
}

impl From<Option<RawId>> for ParentLink {
    fn from(raw: Option<RawId>) -> Self {
        match raw {
            None => Self::Root,
            Some(raw) => Self::Node(ItemId::from(raw)),
        }
    }
}

impl From<ParentLink> for Option<RawId> {
    fn from(link: ParentLink) -> Self {
        match link {
            ParentLink::Root => None,
            ParentLink::Node(id) => Some(RawId::from(id)),
        }
    }
}

impl From<ItemId> for ParentLink {
    fn from(id: ItemId) -> Self {
        Self::Node(id)
    }
}

impl From<i64> for ParentLink {
    fn from(n: i64) -> Self {
        Self::Node(ItemId::Num(n))
    }
}
