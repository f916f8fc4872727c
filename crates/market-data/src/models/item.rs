use std::fmt;

use serde::{Deserialize, Serialize};

/// Grand Exchange item identifier.
///
/// Identifiers are assigned upstream and are unique across the whole
/// item database. They double as the cache key for price series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl ItemId {
    /// Returns the raw integer value.
    pub fn get(self) -> i64 {
        self.0
    }

    /// Whether this identifier could name a real item.
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ItemId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Item record from the item database.
///
/// Serialized with the `ItemID` / `Name` field names the query editor
/// front end reads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item identifier
    #[serde(rename = "ItemID")]
    pub item_id: ItemId,

    /// Display name (e.g., "Abyssal whip")
    #[serde(rename = "Name")]
    pub name: String,
}

impl Item {
    pub fn new(item_id: ItemId, name: impl Into<String>) -> Self {
        Self {
            item_id,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_serializes_with_front_end_names() {
        let item = Item::new(ItemId(4151), "Abyssal whip");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["ItemID"], 4151);
        assert_eq!(json["Name"], "Abyssal whip");
    }

    #[test]
    fn test_negative_id_is_invalid() {
        assert!(ItemId(0).is_valid());
        assert!(ItemId(4151).is_valid());
        assert!(!ItemId(-1).is_valid());
    }
}
