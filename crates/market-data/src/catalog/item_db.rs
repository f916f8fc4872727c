//! In-memory item database loaded from line-delimited JSON.
//!
//! Each non-blank line holds one item record:
//!
//! ```text
//! {"ItemID": 4151, "Name": "Abyssal whip", "Members": true}
//! ```
//!
//! Fields other than `ItemID` and `Name` are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, info};

use super::ItemCatalog;
use crate::errors::MarketDataError;
use crate::models::{Item, ItemId};

/// Maximum number of search results returned by default.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Item database held in memory for the process lifetime.
#[derive(Debug, Default)]
pub struct ItemDb {
    items: HashMap<ItemId, Item>,
    /// Lowercased names, paired with ids, for substring search
    names: Vec<(String, ItemId)>,
    search_limit: usize,
}

impl ItemDb {
    /// Build a database from already-decoded items. Later duplicates win.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let items: HashMap<ItemId, Item> = items
            .into_iter()
            .map(|item| (item.item_id, item))
            .collect();
        let names = items
            .values()
            .map(|item| (item.name.to_lowercase(), item.item_id))
            .collect();

        Self {
            items,
            names,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Load a database from a line-delimited JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MarketDataError> {
        let mut items = Vec::new();

        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let item: Item = serde_json::from_str(&line).map_err(|e| {
                MarketDataError::ItemDb(format!("line {}: {}", index + 1, e))
            })?;
            items.push(item);
        }

        Ok(Self::from_items(items))
    }

    /// Load a database from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MarketDataError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let db = Self::from_reader(file)?;
        info!("Loaded {} items from {}", db.len(), path.display());
        Ok(db)
    }

    /// Override the maximum number of search results.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemCatalog for ItemDb {
    fn lookup(&self, item_id: ItemId) -> Result<Item, MarketDataError> {
        self.items
            .get(&item_id)
            .cloned()
            .ok_or(MarketDataError::ItemNotFound(item_id))
    }

    /// Case-insensitive substring search over item names.
    ///
    /// A numeric query also matches the item with that identifier. Exact
    /// matches sort first, then shorter names, then alphabetically.
    fn search(&self, text: &str) -> Result<Vec<Item>, MarketDataError> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let id_match = needle.parse::<i64>().ok().map(ItemId);

        let mut hits: Vec<(bool, &Item)> = self
            .names
            .iter()
            .filter(|(name, id)| Some(*id) == id_match || name.contains(&needle))
            .filter_map(|(name, id)| {
                let exact = Some(*id) == id_match || *name == needle;
                self.items.get(id).map(|item| (exact, item))
            })
            .collect();

        hits.sort_by(|(a_exact, a), (b_exact, b)| {
            b_exact
                .cmp(a_exact)
                .then_with(|| a.name.len().cmp(&b.name.len()))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        hits.truncate(self.search_limit);

        debug!("Search '{}' matched {} item(s)", text, hits.len());
        Ok(hits.into_iter().map(|(_, item)| item.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LJSON: &str = r#"{"ItemID": 4151, "Name": "Abyssal whip", "Members": true}
{"ItemID": 21371, "Name": "Abyssal vine whip"}

{"ItemID": 1333, "Name": "Rune scimitar"}
{"ItemID": 560, "Name": "Death rune"}
"#;

    #[test]
    fn test_from_reader_skips_blank_lines() {
        let db = ItemDb::from_reader(LJSON.as_bytes()).unwrap();
        assert_eq!(db.len(), 4);
    }

    #[test]
    fn test_from_reader_reports_line_number() {
        let input = "{\"ItemID\": 1, \"Name\": \"a\"}\nnot json\n";
        let err = ItemDb::from_reader(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);
    }

    #[test]
    fn test_open_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LJSON.as_bytes()).unwrap();

        let db = ItemDb::open(file.path()).unwrap();
        assert_eq!(db.lookup(ItemId(560)).unwrap().name, "Death rune");
    }

    #[test]
    fn test_lookup_missing_item() {
        let db = ItemDb::from_reader(LJSON.as_bytes()).unwrap();
        assert!(matches!(
            db.lookup(ItemId(1)),
            Err(MarketDataError::ItemNotFound(ItemId(1)))
        ));
    }

    #[test]
    fn test_search_is_case_insensitive_and_ordered() {
        let db = ItemDb::from_reader(LJSON.as_bytes()).unwrap();
        let names: Vec<_> = db
            .search("WHIP")
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Abyssal whip", "Abyssal vine whip"]);
    }

    #[test]
    fn test_search_exact_name_first() {
        let db = ItemDb::from_items(vec![
            Item::new(ItemId(1), "Rune"),
            Item::new(ItemId(2), "Air rune"),
            Item::new(ItemId(3), "Rune essence"),
        ]);
        let first = db.search("rune").unwrap().remove(0);
        assert_eq!(first.item_id, ItemId(1));
    }

    #[test]
    fn test_search_by_numeric_id() {
        let db = ItemDb::from_reader(LJSON.as_bytes()).unwrap();
        let results = db.search("1333").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Rune scimitar");
    }

    #[test]
    fn test_search_blank_query() {
        let db = ItemDb::from_reader(LJSON.as_bytes()).unwrap();
        assert!(db.search("   ").unwrap().is_empty());
    }

    #[test]
    fn test_search_limit() {
        let items = (0..10).map(|i| Item::new(ItemId(i), format!("Bronze bolts ({})", i)));
        let db = ItemDb::from_items(items).with_search_limit(3);
        assert_eq!(db.search("bronze").unwrap().len(), 3);
    }
}
