//! Catalog inputs, persisted item records and the resume cursor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::serde_utils;

/// One entry of the ordered item catalog.
///
/// Only the fields the scraper consumes are modelled; anything else in the
/// source document is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Marketplace hash name, unique within the catalog.
    pub hash_name: String,
    /// Image URL or path, if the catalog has one.
    #[serde(default)]
    pub image: Option<String>,
}

impl CatalogEntry {
    /// Convenience constructor used by fixtures and tests.
    pub fn new(hash_name: impl Into<String>, image: Option<&str>) -> Self {
        Self {
            hash_name: hash_name.into(),
            image: image.map(str::to_string),
        }
    }
}

/// Mapping from `hash_name` to the marketplace-internal item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameIdMap(HashMap<String, u64>);

impl NameIdMap {
    /// Resolve the item id for a hash name.
    #[must_use]
    pub fn get(&self, hash_name: &str) -> Option<u64> {
        self.0.get(hash_name).copied()
    }

    /// Number of known ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no ids are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u64)> for NameIdMap {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Order-book snapshot as returned by the marketplace, prices in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Number of outstanding sell orders.
    pub sell_order_count: u64,
    /// Number of outstanding buy orders.
    pub buy_order_count: u64,
    /// Cheapest sell order in cents; `None` when nobody is selling.
    pub lowest_sell_order: Option<u64>,
    /// Highest buy order in cents; `None` when nobody is buying.
    pub highest_buy_order: Option<u64>,
}

/// Static fields taken from the catalog and the name-id map for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStatics {
    /// Image from the catalog entry.
    pub image: Option<String>,
    /// Resolved marketplace id.
    pub item_nameid: Option<u64>,
}

impl ItemStatics {
    /// Collect the static fields for a catalog entry.
    #[must_use]
    pub fn resolve(entry: &CatalogEntry, ids: &NameIdMap) -> Self {
        Self {
            image: entry.image.clone(),
            item_nameid: ids.get(&entry.hash_name),
        }
    }
}

/// Persisted per-item record.
///
/// Fields the current schema does not know about are kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Unique key.
    pub hash_name: String,
    /// Marketplace id used for the order-book request.
    #[serde(default, deserialize_with = "serde_utils::opt_u64")]
    pub item_nameid: Option<u64>,
    /// Image from the catalog.
    #[serde(default)]
    pub image: Option<String>,
    /// Outstanding sell orders at `date_modified`.
    #[serde(default, deserialize_with = "serde_utils::u64_or_zero")]
    pub sell_order_count: u64,
    /// Outstanding buy orders at `date_modified`.
    #[serde(default, deserialize_with = "serde_utils::u64_or_zero")]
    pub buy_order_count: u64,
    /// Cheapest sell order in major units, two decimals.
    #[serde(default)]
    pub lowest_sell_order: Option<String>,
    /// Highest buy order in major units, two decimals.
    #[serde(default)]
    pub highest_buy_order: Option<String>,
    /// Last merge time, epoch milliseconds.
    #[serde(default)]
    pub date_modified: i64,
    /// Unknown fields carried through rewrites.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ItemRecord {
    /// Empty record for a hash name that has never been fetched.
    pub fn new(hash_name: impl Into<String>) -> Self {
        Self {
            hash_name: hash_name.into(),
            item_nameid: None,
            image: None,
            sell_order_count: 0,
            buy_order_count: 0,
            lowest_sell_order: None,
            highest_buy_order: None,
            date_modified: 0,
            extra: serde_json::Map::new(),
        }
    }
}

/// On-disk shape of the resume cursor.
///
/// Signed so that a negative value written by hand is detected instead of
/// failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorFile {
    /// Next catalog index to process.
    pub start_from: i64,
}
