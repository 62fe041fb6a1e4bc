use std::collections::HashMap;

use crate::money::opt_cents_to_major;
use crate::types::{ItemRecord, ItemStatics, OrderBookSnapshot};

/// Merge one fetched order book into a (possibly absent) stored record.
///
/// - Fields already on `existing` survive unless overwritten below, including
///   unknown ones held in `extra`.
/// - Static fields from the catalog replace stored ones only when present.
/// - Order-book fields always replace stored ones; prices are converted from
///   minor units.
/// - `date_modified` is stamped with `now_ms`.
#[must_use]
pub fn merge_record(
    existing: Option<ItemRecord>,
    hash_name: &str,
    fresh: &OrderBookSnapshot,
    statics: &ItemStatics,
    now_ms: i64,
) -> ItemRecord {
    let mut rec = existing.unwrap_or_else(|| ItemRecord::new(hash_name));
    hash_name.clone_into(&mut rec.hash_name);

    if let Some(id) = statics.item_nameid {
        rec.item_nameid = Some(id);
    }
    if let Some(image) = &statics.image {
        rec.image = Some(image.clone());
    }

    rec.sell_order_count = fresh.sell_order_count;
    rec.buy_order_count = fresh.buy_order_count;
    rec.lowest_sell_order = opt_cents_to_major(fresh.lowest_sell_order);
    rec.highest_buy_order = opt_cents_to_major(fresh.highest_buy_order);
    rec.date_modified = now_ms;
    rec
}

/// Insertion-ordered working set of item records, unique by `hash_name`.
///
/// Records keep the position at which their hash name was first seen, so the
/// persisted list is stable across rewrites.
#[derive(Debug, Clone, Default)]
pub struct ItemBook {
    records: Vec<ItemRecord>,
    index: HashMap<String, usize>,
}

impl ItemBook {
    /// An empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from a persisted list.
    ///
    /// Duplicate hash names collapse into the first position with the last
    /// record's contents.
    #[must_use]
    pub fn from_records(records: Vec<ItemRecord>) -> Self {
        let mut book = Self::new();
        for rec in records {
            book.upsert(rec);
        }
        book
    }

    fn upsert(&mut self, rec: ItemRecord) {
        if let Some(&pos) = self.index.get(&rec.hash_name) {
            self.records[pos] = rec;
        } else {
            self.index.insert(rec.hash_name.clone(), self.records.len());
            self.records.push(rec);
        }
    }

    /// Look up a record by hash name.
    #[must_use]
    pub fn get(&self, hash_name: &str) -> Option<&ItemRecord> {
        self.index.get(hash_name).map(|&pos| &self.records[pos])
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in persisted order.
    #[must_use]
    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    /// Consume the book, yielding records in persisted order.
    #[must_use]
    pub fn into_records(self) -> Vec<ItemRecord> {
        self.records
    }

    /// Merge a fetched order book into the record for `hash_name`.
    ///
    /// See [`merge_record`] for the field rules.
    pub fn merge(
        &mut self,
        hash_name: &str,
        fresh: &OrderBookSnapshot,
        statics: &ItemStatics,
        now_ms: i64,
    ) -> &ItemRecord {
        let pos = match self.index.get(hash_name) {
            Some(&pos) => pos,
            None => {
                self.index.insert(hash_name.to_string(), self.records.len());
                self.records.push(ItemRecord::new(hash_name));
                self.records.len() - 1
            }
        };
        let previous = std::mem::replace(&mut self.records[pos], ItemRecord::new(hash_name));
        self.records[pos] = merge_record(Some(previous), hash_name, fresh, statics, now_ms);
        &self.records[pos]
    }
}
