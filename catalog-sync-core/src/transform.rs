//! Filtering, projection and aggregation of raw product records.
//!
//! Raw records are read as loose JSON, the same way the API returns them: a
//! field that is missing or has an unexpected type is treated as absent
//! rather than failing the whole run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Longest description kept, in characters.
pub const DESCRIPTION_LIMIT: usize = 200;
pub const ELLIPSIS: &str = "...";
pub const UNKNOWN_LABEL: &str = "Unknown";
pub const ACTIVE_STATUS: &str = "active";

/// Occurrence count per label, serialized with keys in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyMap(BTreeMap<String, u64>);

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to `label`, inserting it at zero first if needed.
    pub fn increment(&mut self, label: &str) {
        *self.0.entry(label.to_string()).or_insert(0) += 1;
    }

    /// Like [`increment`](Self::increment), counting absent or empty labels as [`UNKNOWN_LABEL`].
    pub fn increment_or_unknown(&mut self, label: Option<&str>) {
        match label.filter(|l| !l.is_empty()) {
            Some(l) => self.increment(l),
            None => self.increment(UNKNOWN_LABEL),
        }
    }

    pub fn get(&self, label: &str) -> u64 {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A published product, reduced to what the site needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Value,
    pub title: Option<String>,
    pub handle: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub published_at: Option<String>,
    pub tags: Vec<String>,
    pub variants: usize,
    pub images: usize,
    pub description: String,
}

/// Everything written to `shopify-products.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncDocument {
    pub sync_timestamp: String,
    pub total_products: usize,
    pub products: Vec<CatalogEntry>,
    pub categories: FrequencyMap,
    pub vendors: FrequencyMap,
    pub product_types: FrequencyMap,
}

/// Everything written to `shopify-summary.json`: the document without its product list.
#[derive(Debug, Serialize)]
pub struct SummaryDocument<'a> {
    pub sync_timestamp: &'a str,
    pub total_products: usize,
    pub categories: &'a FrequencyMap,
    pub vendors: &'a FrequencyMap,
    pub product_types: &'a FrequencyMap,
}

impl SyncDocument {
    pub fn summary(&self) -> SummaryDocument<'_> {
        SummaryDocument {
            sync_timestamp: &self.sync_timestamp,
            total_products: self.total_products,
            categories: &self.categories,
            vendors: &self.vendors,
            product_types: &self.product_types,
        }
    }
}

fn str_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn owned_field(record: &Value, key: &str) -> Option<String> {
    str_field(record, key).map(str::to_owned)
}

fn array_len(record: &Value, key: &str) -> usize {
    record
        .get(key)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// True for records that are visible in the storefront: status `active` and a publication time set.
pub fn is_published(record: &Value) -> bool {
    let active = str_field(record, "status") == Some(ACTIVE_STATUS);
    let published = str_field(record, "published_at").is_some_and(|s| !s.is_empty());
    active && published
}

/// Split a comma-delimited tag field into trimmed, non-empty tags, keeping duplicates.
pub fn split_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

/// Keep at most [`DESCRIPTION_LIMIT`] characters, marking truncation with [`ELLIPSIS`].
pub fn truncate_description(body: &str) -> String {
    match body.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => format!("{}{}", &body[..cut], ELLIPSIS),
        None => body.to_string(),
    }
}

/// Project one raw record. Does not check publication status.
pub fn normalize(record: &Value) -> CatalogEntry {
    CatalogEntry {
        id: record.get("id").cloned().unwrap_or(Value::Null),
        title: owned_field(record, "title"),
        handle: owned_field(record, "handle"),
        vendor: owned_field(record, "vendor"),
        product_type: owned_field(record, "product_type"),
        status: owned_field(record, "status"),
        created_at: owned_field(record, "created_at"),
        updated_at: owned_field(record, "updated_at"),
        published_at: owned_field(record, "published_at"),
        tags: split_tags(str_field(record, "tags")),
        variants: array_len(record, "variants"),
        images: array_len(record, "images"),
        description: truncate_description(str_field(record, "body_html").unwrap_or_default()),
    }
}

/// Filter, normalize and aggregate `records` into a document stamped with `sync_timestamp`.
pub fn build_document(records: &[Value], sync_timestamp: impl Into<String>) -> SyncDocument {
    info!(records = records.len(), "[SYNC][PROCESS] Processing product data");

    let mut products = Vec::new();
    let mut categories = FrequencyMap::new();
    let mut vendors = FrequencyMap::new();
    let mut product_types = FrequencyMap::new();

    for record in records.iter().filter(|r| is_published(r)) {
        let entry = normalize(record);
        product_types.increment_or_unknown(entry.product_type.as_deref());
        vendors.increment_or_unknown(entry.vendor.as_deref());
        for tag in &entry.tags {
            categories.increment(tag);
        }
        debug!(id = %entry.id, title = ?entry.title, "Kept published product");
        products.push(entry);
    }

    info!(
        fetched = records.len(),
        published = products.len(),
        "[SYNC][PROCESS] Filtered products down to active and published"
    );

    SyncDocument {
        sync_timestamp: sync_timestamp.into(),
        total_products: products.len(),
        products,
        categories,
        vendors,
        product_types,
    }
}
