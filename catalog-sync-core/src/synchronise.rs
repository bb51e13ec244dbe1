//! High-level pipeline: orchestrates credential check → fetch → process → write.
//!
//! This module provides the top-level orchestration for one sync run:
//!   - Refuses to start unless the catalog credentials are present (no network call is made)
//!   - Pulls every product page through a [`ProductFetcher`]
//!   - Filters to active, published products and aggregates counts ([`crate::transform`])
//!   - Writes the products document and its summary to every output directory ([`crate::persist`])
//!
//! # Major Types
//! - [`SyncReport`]: what was fetched, kept and written
//! - [`SyncError`]: why a run produced nothing usable
//!
//! # Error Handling
//! Transport and per-file write failures are logged where they happen and do
//! not abort the run. Only a missing precondition, an empty listing, or a run
//! where no destination received the products document is reported as `Err`.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use tracing::{error, info};

use crate::config::OutputConfig;
use crate::contract::{CredentialProvider, ProductFetcher};
use crate::credentials::CATALOG_SETTINGS;
use crate::fetch::fetch_all_products;
use crate::persist::{persist_documents, WriteFailure, PRODUCTS_FILE};
use crate::transform::build_document;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("catalog credentials not configured, missing: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("no products retrieved from the catalog API")]
    NoProducts,

    #[error("products document could not be written to any destination")]
    NothingPersisted { failures: Vec<WriteFailure> },
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct SyncReport {
    pub sync_timestamp: String,
    pub fetched: usize,
    pub published: usize,
    pub written: Vec<PathBuf>,
    pub failed_writes: Vec<WriteFailure>,
}

/// Current time as the document timestamp, e.g. `2024-07-01T12:00:00Z`.
pub fn sync_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub async fn synchronise<P, F>(
    credentials: &P,
    fetcher: &F,
    output: &OutputConfig,
) -> Result<SyncReport, SyncError>
where
    P: CredentialProvider + ?Sized,
    F: ProductFetcher + ?Sized,
{
    if !credentials.is_catalog_sync_ready() {
        let missing: Vec<&'static str> = CATALOG_SETTINGS
            .iter()
            .copied()
            .filter(|name| !credentials.is_set(name))
            .collect();
        error!(missing = %missing.join(", "), "[SYNC][ERROR] Shopify credentials not configured");
        return Err(SyncError::MissingCredentials(missing));
    }

    info!("[SYNC] Starting Shopify product synchronisation");
    output.trace_loaded();

    let records = fetch_all_products(fetcher).await;
    if records.is_empty() {
        error!("[SYNC][ERROR] No products retrieved");
        return Err(SyncError::NoProducts);
    }
    info!(fetched = records.len(), "[SYNC] Retrieved products");

    let timestamp = sync_timestamp();
    let document = build_document(&records, timestamp.clone());

    let outcome = persist_documents(&document, &output.destinations());
    if !outcome.wrote(PRODUCTS_FILE) {
        error!(
            failures = outcome.failed.len(),
            "[SYNC][ERROR] Products document was not written anywhere"
        );
        return Err(SyncError::NothingPersisted {
            failures: outcome.failed,
        });
    }

    info!(
        published = document.total_products,
        written = outcome.written.len(),
        failed = outcome.failed.len(),
        "[SYNC] Shopify synchronisation complete"
    );

    Ok(SyncReport {
        sync_timestamp: timestamp,
        fetched: records.len(),
        published: document.total_products,
        written: outcome.written,
        failed_writes: outcome.failed,
    })
}
