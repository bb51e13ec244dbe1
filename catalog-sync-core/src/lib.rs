#![doc = "catalog-sync-core: core logic library for catalog-sync."]

//! This crate contains the whole sync pipeline: credential handling, catalog
//! retrieval, filtering and aggregation, and the JSON output files. The CLI
//! crate only wires these together.
//!
//! # Usage
//! Build a [`credentials::Credentials`] once, pick a [`contract::ProductFetcher`]
//! (normally [`fetch::ShopifyClient`]) and call [`synchronise::synchronise`].

pub mod config;
pub mod contract;
pub mod credentials;
pub mod fetch;
pub mod persist;
pub mod synchronise;
pub mod temp_files;
pub mod transform;
