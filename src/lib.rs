//! LinkedIn Leads Extractor API Library
//!
//! Core functionality for extracting leads (people who liked or commented)
//! from LinkedIn posts via the Unipile scraping API, persisting them in
//! PostgreSQL, enriching them with extended profile data and exporting the
//! results.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection, pool and schema bootstrap.
//! - `errors`: Error handling types.
//! - `export`: CSV and Excel rendering of leads.
//! - `extractor`: Lead reconciliation and enrichment workflows.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `provider`: Unipile client (real and mock) behind a trait.
//! - `storage`: Database storage operations.

pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod storage;
