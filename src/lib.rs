//! Pastelinker - content-addressed text storage with short public links
//!
//! Text is stored once per SHA-256 digest and referenced by links that carry
//! a short base-62 code, an owner, a visibility flag and an optional
//! expiration time.
//!
//! # Features
//! - **cli**: Command-line interface (default)
//!
//! # Architecture
//! - `cache`: Fail-open cache-aside layer (moka / redis)
//! - `blob`: Object storage backends (filesystem / memory)
//! - `storage`: Persisted blob index and link table (sea-orm)
//! - `cas`: Content-addressable store with deduplication
//! - `shortcode`: Short code generation with bounded retries
//! - `services`: Link lifecycle
//! - `config`: Configuration management
//! - `system`: Logging and backend lifecycle
//! - `cli`: Command-line argument definitions
//! - `interfaces`: CLI command handlers
//! - `utils`: Expiration time parsing

pub mod blob;
pub mod cache;
pub mod cas;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod services;
pub mod shortcode;
pub mod storage;
pub mod system;
pub mod utils;
