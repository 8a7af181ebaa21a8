//! FinNest - family finance vault
//!
//! This library provides the core of FinNest: a document vault that encrypts
//! files with a passphrase before storing them, an FX rate comparison across
//! public providers with local conversion, asset totals, share links and
//! observational portfolio insights.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (documents, assets, rates, shares)
//! - `storage`: JSON record files and the blob store
//! - `crypto`: Passphrase-based document encryption
//! - `audit`: Audit logging system
//! - `services`: Business logic layer
//! - `fx`: Rate providers, comparison and conversion
//! - `insights`: Portfolio observations
//! - `server`: HTTP API
//! - `cli`, `display`: Command handlers and terminal output
//!
//! # Example
//!
//! ```rust,ignore
//! use finnest::config::{paths::FinnestPaths, settings::Settings};
//!
//! let paths = FinnestPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod fx;
pub mod insights;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;

pub use error::{FinnestError, FinnestResult};
