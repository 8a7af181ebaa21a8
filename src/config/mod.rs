//! Configuration module for FinNest
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence
//! - Encryption policy and endpoint preferences

pub mod paths;
pub mod settings;

pub use paths::FinnestPaths;
pub use settings::{EncryptionPolicy, Settings};
