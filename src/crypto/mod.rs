//! Cryptographic functions for FinNest
//!
//! Provides passphrase-based AES-256-GCM encryption of documents before they
//! leave the client, behind an injectable [`CryptoProvider`] capability.

pub mod encryption;
pub mod key_derivation;
pub mod provider;
pub mod secure_memory;

pub use encryption::{
    decrypt_document, encrypt_document, validate_passphrase, EncryptedBlob, EncryptionMetadata,
    PlainFile,
};
pub use key_derivation::{derive_key, DerivedKey, KdfParams};
pub use provider::{CryptoProvider, RustCryptoProvider};
pub use secure_memory::SecureString;
