//! Document encryption transform
//!
//! Turns a plaintext file into an [`EncryptedBlob`] under a passphrase-derived
//! AES-256-GCM key and back. Every call draws a fresh salt and IV, so two
//! encryptions of the same file never share ciphertext.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::config::EncryptionPolicy;
use crate::error::{FinnestError, FinnestResult};

use super::key_derivation::KdfParams;
use super::provider::{CryptoProvider, NONCE_SIZE};

/// Salt length in bytes
pub const SALT_SIZE: usize = 16;

/// Metadata format version
pub const FORMAT_VERSION: u8 = 1;

/// Algorithm label recorded in metadata
pub const ALGORITHM: &str = "AES-GCM";

/// A file as read from disk or received from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl PlainFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// The artifact produced by [`encrypt_document`]
#[derive(Debug, Clone)]
pub struct EncryptedBlob {
    /// AES-GCM output, tag included
    pub ciphertext: Vec<u8>,
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
    pub kdf: KdfParams,
    pub original_name: String,
    pub original_type: Option<String>,
    pub original_size: u64,
}

impl EncryptedBlob {
    /// The sidecar metadata stored next to the ciphertext
    pub fn metadata(&self) -> EncryptionMetadata {
        EncryptionMetadata {
            v: FORMAT_VERSION,
            alg: ALGORITHM.to_string(),
            salt: STANDARD.encode(&self.salt),
            iv: STANDARD.encode(&self.iv),
            orig_name: self.original_name.clone(),
            orig_type: self.original_type.clone(),
            orig_size: self.original_size,
            kdf: self.kdf.clone(),
        }
    }
}

/// Contents of the `.meta.json` object
///
/// Salt and IV are base64. A missing `kdf` means PBKDF2-SHA256 with the
/// default iteration count, which is what early writers produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionMetadata {
    pub v: u8,
    pub alg: String,
    pub salt: String,
    pub iv: String,
    #[serde(default)]
    pub orig_name: String,
    #[serde(default)]
    pub orig_type: Option<String>,
    #[serde(default)]
    pub orig_size: u64,
    #[serde(default)]
    pub kdf: KdfParams,
}

impl EncryptionMetadata {
    /// Parse a sidecar object
    pub fn from_json(bytes: &[u8]) -> FinnestResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| FinnestError::Decryption(format!("Unreadable metadata: {}", e)))
    }

    /// Serialize for upload
    pub fn to_json(&self) -> FinnestResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    fn check_format(&self) -> FinnestResult<()> {
        if self.v != FORMAT_VERSION {
            return Err(FinnestError::Decryption(format!(
                "Unsupported metadata version: {}",
                self.v
            )));
        }
        if self.alg != ALGORITHM {
            return Err(FinnestError::Decryption(format!(
                "Unsupported algorithm: {}",
                self.alg
            )));
        }
        Ok(())
    }

    fn decode_salt(&self) -> FinnestResult<Vec<u8>> {
        let salt = STANDARD
            .decode(&self.salt)
            .map_err(|e| FinnestError::Decryption(format!("Invalid salt encoding: {}", e)))?;
        if salt.len() != SALT_SIZE {
            return Err(FinnestError::Decryption(format!(
                "Invalid salt size: expected {}, got {}",
                SALT_SIZE,
                salt.len()
            )));
        }
        Ok(salt)
    }

    fn decode_iv(&self) -> FinnestResult<Vec<u8>> {
        let iv = STANDARD
            .decode(&self.iv)
            .map_err(|e| FinnestError::Decryption(format!("Invalid IV encoding: {}", e)))?;
        if iv.len() != NONCE_SIZE {
            return Err(FinnestError::Decryption(format!(
                "Invalid IV size: expected {}, got {}",
                NONCE_SIZE,
                iv.len()
            )));
        }
        Ok(iv)
    }
}

/// Reject passphrases that do not meet the configured minimum length
pub fn validate_passphrase(passphrase: &str, policy: &EncryptionPolicy) -> FinnestResult<()> {
    if passphrase.is_empty() {
        return Err(FinnestError::Validation("passphrase required".to_string()));
    }
    if passphrase.chars().count() < policy.min_passphrase_len {
        return Err(FinnestError::Validation(format!(
            "passphrase must be at least {} characters",
            policy.min_passphrase_len
        )));
    }
    Ok(())
}

/// Encrypt a file under a passphrase
pub fn encrypt_document(
    provider: &dyn CryptoProvider,
    file: &PlainFile,
    passphrase: &str,
    policy: &EncryptionPolicy,
) -> FinnestResult<EncryptedBlob> {
    validate_passphrase(passphrase, policy)?;

    let salt = provider.random_bytes(SALT_SIZE)?;
    let iv = provider.random_bytes(NONCE_SIZE)?;
    let key = provider.derive_key(passphrase, &salt, &policy.kdf)?;
    let ciphertext = provider.encrypt(&key, &iv, &file.bytes)?;

    Ok(EncryptedBlob {
        ciphertext,
        salt,
        iv,
        kdf: policy.kdf.clone(),
        original_name: file.name.clone(),
        original_type: file.content_type.clone(),
        original_size: file.size(),
    })
}

/// Decrypt ciphertext using the parameters recorded in its metadata
pub fn decrypt_document(
    provider: &dyn CryptoProvider,
    ciphertext: &[u8],
    metadata: &EncryptionMetadata,
    passphrase: &str,
) -> FinnestResult<Vec<u8>> {
    if passphrase.is_empty() {
        return Err(FinnestError::Validation("passphrase required".to_string()));
    }
    metadata.check_format()?;

    metadata.kdf.check_stored()?;

    let salt = metadata.decode_salt()?;
    let iv = metadata.decode_iv()?;
    let key = provider
        .derive_key(passphrase, &salt, &metadata.kdf)
        .map_err(|e| match e {
            FinnestError::Decryption(_) => e,
            other => FinnestError::Decryption(other.to_string()),
        })?;

    provider.decrypt(&key, &iv, ciphertext)
}
