//! Passphrase key derivation
//!
//! Derives 256-bit document keys from user passphrases. PBKDF2-HMAC-SHA256 is
//! the format-v1 default; Argon2id is available as a stronger policy.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{FinnestError, FinnestResult};

/// Length of derived keys in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Default PBKDF2 iteration count written by format v1
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 120_000;

/// Lowest PBKDF2 iteration count accepted for new uploads
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// Highest PBKDF2 iteration count accepted from stored metadata
pub const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

/// Highest Argon2 memory cost (KiB) accepted from stored metadata, 1 GiB
pub const MAX_ARGON2_MEMORY_KIB: u32 = 1 << 20;

/// Highest Argon2 pass count accepted from stored metadata
pub const MAX_ARGON2_TIME_COST: u32 = 16;

/// Highest Argon2 lane count accepted from stored metadata
pub const MAX_ARGON2_PARALLELISM: u32 = 16;

/// Key derivation function and its cost parameters
///
/// Serialized into the `.meta.json` sidecar so decrypt can re-derive with the
/// exact parameters used at encryption time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum KdfParams {
    #[serde(rename = "PBKDF2-SHA256")]
    Pbkdf2Sha256 { iterations: u32 },

    #[serde(rename = "Argon2id")]
    Argon2id {
        /// Memory cost in KiB
        memory_cost: u32,
        /// Number of passes
        time_cost: u32,
        /// Degree of parallelism
        parallelism: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::Pbkdf2Sha256 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Argon2id with 64 MiB memory, 3 passes, 4 lanes
    pub fn argon2id() -> Self {
        Self::Argon2id {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }

    /// Reject parameters too weak to be used for new uploads
    pub fn check_strength(&self) -> FinnestResult<()> {
        match self {
            Self::Pbkdf2Sha256 { iterations } if *iterations < MIN_PBKDF2_ITERATIONS => {
                Err(FinnestError::Config(format!(
                    "PBKDF2 iteration count {} is below the minimum of {}",
                    iterations, MIN_PBKDF2_ITERATIONS
                )))
            }
            Self::Argon2id { .. } => self.argon2_params().map(|_| ()),
            _ => Ok(()),
        }
    }

    /// Reject stored parameters that are malformed or too costly to honour
    ///
    /// Applied to the `kdf` block of a sidecar before deriving, so a tampered
    /// file fails fast as a decryption error.
    pub fn check_stored(&self) -> FinnestResult<()> {
        let in_bounds = match self {
            Self::Pbkdf2Sha256 { iterations } => (1..=MAX_PBKDF2_ITERATIONS).contains(iterations),
            Self::Argon2id {
                memory_cost,
                time_cost,
                parallelism,
            } => {
                *memory_cost <= MAX_ARGON2_MEMORY_KIB
                    && *time_cost <= MAX_ARGON2_TIME_COST
                    && *parallelism <= MAX_ARGON2_PARALLELISM
                    && self.argon2_params().is_ok()
            }
        };
        if in_bounds {
            Ok(())
        } else {
            Err(FinnestError::Decryption(format!(
                "unsupported key derivation parameters ({})",
                self.describe()
            )))
        }
    }

    /// Human-readable description for status output
    pub fn describe(&self) -> String {
        match self {
            Self::Pbkdf2Sha256 { iterations } => {
                format!("PBKDF2-HMAC-SHA256, {} iterations", iterations)
            }
            Self::Argon2id {
                memory_cost,
                time_cost,
                parallelism,
            } => format!(
                "Argon2id, {} KiB, {} passes, {} lanes",
                memory_cost, time_cost, parallelism
            ),
        }
    }

    fn argon2_params(&self) -> FinnestResult<Params> {
        match self {
            Self::Argon2id {
                memory_cost,
                time_cost,
                parallelism,
            } => Params::new(*memory_cost, *time_cost, *parallelism, Some(KEY_LEN))
                .map_err(|e| FinnestError::Config(format!("Invalid Argon2 parameters: {}", e))),
            Self::Pbkdf2Sha256 { .. } => Err(FinnestError::Config(
                "Not an Argon2 parameter set".to_string(),
            )),
        }
    }
}

/// A derived encryption key, zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes
    pub fn from_bytes(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

/// Derive an encryption key from a passphrase and salt
pub fn derive_key(passphrase: &str, salt: &[u8], params: &KdfParams) -> FinnestResult<DerivedKey> {
    if salt.is_empty() {
        return Err(FinnestError::Encryption("Empty salt".to_string()));
    }

    let mut key = [0u8; KEY_LEN];
    match params {
        KdfParams::Pbkdf2Sha256 { iterations } => {
            if *iterations == 0 {
                return Err(FinnestError::Encryption(
                    "PBKDF2 iteration count must be positive".to_string(),
                ));
            }
            pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, *iterations, &mut key);
        }
        KdfParams::Argon2id { .. } => {
            let argon2 = Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                params
                    .argon2_params()
                    .map_err(|e| FinnestError::Encryption(e.to_string()))?,
            );
            argon2
                .hash_password_into(passphrase.as_bytes(), salt, &mut key)
                .map_err(|e| FinnestError::Encryption(format!("Key derivation failed: {}", e)))?;
        }
    }

    Ok(DerivedKey::from_bytes(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KdfParams {
        KdfParams::Pbkdf2Sha256 { iterations: 1000 }
    }

    #[test]
    fn test_same_inputs_same_key() {
        let salt = [7u8; 16];
        let key1 = derive_key("test_passphrase", &salt, &fast()).unwrap();
        let key2 = derive_key("test_passphrase", &salt, &fast()).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let salt = [7u8; 16];
        let key1 = derive_key("passphrase1", &salt, &fast()).unwrap();
        let key2 = derive_key("passphrase2", &salt, &fast()).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key("same_passphrase", &[1u8; 16], &fast()).unwrap();
        let key2 = derive_key("same_passphrase", &[2u8; 16], &fast()).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_pbkdf2_known_vector() {
        // RFC 7914 section 11 PBKDF2-HMAC-SHA256 vector, first 32 bytes
        let key = derive_key(
            "passwd",
            b"salt",
            &KdfParams::Pbkdf2Sha256 { iterations: 1 },
        )
        .unwrap();
        let expected: [u8; 32] = [
            0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f, 0xec, 0x16, 0x91, 0xc2, 0x25, 0x44,
            0xb6, 0x05, 0xf9, 0x41, 0x85, 0x21, 0x6d, 0xde, 0x04, 0x65, 0xe6, 0x8b, 0x9d, 0x57,
            0xc2, 0x0d, 0xac, 0xbc,
        ];
        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn test_argon2id_derivation() {
        let params = KdfParams::Argon2id {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        };
        let key1 = derive_key("passphrase", &[3u8; 16], &params).unwrap();
        let key2 = derive_key("passphrase", &[3u8; 16], &params).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
        assert_ne!(
            key1.as_bytes(),
            derive_key("passphrase", &[3u8; 16], &fast()).unwrap().as_bytes()
        );
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = derive_key("p", &[1u8; 16], &KdfParams::Pbkdf2Sha256 { iterations: 0 });
        assert!(err.is_err());
    }

    #[test]
    fn test_strength_policy() {
        assert!(KdfParams::default().check_strength().is_ok());
        assert!(KdfParams::argon2id().check_strength().is_ok());
        assert!(fast().check_strength().is_err());
    }

    #[test]
    fn test_kdf_params_serde_tag() {
        let json = serde_json::to_value(KdfParams::default()).unwrap();
        assert_eq!(json["name"], "PBKDF2-SHA256");
        assert_eq!(json["iterations"], 120_000);

        let parsed: KdfParams = serde_json::from_str(
            r#"{"name":"Argon2id","memory_cost":65536,"time_cost":3,"parallelism":4}"#,
        )
        .unwrap();
        assert_eq!(parsed, KdfParams::argon2id());
    }
}
