//! Crypto capability used by the document transform
//!
//! The transform never touches a global RNG or cipher directly; it asks a
//! [`CryptoProvider`] so platform-native implementations can be swapped in.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};

use crate::error::{FinnestError, FinnestResult};

use super::key_derivation::{self, DerivedKey, KdfParams};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Random source, key derivation and authenticated cipher
pub trait CryptoProvider: Send + Sync {
    /// Fill a fresh buffer from a cryptographically secure source
    fn random_bytes(&self, len: usize) -> FinnestResult<Vec<u8>>;

    /// Stretch a passphrase into a 256-bit key
    fn derive_key(&self, passphrase: &str, salt: &[u8], params: &KdfParams)
        -> FinnestResult<DerivedKey>;

    /// Seal `plaintext`; the authentication tag is appended to the output
    fn encrypt(&self, key: &DerivedKey, iv: &[u8], plaintext: &[u8]) -> FinnestResult<Vec<u8>>;

    /// Open `ciphertext`; fails if the tag does not verify
    fn decrypt(&self, key: &DerivedKey, iv: &[u8], ciphertext: &[u8]) -> FinnestResult<Vec<u8>>;
}

/// Default provider backed by the RustCrypto crates and the OS RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    fn cipher(key: &DerivedKey) -> FinnestResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| FinnestError::Encryption(format!("Failed to create cipher: {}", e)))
    }
}

impl CryptoProvider for RustCryptoProvider {
    fn random_bytes(&self, len: usize) -> FinnestResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| FinnestError::Encryption(format!("Random source failed: {}", e)))?;
        Ok(buf)
    }

    fn derive_key(
        &self,
        passphrase: &str,
        salt: &[u8],
        params: &KdfParams,
    ) -> FinnestResult<DerivedKey> {
        key_derivation::derive_key(passphrase, salt, params)
    }

    fn encrypt(&self, key: &DerivedKey, iv: &[u8], plaintext: &[u8]) -> FinnestResult<Vec<u8>> {
        if iv.len() != NONCE_SIZE {
            return Err(FinnestError::Encryption(format!(
                "Invalid nonce size: expected {}, got {}",
                NONCE_SIZE,
                iv.len()
            )));
        }
        Self::cipher(key)?
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|e| FinnestError::Encryption(format!("Encryption failed: {}", e)))
    }

    fn decrypt(&self, key: &DerivedKey, iv: &[u8], ciphertext: &[u8]) -> FinnestResult<Vec<u8>> {
        if iv.len() != NONCE_SIZE {
            return Err(FinnestError::Decryption(format!(
                "Invalid nonce size: expected {}, got {}",
                NONCE_SIZE,
                iv.len()
            )));
        }
        Self::cipher(key)?
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| FinnestError::wrong_passphrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(fill: u8) -> DerivedKey {
        DerivedKey::from_bytes([fill; 32])
    }

    #[test]
    fn test_random_bytes_len_and_freshness() {
        let provider = RustCryptoProvider;
        let a = provider.random_bytes(16).unwrap();
        let b = provider.random_bytes(16).unwrap();
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_encrypt_decrypt() {
        let provider = RustCryptoProvider;
        let key = test_key(1);
        let iv = [9u8; NONCE_SIZE];

        let sealed = provider.encrypt(&key, &iv, b"Hello, World!").unwrap();
        // 16-byte GCM tag is appended
        assert_eq!(sealed.len(), 13 + 16);

        let opened = provider.decrypt(&key, &iv, &sealed).unwrap();
        assert_eq!(opened, b"Hello, World!");
    }

    #[test]
    fn test_wrong_key_is_decryption_error() {
        let provider = RustCryptoProvider;
        let iv = [9u8; NONCE_SIZE];
        let sealed = provider.encrypt(&test_key(1), &iv, b"secret").unwrap();

        let err = provider.decrypt(&test_key(2), &iv, &sealed).unwrap_err();
        assert!(err.is_decryption());
    }

    #[test]
    fn test_bad_nonce_length_rejected() {
        let provider = RustCryptoProvider;
        let err = provider.encrypt(&test_key(1), &[0u8; 8], b"x").unwrap_err();
        assert!(matches!(err, FinnestError::Encryption(_)));
    }
}
