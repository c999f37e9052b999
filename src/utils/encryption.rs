//! Sealing of access tokens in the on-disk session file
//!
//! Sealed format, base64 encoded: `[version][nonce(12)][ciphertext + tag]`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::Aes256Gcm;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use thiserror::Error;

const FORMAT_VERSION: u8 = 0x01;
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid session key: {0}")]
    InvalidKey(String),
    #[error("Encryption failed: {0}")]
    Encryption(String),
    #[error("Decryption failed: {0}")]
    Decryption(String),
    #[error("Invalid sealed data: {0}")]
    InvalidData(String),
}

/// AES-256-GCM cipher keyed from `BAZAAR_SESSION_KEY`
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl SessionCipher {
    /// `key_hex` must be 64 hex characters (32 bytes)
    pub fn from_hex(key_hex: &str) -> Result<Self, CryptoError> {
        let key_bytes = hex::decode(key_hex.trim())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let key: [u8; 32] = key_bytes.try_into().map_err(|bytes: Vec<u8>| {
            CryptoError::InvalidKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;

        Ok(Self {
            cipher: Aes256Gcm::new(&key.into()),
        })
    }

    pub fn seal(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt((&nonce).into(), plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut sealed = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        sealed.push(FORMAT_VERSION);
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(sealed))
    }

    pub fn open(&self, sealed: &str) -> Result<String, CryptoError> {
        let data = BASE64
            .decode(sealed.trim())
            .map_err(|e| CryptoError::InvalidData(e.to_string()))?;

        if data.len() < 1 + NONCE_LEN {
            return Err(CryptoError::InvalidData("sealed data too short".to_string()));
        }
        if data[0] != FORMAT_VERSION {
            return Err(CryptoError::InvalidData(format!("unsupported version {}", data[0])));
        }

        let (nonce, ciphertext) = data[1..].split_at(NONCE_LEN);
        let nonce: [u8; NONCE_LEN] = nonce
            .try_into()
            .map_err(|_| CryptoError::InvalidData("bad nonce".to_string()))?;

        let plaintext = self
            .cipher
            .decrypt((&nonce).into(), ciphertext)
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::InvalidData(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn test_seal_and_open() {
        let cipher = SessionCipher::from_hex(KEY).unwrap();
        let sealed = cipher.seal("eyJhbGciOi.token").unwrap();

        assert_ne!(sealed, "eyJhbGciOi.token");
        assert_eq!(cipher.open(&sealed).unwrap(), "eyJhbGciOi.token");
    }

    #[test]
    fn test_nonce_differs_per_seal() {
        let cipher = SessionCipher::from_hex(KEY).unwrap();
        assert_ne!(cipher.seal("same").unwrap(), cipher.seal("same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails_to_open() {
        let sealed = SessionCipher::from_hex(KEY).unwrap().seal("secret").unwrap();
        let other = SessionCipher::from_hex(&"ab".repeat(32)).unwrap();

        assert!(matches!(other.open(&sealed), Err(CryptoError::Decryption(_))));
    }

    #[test]
    fn test_rejects_short_keys() {
        assert!(matches!(SessionCipher::from_hex("abcd"), Err(CryptoError::InvalidKey(_))));
        assert!(matches!(SessionCipher::from_hex("zz"), Err(CryptoError::InvalidKey(_))));
    }
}
