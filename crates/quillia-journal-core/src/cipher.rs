//! Text encryption collaborator abstraction
//!
//! Journal text is encrypted at rest by an external service; this core
//! only needs the two operations. Callers that may encounter legacy
//! plaintext rows catch `decrypt` failures and fall back to the raw
//! string.

/// Error from the encryption collaborator
#[derive(Debug, Clone, thiserror::Error)]
#[error("cipher error: {0}")]
pub struct CipherError(pub String);

/// Text encryption collaborator
pub trait TextCipher: Send + Sync {
    /// Encrypt plaintext for storage
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    /// Decrypt stored ciphertext
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

/// Identity cipher for tests and environments without encryption
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextCipher;

impl TextCipher for PlaintextCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        Ok(plaintext.to_string())
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        Ok(ciphertext.to_string())
    }
}
