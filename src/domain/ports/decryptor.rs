//! Decryption port for secure config values.

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised by a [`Decryptor`] implementation.
#[derive(Error, Debug)]
pub enum DecryptionError {
    /// Ciphertext was not a valid base64 blob.
    #[error("Ciphertext is not valid base64: {0}")]
    InvalidCiphertext(#[from] base64::DecodeError),

    /// Transport-level failure talking to the decryption service.
    #[error("Decryption request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The decryption service rejected the request.
    #[error("Decryption service returned {status}: {message}")]
    Service { status: u16, message: String },

    /// The service answered with a body the client could not interpret.
    #[error("Decryption service response was malformed: {0}")]
    MalformedResponse(String),

    /// The decrypted plaintext was not valid UTF-8.
    #[error("Decrypted plaintext is not valid UTF-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

/// A service able to turn an opaque ciphertext blob back into plaintext.
///
/// One blocking call per secure node at resolution time. The core never
/// retries; a single failed decryption aborts the whole load.
pub trait Decryptor {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptionError>;
}

/// Mock decryptor backed by a fixture map, for tests.
#[derive(Debug, Default)]
pub struct MockDecryptor {
    plaintexts: HashMap<String, String>,
}

impl MockDecryptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ciphertext and the plaintext it decrypts to.
    pub fn with_mapping(mut self, ciphertext: &str, plaintext: &str) -> Self {
        self.plaintexts
            .insert(ciphertext.to_string(), plaintext.to_string());
        self
    }
}

impl Decryptor for MockDecryptor {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptionError> {
        self.plaintexts
            .get(ciphertext)
            .cloned()
            .ok_or_else(|| DecryptionError::Service {
                status: 400,
                message: format!("no fixture plaintext for ciphertext '{ciphertext}'"),
            })
    }
}
