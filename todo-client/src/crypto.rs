//! Encryption envelope for the shared change log.
//!
//! This module provides:
//! - Pluggable passphrase key derivation ([`KeyDerivation`])
//!   - [`Argon2idKdf`]: Argon2id with fixed cost, the default
//!   - [`Sha256Kdf`]: one SHA-256 pass, weak, kept for interop experiments only
//! - XChaCha20-Poly1305 sealing of whole files as `nonce || ciphertext`
//!
//! # Security Notes
//!
//! - XChaCha20 uses 192-bit nonces (24 bytes), safe for random generation
//! - The KDF salt is a fixed domain tag so the file format carries nothing
//!   but the nonce and ciphertext; the same passphrase always yields the same key
//! - Key bytes are zeroed on drop and never printed

use std::io;
use std::path::Path;
use std::str::FromStr;

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::fs::{atomic_write, read_or_empty};

/// Nonce size for XChaCha20-Poly1305 (192 bits = 24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Key size for XChaCha20-Poly1305 (256 bits = 32 bytes).
pub const KEY_SIZE: usize = 32;

const ARGON2_SALT: &[u8] = b"todosync-envelope-argon2id-v1";
const SHA256_TAG: &[u8] = b"todosync-envelope-sha256-v1";

/// Crypto errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed: wrong passphrase, truncated or tampered file.
    #[error("decryption failed: wrong passphrase or corrupt file")]
    DecryptionFailed,

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// Reading or writing an envelope file failed.
    #[error("envelope I/O: {0}")]
    Io(#[from] io::Error),
}

/// Argon2id cost parameters.
///
/// Every replica sharing a remote log must use the same parameters, since the
/// envelope carries no header to record them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    memory_mib: u32,
    iterations: u32,
    parallelism: u32,
}

impl Argon2Params {
    /// 19 MiB, 2 iterations, 1 lane.
    pub const STANDARD: Self = Self {
        memory_mib: 19,
        iterations: 2,
        parallelism: 1,
    };

    /// Custom parameters.
    pub fn new(memory_mib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_mib,
            iterations,
            parallelism,
        }
    }

    /// Get memory in MiB.
    pub fn memory_mib(&self) -> u32 {
        self.memory_mib
    }

    /// Get iteration count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn to_argon2_params(self) -> Result<Params, CryptoError> {
        Params::new(
            self.memory_mib * 1024, // MiB -> KiB
            self.iterations,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))
    }
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Symmetric key for the envelope cipher.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EnvelopeKey([u8; KEY_SIZE]);

impl EnvelopeKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Random key (for testing).
    pub fn random() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_SIZE];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

// Don't leak the key in debug output
impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EnvelopeKey([REDACTED])")
    }
}

/// Turns a passphrase into an [`EnvelopeKey`].
pub trait KeyDerivation: Send + Sync {
    /// Short name, as written in configuration.
    fn name(&self) -> &'static str;

    /// Derive the key. Must be deterministic for a given passphrase.
    fn derive_key(&self, passphrase: &str) -> Result<EnvelopeKey, CryptoError>;
}

/// Argon2id over a fixed domain salt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2idKdf {
    params: Argon2Params,
}

impl Argon2idKdf {
    /// Use explicit parameters. Both replicas must agree on them.
    pub fn with_params(params: Argon2Params) -> Self {
        Self { params }
    }
}

impl KeyDerivation for Argon2idKdf {
    fn name(&self) -> &'static str {
        "argon2id"
    }

    fn derive_key(&self, passphrase: &str) -> Result<EnvelopeKey, CryptoError> {
        let argon2 = Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            self.params.to_argon2_params()?,
        );
        let mut key = EnvelopeKey([0u8; KEY_SIZE]);
        argon2
            .hash_password_into(passphrase.as_bytes(), ARGON2_SALT, &mut key.0)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
        Ok(key)
    }
}

/// A single SHA-256 over a domain tag and the passphrase.
///
/// Offers no resistance to offline guessing. Every use logs a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Kdf;

impl KeyDerivation for Sha256Kdf {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn derive_key(&self, passphrase: &str) -> Result<EnvelopeKey, CryptoError> {
        tracing::warn!("sha256 key derivation is weak; prefer kdf = \"argon2id\"");
        let mut hasher = Sha256::new();
        hasher.update(SHA256_TAG);
        hasher.update(passphrase.as_bytes());
        let mut key = EnvelopeKey([0u8; KEY_SIZE]);
        key.0.copy_from_slice(&hasher.finalize());
        Ok(key)
    }
}

/// Configurable choice of KDF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KdfKind {
    /// [`Argon2idKdf`] with [`Argon2Params::STANDARD`].
    #[default]
    Argon2id,
    /// [`Sha256Kdf`].
    Sha256,
}

impl KdfKind {
    /// Instantiate the KDF.
    pub fn build(self) -> Box<dyn KeyDerivation> {
        match self {
            KdfKind::Argon2id => Box::new(Argon2idKdf::default()),
            KdfKind::Sha256 => Box::new(Sha256Kdf),
        }
    }
}

impl FromStr for KdfKind {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "argon2id" => Ok(KdfKind::Argon2id),
            "sha256" => Ok(KdfKind::Sha256),
            other => Err(CryptoError::KeyDerivationFailed(format!(
                "unknown kdf {other:?} (expected \"argon2id\" or \"sha256\")"
            ))),
        }
    }
}

/// Seals and opens change-log files with one key.
#[derive(Debug, Clone)]
pub struct Envelope {
    key: EnvelopeKey,
}

impl Envelope {
    /// Use an existing key.
    pub fn new(key: EnvelopeKey) -> Self {
        Self { key }
    }

    /// Derive the key from `passphrase` with `kdf`.
    pub fn from_passphrase(
        passphrase: &str,
        kdf: &dyn KeyDerivation,
    ) -> Result<Self, CryptoError> {
        tracing::debug!(kdf = kdf.name(), "deriving envelope key");
        Ok(Self::new(kdf.derive_key(passphrase)?))
    }

    fn cipher(&self) -> Result<XChaCha20Poly1305, CryptoError> {
        XChaCha20Poly1305::new_from_slice(self.key.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
    }

    /// Encrypt to `nonce || ciphertext` with a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        let ciphertext = self
            .cipher()?
            .encrypt(XNonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| CryptoError::EncryptionFailed("aead encrypt failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt `nonce || ciphertext`.
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < NONCE_SIZE {
            return Err(CryptoError::DecryptionFailed);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        self.cipher()?
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Encrypt the file at `src` and atomically replace `dst` with the result.
    pub async fn encrypt_file(&self, src: &Path, dst: &Path) -> Result<(), CryptoError> {
        let plaintext = tokio::fs::read(src).await?;
        let sealed = self.seal(&plaintext)?;
        atomic_write(dst, sealed).await?;
        Ok(())
    }

    /// Decrypt the file at `src` into `dst`.
    ///
    /// A missing or empty `src` (nothing synced yet) gives an empty `dst`.
    pub async fn decrypt_file(&self, src: &Path, dst: &Path) -> Result<(), CryptoError> {
        let sealed = read_or_empty(src).await?;
        let plaintext = if sealed.is_empty() {
            Vec::new()
        } else {
            self.open(&sealed)?
        };
        tokio::fs::write(dst, plaintext).await?;
        Ok(())
    }
}
