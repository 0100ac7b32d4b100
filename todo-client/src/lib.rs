//! # todo-client
//!
//! Storage, encryption and synchronisation for todosync replicas.
//!
//! This is the I/O half of the workspace: it reads and writes the files that
//! `todo-core` reasons about.
//!
//! ## Features
//!
//! - **Change logs**: append-only newline-delimited JSON, synced to disk on append
//! - **Encryption envelope**: XChaCha20-Poly1305 over the shared log, pluggable KDF
//!   (Argon2id by default)
//! - **Store abstraction**: files on disk or in memory for tests
//! - **Orchestrator**: one call runs decrypt, merge, checkpoint rotation,
//!   re-encrypt and local save in a safe order
//!
//! ## Example
//!
//! ```ignore
//! use todo_client::{Envelope, FileStore, KdfKind, TodoSync};
//!
//! let store = FileStore::in_dir(&data_dir);
//! let envelope = Envelope::from_passphrase(&passphrase, KdfKind::Argon2id.build().as_ref())?;
//! let summary = TodoSync::new(store, Some(remote_path))
//!     .with_envelope(envelope)
//!     .sync()
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backlog;
pub mod crypto;
mod fs;
pub mod store;
pub mod sync;

pub use backlog::LogError;
pub use crypto::{
    Argon2Params, Argon2idKdf, CryptoError, Envelope, EnvelopeKey, KdfKind, KeyDerivation,
    Sha256Kdf, KEY_SIZE, NONCE_SIZE,
};
pub use store::{FileStore, MemoryStore, Store, StoreError, StorePaths};
pub use sync::{SyncError, SyncSummary, TodoSync};
