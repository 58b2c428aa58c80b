//! papercrypt-crypto: the encryption and compression collaborators of the
//! document codec
//!
//! Pipeline for an encrypted document payload:
//! ```text
//! plaintext → gzip → seal (Argon2id → HKDF-SHA256 → XChaCha20-Poly1305) → envelope bytes → gzip
//! ```
//!
//! The document layer only sees the [`MessageCipher`] trait, so another
//! cipher can be plugged in without touching the codec.

pub mod compress;
pub mod error;
pub mod kdf;
pub mod message;
pub mod phrase;

pub use compress::{gzip_compress, gzip_decompress};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{derive_key, KdfParams, MessageKey};
pub use message::{EncryptedMessage, MessageCipher, PassphraseCipher};
pub use phrase::{generate_passphrase, is_mnemonic};

/// Size of a message key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the per-message KDF salt
pub const SALT_SIZE: usize = 16;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;
