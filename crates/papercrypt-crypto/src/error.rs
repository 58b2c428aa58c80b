use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("gzip compression failed: {0}")]
    Compress(#[source] std::io::Error),

    #[error("gzip decompression failed: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("decryption failed: wrong passphrase or corrupted message")]
    Decrypt,

    #[error("invalid message envelope: {0}")]
    Envelope(String),

    #[error("invalid mnemonic: {0}")]
    Mnemonic(String),
}
