//! Passphrase-encrypted message envelope
//!
//! Envelope format (binary):
//! ```text
//! [4 bytes: magic "PCM1"]
//! [4 bytes: Argon2id mem_cost_kib, BE][4 bytes: time_cost, BE][4 bytes: parallelism, BE]
//! [16 bytes: salt]
//! [24 bytes: XChaCha20 nonce]
//! [N bytes: ciphertext][16 bytes: Poly1305 tag]
//! AAD = magic || params || salt
//! ```
//!
//! The KDF parameters travel with the message so a document printed today
//! stays decryptable if the defaults change later.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use secrecy::SecretString;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{derive_key, KdfParams};
use crate::{NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// Envelope magic and format revision
pub const MAGIC: &[u8; 4] = b"PCM1";

/// Bytes covered by the AAD: magic, three u32 params, salt
const HEADER_LEN: usize = 4 + 12 + SALT_SIZE;

/// Upper bound on the Argon2id memory cost accepted from an envelope (4 GiB).
const MAX_MEM_COST_KIB: u32 = 4 * 1024 * 1024;

/// Encrypt/decrypt capability used by the document layer.
pub trait MessageCipher {
    fn encrypt(&self, passphrase: &SecretString, plaintext: &[u8]) -> CryptoResult<EncryptedMessage>;

    fn decrypt(&self, message: &EncryptedMessage, passphrase: &SecretString) -> CryptoResult<Vec<u8>>;
}

/// A sealed message: KDF parameters, salt, nonce and authenticated ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    params: KdfParams,
    salt: [u8; SALT_SIZE],
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

impl EncryptedMessage {
    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Ciphertext including the trailing Poly1305 tag
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Serialize to the binary envelope format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + NONCE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.header_bytes());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse a binary envelope. Does not decrypt.
    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        let minimum = HEADER_LEN + NONCE_SIZE + TAG_SIZE;
        if data.len() < minimum {
            return Err(CryptoError::Envelope(format!(
                "too short: {} bytes (minimum {minimum})",
                data.len()
            )));
        }
        if &data[..4] != MAGIC {
            return Err(CryptoError::Envelope("bad magic".into()));
        }

        let params = KdfParams {
            mem_cost_kib: read_u32(&data[4..8]),
            time_cost: read_u32(&data[8..12]),
            parallelism: read_u32(&data[12..16]),
        };
        if params.mem_cost_kib > MAX_MEM_COST_KIB {
            return Err(CryptoError::Envelope(format!(
                "memory cost {} KiB exceeds limit",
                params.mem_cost_kib
            )));
        }

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&data[16..HEADER_LEN]);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&data[HEADER_LEN..HEADER_LEN + NONCE_SIZE]);

        Ok(Self {
            params,
            salt,
            nonce,
            ciphertext: data[HEADER_LEN + NONCE_SIZE..].to_vec(),
        })
    }

    fn header_bytes(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[..4].copy_from_slice(MAGIC);
        header[4..8].copy_from_slice(&self.params.mem_cost_kib.to_be_bytes());
        header[8..12].copy_from_slice(&self.params.time_cost.to_be_bytes());
        header[12..16].copy_from_slice(&self.params.parallelism.to_be_bytes());
        header[16..].copy_from_slice(&self.salt);
        header
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}

/// Default cipher: Argon2id + HKDF-SHA256 → XChaCha20-Poly1305.
#[derive(Debug, Clone, Default)]
pub struct PassphraseCipher {
    params: KdfParams,
}

impl PassphraseCipher {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }
}

impl MessageCipher for PassphraseCipher {
    fn encrypt(&self, passphrase: &SecretString, plaintext: &[u8]) -> CryptoResult<EncryptedMessage> {
        let mut salt = [0u8; SALT_SIZE];
        let mut nonce = [0u8; NONCE_SIZE];
        let mut rng = rand::thread_rng();
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut nonce);

        let mut message = EncryptedMessage {
            params: self.params,
            salt,
            nonce,
            ciphertext: Vec::new(),
        };

        tracing::debug!(
            mem_cost_kib = self.params.mem_cost_kib,
            time_cost = self.params.time_cost,
            parallelism = self.params.parallelism,
            "deriving message key"
        );
        let key = derive_key(passphrase, &salt, &self.params)?;
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
        let aad = message.header_bytes();

        message.ciphertext = cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

        tracing::debug!(
            plaintext = plaintext.len(),
            ciphertext = message.ciphertext.len(),
            "message sealed"
        );
        Ok(message)
    }

    fn decrypt(&self, message: &EncryptedMessage, passphrase: &SecretString) -> CryptoResult<Vec<u8>> {
        let key = derive_key(passphrase, &message.salt, &message.params)?;
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
        let aad = message.header_bytes();

        cipher
            .decrypt(
                XNonce::from_slice(&message.nonce),
                Payload {
                    msg: &message.ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|_| CryptoError::Decrypt)
    }
}
