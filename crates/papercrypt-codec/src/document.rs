//! The in-memory document
//!
//! A [`Document`] always carries checksums derived from its own payload, so
//! it is self-consistent by construction. Mismatches can only come from
//! parsed input and are reported by the parser.

use chrono::{DateTime, FixedOffset, Local};
use papercrypt_core::DataFormat;
use papercrypt_crypto::{gzip_compress, gzip_decompress, EncryptedMessage, MessageCipher};
use secrecy::SecretString;

use crate::checksum::{crc24, crc32, sha256};
use crate::error::{DecodeError, DocumentError, SealError};
use crate::serial::generate_serial;
use crate::version::FORMAT_VERSION;

/// Long timestamp format, e.g. `2024-03-01 14:05:09.123456789 +0100`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f %z";

pub fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse the long format, falling back to RFC 3339 and RFC 2822.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, String> {
    let value = value.trim();
    DateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map_err(|e| format!("unrecognized timestamp: {e}"))
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Descriptive fields of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub serial_number: String,
    pub purpose: String,
    pub comment: String,
    pub created_at: DateTime<FixedOffset>,
}

impl Metadata {
    /// Metadata stamped with the local time and a fresh serial.
    pub fn now(purpose: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            serial_number: generate_serial(),
            purpose: purpose.into(),
            comment: comment.into(),
            created_at: DateTime::<FixedOffset>::from(Local::now()),
        }
    }

    fn validate(&self) -> Result<(), DocumentError> {
        for (field, value) in [
            ("serial number", &self.serial_number),
            ("purpose", &self.purpose),
            ("comment", &self.comment),
        ] {
            if value.contains(is_line_break) {
                return Err(DocumentError::MultilineField { field });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    format_version: String,
    data_format: DataFormat,
    metadata: Metadata,
    payload: Vec<u8>,
    payload_crc24: u32,
    payload_crc32: u32,
    payload_sha256: [u8; 32],
}

impl Document {
    /// Build a document around `payload`, deriving its checksums.
    pub fn new(
        format_version: impl Into<String>,
        data_format: DataFormat,
        metadata: Metadata,
        payload: Vec<u8>,
    ) -> Result<Self, DocumentError> {
        let format_version = format_version.into();
        if payload.is_empty() {
            return Err(DocumentError::EmptyPayload);
        }
        if format_version.contains(is_line_break) {
            return Err(DocumentError::MultilineField {
                field: "format version",
            });
        }
        metadata.validate()?;

        Ok(Self {
            payload_crc24: crc24(&payload),
            payload_crc32: crc32(&payload),
            payload_sha256: sha256(&payload),
            format_version,
            data_format,
            metadata,
            payload,
        })
    }

    /// Compress and encrypt `plaintext` into a new PGP-format document.
    ///
    /// Payload layout: `gzip(envelope(gzip(plaintext)))`.
    pub fn seal<C: MessageCipher + ?Sized>(
        cipher: &C,
        passphrase: &SecretString,
        plaintext: &[u8],
        metadata: Metadata,
    ) -> Result<Self, SealError> {
        let compressed = gzip_compress(plaintext).map_err(SealError::Compress)?;
        let message = cipher
            .encrypt(passphrase, &compressed)
            .map_err(SealError::Encrypt)?;
        let payload = gzip_compress(&message.to_bytes()).map_err(SealError::Compress)?;

        Ok(Self::new(FORMAT_VERSION, DataFormat::Pgp, metadata, payload)?)
    }

    /// Compress `plaintext` into a new unencrypted document.
    pub fn seal_raw(plaintext: &[u8], metadata: Metadata) -> Result<Self, SealError> {
        let payload = gzip_compress(plaintext).map_err(SealError::Compress)?;
        Ok(Self::new(FORMAT_VERSION, DataFormat::Raw, metadata, payload)?)
    }

    /// Recover the original plaintext. Never mutates the document.
    ///
    /// `passphrase` is only consulted for PGP-format documents.
    pub fn decode<C: MessageCipher + ?Sized>(
        &self,
        cipher: &C,
        passphrase: Option<&SecretString>,
    ) -> Result<Vec<u8>, DecodeError> {
        let unpacked = gzip_decompress(&self.payload).map_err(DecodeError::Decompress)?;

        match self.data_format {
            DataFormat::Raw => Ok(unpacked),
            DataFormat::Pgp => {
                let passphrase = passphrase.ok_or(DecodeError::PassphraseRequired)?;
                let message = EncryptedMessage::from_bytes(&unpacked).map_err(DecodeError::Message)?;
                let decrypted = cipher
                    .decrypt(&message, passphrase)
                    .map_err(DecodeError::Decrypt)?;
                gzip_decompress(&decrypted).map_err(DecodeError::Decompress)
            }
        }
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    pub fn data_format(&self) -> DataFormat {
        self.data_format
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn serial_number(&self) -> &str {
        &self.metadata.serial_number
    }

    pub fn purpose(&self) -> &str {
        &self.metadata.purpose
    }

    pub fn comment(&self) -> &str {
        &self.metadata.comment
    }

    pub fn created_at(&self) -> &DateTime<FixedOffset> {
        &self.metadata.created_at
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_crc24(&self) -> u32 {
        self.payload_crc24
    }

    pub fn payload_crc32(&self) -> u32 {
        self.payload_crc32
    }

    pub fn payload_sha256(&self) -> &[u8; 32] {
        &self.payload_sha256
    }
}
