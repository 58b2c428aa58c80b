//! papercrypt-codec: the printable container format
//!
//! # Overview
//! - `checksum`: CRC-24 (OpenPGP parameters), CRC-32 and SHA-256
//! - `lines`: payload bytes as numbered hex lines, each with its own CRC-24
//! - `header`: `Key: Value` header section closed by a CRC-32 line
//! - `version`: format generations and their field layouts
//! - `document`: the in-memory document, sealing and decoding
//! - `parser`: whole-document text form
//! - `json`: compact JSON form
//!
//! The codec performs no I/O and never logs; problems a [`ParsePolicy`]
//! allows are returned as [`ParseWarning`]s next to the parsed document.

pub mod checksum;
pub mod document;
pub mod error;
pub mod header;
pub mod json;
pub mod lines;
pub mod parser;
pub mod serial;
pub mod version;

pub use checksum::{crc24, crc32, sha256, validate_crc24, validate_crc32};
pub use document::{format_timestamp, parse_timestamp, Document, Metadata, TIMESTAMP_FORMAT};
pub use error::{
    DecodeError, DocumentError, ErrorClass, LineError, ParseError, ParseWarning, SealError,
};
pub use json::parse_json;
pub use lines::{decode_lines, decode_lines_capped, encode_lines, Line};
pub use parser::{parse_any, parse_document, ParsedDocument, RenderOptions, SEPARATOR};
pub use serial::generate_serial;
pub use version::{FormatVersion, FORMAT_VERSION};

pub use papercrypt_core::{DataFormat, HeaderStyle, HexCase, ParsePolicy};
