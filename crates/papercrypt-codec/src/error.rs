use papercrypt_crypto::CryptoError;
use thiserror::Error;

/// Coarse classification of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The input cannot be interpreted at all
    Structural,
    /// A recorded checksum does not match the data it covers
    Integrity,
    /// The document was produced by a format generation this build cannot read
    Version,
}

/// Failures of the body line codec.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("no lines found")]
    NoLines,

    #[error("malformed line '{line}': {reason}")]
    Malformed { line: String, reason: String },

    #[error("line {number} carries {found} bytes, more than the {max} allowed")]
    TooLong { number: usize, found: usize, max: usize },

    #[error("invalid line checksum on line {number}: recorded {expected:06X}, computed {actual:06X}")]
    LineChecksum { number: usize, expected: u32, actual: u32 },

    #[error("block checksum line missing")]
    MissingBlockChecksum,

    #[error("more than one block checksum line (lines {first} and {second})")]
    MultipleBlockChecksums { first: usize, second: usize },

    #[error("duplicate line number {0}")]
    DuplicateLine(usize),

    #[error("non-contiguous line numbers: expected line {expected}, found line {found}")]
    NonContiguous { expected: usize, found: usize },

    #[error("invalid block checksum: recorded {expected:06X}, computed {actual:06X}")]
    BlockChecksum { expected: u32, actual: u32 },
}

impl LineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            LineError::LineChecksum { .. } | LineError::BlockChecksum { .. } => {
                ErrorClass::Integrity
            }
            _ => ErrorClass::Structural,
        }
    }
}

/// Construction-time violations of the document invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("{field} must not contain line breaks")]
    MultilineField { field: &'static str },
}

/// Failures while turning text or JSON into a [`crate::Document`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("header/body separator not found")]
    MissingSeparator,

    #[error("malformed header line {line}: '{content}'")]
    MalformedHeaderLine { line: usize, content: String },

    #[error("missing header field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value '{value}' for '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("body: {0}")]
    Body(#[from] LineError),

    #[error("content length mismatch: header declares '{declared}', body holds {actual} bytes")]
    LengthMismatch { declared: String, actual: usize },

    #[error("{field} mismatch: recorded {expected}, computed {actual}")]
    ChecksumMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("missing version")]
    MissingVersion,

    #[error("unsupported version '{0}'")]
    UnsupportedVersion(String),

    #[error("invalid document: {0}")]
    Document(#[from] DocumentError),

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("upgrading legacy document failed: {0}")]
    Upgrade(#[source] CryptoError),
}

impl ParseError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ParseError::ChecksumMismatch { .. } => ErrorClass::Integrity,
            ParseError::MissingVersion | ParseError::UnsupportedVersion(_) => ErrorClass::Version,
            ParseError::Body(e) => e.class(),
            _ => ErrorClass::Structural,
        }
    }
}

/// A problem that a [`papercrypt_core::ParsePolicy`] downgraded from an error.
#[derive(Debug)]
pub enum ParseWarning {
    /// Checksum-class field was missing, unreadable, or mismatched
    Checksum(ParseError),
    /// Version missing or unsupported; parsed as the current format
    Version(ParseError),
}

impl ParseWarning {
    pub fn error(&self) -> &ParseError {
        match self {
            ParseWarning::Checksum(e) | ParseWarning::Version(e) => e,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::Checksum(e) => write!(f, "ignored checksum problem: {e}"),
            ParseWarning::Version(e) => write!(f, "ignored version problem: {e}"),
        }
    }
}

/// Failures while producing a new document from plaintext.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("compression failed: {0}")]
    Compress(#[source] CryptoError),

    #[error("encryption failed: {0}")]
    Encrypt(#[source] CryptoError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Failures while recovering plaintext from a valid document.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("a passphrase is required to decode an encrypted document")]
    PassphraseRequired,

    #[error("decompression failed: {0}")]
    Decompress(#[source] CryptoError),

    #[error("invalid encrypted message: {0}")]
    Message(#[source] CryptoError),

    #[error("decryption failed: {0}")]
    Decrypt(#[source] CryptoError),
}
