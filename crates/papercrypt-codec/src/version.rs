//! Format generations and their header layouts
//!
//! Each generation owns its field-name constants and line width. The version
//! token read from a document is classified exactly once; the parser then
//! dispatches on the resulting [`FormatVersion`].

/// Version string written into newly produced documents.
pub const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Field holding the producing tool's version; read before a generation is known.
pub const VERSION_FIELD: &str = "PaperCrypt Version";

/// Header field names of the first format generation (no `Data Format`).
pub mod v1 {
    pub const VERSION: &str = super::VERSION_FIELD;
    pub const SERIAL: &str = "Content Serial";
    pub const PURPOSE: &str = "Purpose";
    pub const COMMENT: &str = "Comment";
    pub const DATE: &str = "Date";
    pub const CONTENT_LENGTH: &str = "Content Length";
    pub const CONTENT_CRC24: &str = "Content CRC-24";
    pub const CONTENT_CRC32: &str = "Content CRC-32";
    pub const CONTENT_SHA256: &str = "Content SHA-256";
    pub const HEADER_CRC32: &str = "Header CRC-32";

    pub const BYTES_PER_LINE: usize = 22;
}

/// Header field names of the current format generation.
pub mod v2 {
    pub const VERSION: &str = super::VERSION_FIELD;
    pub const SERIAL: &str = "Content Serial";
    pub const PURPOSE: &str = "Purpose";
    pub const COMMENT: &str = "Comment";
    pub const DATE: &str = "Date";
    pub const DATA_FORMAT: &str = "Data Format";
    pub const CONTENT_LENGTH: &str = "Content Length";
    pub const CONTENT_CRC24: &str = "Content CRC-24";
    pub const CONTENT_CRC32: &str = "Content CRC-32";
    pub const CONTENT_SHA256: &str = "Content SHA-256";
    pub const HEADER_CRC32: &str = "Header CRC-32";

    pub const BYTES_PER_LINE: usize = 24;
}

/// Field names and body geometry shared by the parsing steps of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub version: &'static str,
    pub serial: &'static str,
    pub purpose: &'static str,
    pub comment: &'static str,
    pub date: &'static str,
    /// Absent in generations where every body is an encrypted message
    pub data_format: Option<&'static str>,
    pub content_length: &'static str,
    pub content_crc24: &'static str,
    pub content_crc32: &'static str,
    pub content_sha256: &'static str,
    pub header_crc32: &'static str,
    pub bytes_per_line: usize,
}

pub const LAYOUT_V1: Layout = Layout {
    version: v1::VERSION,
    serial: v1::SERIAL,
    purpose: v1::PURPOSE,
    comment: v1::COMMENT,
    date: v1::DATE,
    data_format: None,
    content_length: v1::CONTENT_LENGTH,
    content_crc24: v1::CONTENT_CRC24,
    content_crc32: v1::CONTENT_CRC32,
    content_sha256: v1::CONTENT_SHA256,
    header_crc32: v1::HEADER_CRC32,
    bytes_per_line: v1::BYTES_PER_LINE,
};

pub const LAYOUT_V2: Layout = Layout {
    version: v2::VERSION,
    serial: v2::SERIAL,
    purpose: v2::PURPOSE,
    comment: v2::COMMENT,
    date: v2::DATE,
    data_format: Some(v2::DATA_FORMAT),
    content_length: v2::CONTENT_LENGTH,
    content_crc24: v2::CONTENT_CRC24,
    content_crc32: v2::CONTENT_CRC32,
    content_sha256: v2::CONTENT_SHA256,
    header_crc32: v2::HEADER_CRC32,
    bytes_per_line: v2::BYTES_PER_LINE,
};

/// A format generation, classified from a document's version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// 1.x: body is always an encrypted message, upgraded on read
    Major1,
    /// 2.x: current format
    Major2,
    /// Unreleased builds, read as the current format
    Devel,
    /// Anything else
    Unknown,
}

impl FormatVersion {
    /// Classify a version string such as `2.0.1`, `v1.0.0` or `devel`.
    pub fn classify(version: &str) -> Self {
        let version = version.trim();
        if version == "devel" || version == "(devel)" {
            return FormatVersion::Devel;
        }
        let version = version.strip_prefix('v').unwrap_or(version);
        match version.split('.').next().unwrap_or_default() {
            "1" => FormatVersion::Major1,
            "2" => FormatVersion::Major2,
            "devel" => FormatVersion::Devel,
            _ => FormatVersion::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FormatVersion::Unknown)
    }

    /// Layout used to read documents of this generation.
    ///
    /// Unknown versions fall back to the current layout.
    pub fn layout(&self) -> &'static Layout {
        match self {
            FormatVersion::Major1 => &LAYOUT_V1,
            FormatVersion::Major2 | FormatVersion::Devel | FormatVersion::Unknown => &LAYOUT_V2,
        }
    }
}
