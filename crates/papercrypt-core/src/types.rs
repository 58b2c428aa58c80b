use serde::{Deserialize, Serialize};

/// What a document body carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    /// Encrypted message wrapping gzip-compressed plaintext
    #[serde(rename = "PGP")]
    Pgp,
    /// gzip-compressed plaintext, no encryption
    #[serde(rename = "Raw")]
    Raw,
}

impl DataFormat {
    /// Tag written in the `Data Format` header field and the JSON `f` key
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Pgp => "PGP",
            DataFormat::Raw => "Raw",
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PGP" | "pgp" => Ok(DataFormat::Pgp),
            "Raw" | "raw" | "RAW" => Ok(DataFormat::Raw),
            other => Err(format!("unknown data format '{other}'")),
        }
    }
}

/// Letter case for hex digits in body lines and header checksums
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexCase {
    #[default]
    Upper,
    Lower,
}

/// How header lines are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    /// `Key: Value`
    #[default]
    Plain,
    /// `# Key: Value`, as embedded in printed pages
    Commented,
}

/// Which problems a parser may downgrade from errors to warnings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsePolicy {
    /// Header CRC-32 and content CRC-24/CRC-32/SHA-256 mismatches become warnings
    pub ignore_checksum_mismatch: bool,
    /// Missing or unsupported versions are parsed as the current format
    pub ignore_version_mismatch: bool,
}

impl ParsePolicy {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self {
            ignore_checksum_mismatch: true,
            ignore_version_mismatch: true,
        }
    }
}
