use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PaperError, PaperResult};
use crate::types::{HeaderStyle, HexCase, ParsePolicy};

/// Top-level configuration (loaded from papercrypt.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PapercryptConfig {
    pub log: LogConfig,
    pub render: RenderConfig,
    pub crypto: CryptoConfig,
    pub parse: ParsePolicy,
}

impl PapercryptConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> PaperResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| PaperError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> PaperResult<Self> {
        toml::from_str(content).map_err(|e| PaperError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> PaperResult<String> {
        toml::to_string(self).map_err(|e| PaperError::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

/// Output options for generated documents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Hex digit case in body lines and header checksums
    pub hex_case: HexCase,
    /// Header rendering: "plain" or "commented"
    pub header_style: HeaderStyle,
}

/// Passphrase encryption configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB)
    pub argon2_mem_cost_kib: u32,
    /// Argon2id time cost (iterations, default: 3)
    pub argon2_time_cost: u32,
    /// Argon2id parallelism (default: 4)
    pub argon2_parallelism: u32,
    /// Words in a generated BIP-39 passphrase (12, 15, 18, 21 or 24)
    pub passphrase_words: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            argon2_mem_cost_kib: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            passphrase_words: 24,
        }
    }
}
