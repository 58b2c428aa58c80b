//! Header codec: ordered `Key: Value` lines closed by a CRC-32 line
//!
//! The checksum covers every header line before it, each terminated by `\n`.
//! Headers embedded in printed pages carry a `# ` prefix on every line; the
//! prefix is not part of the checksummed text.

use papercrypt_core::{HeaderStyle, HexCase};

use crate::checksum::crc32;
use crate::error::ParseError;
use crate::lines::format_hex;

const COMMENT_PREFIX: &str = "# ";

/// Render header `fields` in order, followed by the `crc_field` checksum line.
///
/// The result has no trailing newline.
pub fn render_header(
    fields: &[(&str, String)],
    crc_field: &str,
    style: HeaderStyle,
    case: HexCase,
) -> String {
    let covered: String = fields
        .iter()
        .map(|(key, value)| format!("{key}: {value}\n"))
        .collect();
    let checksum = format!("{crc_field}: {}", format_hex(crc32(covered.as_bytes()), 8, case));

    match style {
        HeaderStyle::Plain => covered + &checksum,
        HeaderStyle::Commented => {
            let mut out = String::with_capacity(covered.len() + checksum.len() + 3 * (fields.len() + 1));
            for line in covered.lines().chain(std::iter::once(checksum.as_str())) {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(COMMENT_PREFIX);
                out.push_str(line);
            }
            out
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    key: String,
    value: String,
    /// The line exactly as received
    raw: String,
}

/// A parsed header section. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    entries: Vec<HeaderEntry>,
    style: HeaderStyle,
}

impl Header {
    /// Parse the text preceding the header/body separator.
    pub fn parse(section: &str) -> Result<Self, ParseError> {
        let mut entries = Vec::new();

        for (index, line) in section.split('\n').enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = match line.split_once(": ") {
                Some(kv) => kv,
                None => match line.trim_end().strip_suffix(':') {
                    Some(key) => (key, ""),
                    None => {
                        return Err(ParseError::MalformedHeaderLine {
                            line: index + 1,
                            content: line.to_string(),
                        })
                    }
                },
            };
            let key = key.strip_prefix(COMMENT_PREFIX).unwrap_or(key).trim();

            entries.push(HeaderEntry {
                key: key.to_string(),
                value: value.to_string(),
                raw: line.to_string(),
            });
        }

        let style = if !entries.is_empty() && entries.iter().all(|e| e.raw.starts_with(COMMENT_PREFIX)) {
            HeaderStyle::Commented
        } else {
            HeaderStyle::Plain
        };

        Ok(Self { entries, style })
    }

    pub fn style(&self) -> HeaderStyle {
        self.style
    }

    /// Value of the first field named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    pub fn require(&self, key: &'static str) -> Result<&str, ParseError> {
        self.get(key).ok_or(ParseError::MissingField(key))
    }

    /// Fields in the order they appeared.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|e| (e.key.as_str(), e.value.as_str()))
    }

    /// CRC-32 over every line except the `crc_field` line, using the
    /// convention matching how the header was rendered.
    pub fn checksum(&self, crc_field: &str) -> u32 {
        let covered = match self.style {
            HeaderStyle::Plain => self.plain_checksum_input(crc_field),
            HeaderStyle::Commented => self.commented_checksum_input(crc_field),
        };
        crc32(covered.as_bytes())
    }

    /// Lines byte-for-byte as received.
    fn plain_checksum_input(&self, crc_field: &str) -> String {
        self.entries
            .iter()
            .filter(|e| e.key != crc_field)
            .map(|e| format!("{}\n", e.raw))
            .collect()
    }

    /// Lines with the page-embedding prefix removed.
    fn commented_checksum_input(&self, crc_field: &str) -> String {
        self.entries
            .iter()
            .filter(|e| e.key != crc_field)
            .map(|e| {
                let line = e.raw.strip_prefix(COMMENT_PREFIX).unwrap_or(&e.raw);
                format!("{line}\n")
            })
            .collect()
    }
}
