//! Body line codec: bytes ⇄ numbered, checksummed hex lines
//!
//! Line format:
//! ```text
//!  1: 1F 8B 08 00 00 00 00 00 00 FF 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 8E2F1A
//!  2: 0F 10 11 12 13 14 15 16 17 18 19 1A 1B 1C 1D 1E 1F 20 21 22 23 24 25 26 1D6B44
//!  3: 27 28 29 C3B0F2
//!  4: 5A9E01
//! ```
//!
//! Every data line ends with the CRC-24 of its own bytes; the final line holds
//! only the CRC-24 of the whole block. Line numbers are right-aligned to the
//! width of the last number. Lines may be fed back in any order.

use papercrypt_core::HexCase;

use crate::checksum::crc24;
use crate::error::LineError;

/// One decoded data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based position in the block
    pub number: usize,
    pub data: Vec<u8>,
    /// CRC-24 of `data`
    pub crc24: u32,
}

enum ParsedLine {
    Data(Line),
    Block { number: usize, crc24: u32 },
}

/// Render `data` as body lines of at most `bytes_per_line` bytes each.
///
/// The result has no trailing newline.
pub fn encode_lines(data: &[u8], bytes_per_line: usize, case: HexCase) -> String {
    let bytes_per_line = bytes_per_line.max(1);
    let data_lines = data.len().div_ceil(bytes_per_line);
    let width = (data_lines + 1).to_string().len();

    // "NN: " + "XX " per byte + 6-digit CRC + newline
    let mut out = String::with_capacity(data_lines * (width + 2 + bytes_per_line * 3 + 7) + width + 8);

    for (i, chunk) in data.chunks(bytes_per_line).enumerate() {
        out.push_str(&format!("{:>width$}: ", i + 1));
        for &byte in chunk {
            out.push_str(&format_hex(byte as u32, 2, case));
            out.push(' ');
        }
        out.push_str(&format_hex(crc24(chunk), 6, case));
        out.push('\n');
    }

    out.push_str(&format!("{:>width$}: ", data_lines + 1));
    out.push_str(&format_hex(crc24(data), 6, case));
    out
}

/// Reassemble the block from body lines, inferring the line width from line 1.
pub fn decode_lines(text: &str) -> Result<Vec<u8>, LineError> {
    decode_lines_capped(text, None)
}

/// Like [`decode_lines`], additionally rejecting lines wider than `max_bytes_per_line`.
pub fn decode_lines_capped(
    text: &str,
    max_bytes_per_line: Option<usize>,
) -> Result<Vec<u8>, LineError> {
    let entries: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if entries.is_empty() {
        return Err(LineError::NoLines);
    }

    let mut lines = Vec::with_capacity(entries.len());
    let mut block: Option<(usize, u32)> = None;
    for entry in entries {
        match parse_line(entry)? {
            ParsedLine::Data(line) => lines.push(line),
            ParsedLine::Block { number, crc24 } => {
                if let Some((first, _)) = block {
                    return Err(LineError::MultipleBlockChecksums {
                        first,
                        second: number,
                    });
                }
                block = Some((number, crc24));
            }
        }
    }

    if lines.is_empty() {
        return Err(LineError::NoLines);
    }
    let (block_number, block_crc) = block.ok_or(LineError::MissingBlockChecksum)?;

    // Sorting first makes duplicates adjacent and accepts out-of-order entry
    lines.sort_by_key(|l| l.number);

    for pair in lines.windows(2) {
        if pair[0].number == pair[1].number {
            return Err(LineError::DuplicateLine(pair[0].number));
        }
    }
    for (i, line) in lines.iter().enumerate() {
        if line.number != i + 1 {
            return Err(LineError::NonContiguous {
                expected: i + 1,
                found: line.number,
            });
        }
    }
    if block_number != lines.len() + 1 {
        return Err(LineError::NonContiguous {
            expected: lines.len() + 1,
            found: block_number,
        });
    }

    let inferred = lines[0].data.len();
    let max = max_bytes_per_line.map_or(inferred, |cap| cap.min(inferred));
    if let Some(line) = lines.iter().find(|l| l.data.len() > max) {
        return Err(LineError::TooLong {
            number: line.number,
            found: line.data.len(),
            max,
        });
    }

    let mut data = Vec::with_capacity(lines.len() * inferred);
    for line in &lines {
        data.extend_from_slice(&line.data);
    }

    let actual = crc24(&data);
    if actual != block_crc {
        return Err(LineError::BlockChecksum {
            expected: block_crc,
            actual,
        });
    }

    Ok(data)
}

fn parse_line(entry: &str) -> Result<ParsedLine, LineError> {
    let malformed = |reason: String| LineError::Malformed {
        line: entry.to_string(),
        reason,
    };

    let (number, value) = entry
        .split_once(": ")
        .ok_or_else(|| malformed("missing ': ' separator".into()))?;
    let number: usize = number
        .trim()
        .parse()
        .map_err(|_| malformed(format!("'{}' is not a line number", number.trim())))?;
    if number == 0 {
        return Err(malformed("line numbers start at 1".into()));
    }

    let tokens: Vec<&str> = value.split(' ').filter(|t| !t.is_empty()).collect();
    let (checksum, bytes) = tokens
        .split_last()
        .ok_or_else(|| malformed("no checksum".into()))?;
    let recorded = parse_crc24(checksum)
        .ok_or_else(|| malformed(format!("'{checksum}' is not a 6-digit hex checksum")))?;

    if bytes.is_empty() {
        return Ok(ParsedLine::Block {
            number,
            crc24: recorded,
        });
    }

    let data = bytes
        .iter()
        .map(|token| {
            parse_hex_byte(token).ok_or_else(|| malformed(format!("'{token}' is not a hex byte")))
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let actual = crc24(&data);
    if actual != recorded {
        return Err(LineError::LineChecksum {
            number,
            expected: recorded,
            actual,
        });
    }

    Ok(ParsedLine::Data(Line {
        number,
        data,
        crc24: recorded,
    }))
}

fn parse_crc24(token: &str) -> Option<u32> {
    if token.len() != 6 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(token, 16).ok()
}

fn parse_hex_byte(token: &str) -> Option<u8> {
    if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}

/// Zero-padded hex of `value` in the requested case.
pub(crate) fn format_hex(value: u32, digits: usize, case: HexCase) -> String {
    match case {
        HexCase::Upper => format!("{value:0digits$X}"),
        HexCase::Lower => format!("{value:0digits$x}"),
    }
}
