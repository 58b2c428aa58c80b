//! Checksums used by the document format
//!
//! - CRC-24 (OpenPGP polynomial) per body line and over the whole body
//! - CRC-32 (IEEE) over the header and the payload
//! - SHA-256 over the payload

use sha2::{Digest, Sha256};

/// CRC-24 generator polynomial (x^24 term implicit)
pub const CRC24_POLY: u32 = 0x86_4CFB;

/// CRC-24 initial register value
pub const CRC24_INIT: u32 = 0xB7_04CE;

const CRC24_MASK: u32 = 0xFF_FFFF;

/// Lookup table for byte-at-a-time CRC-24, built at compile time.
static CRC24_TABLE: [u32; 256] = build_crc24_table();

const fn build_crc24_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 16;
        let mut bit = 0;
        while bit < 8 {
            crc <<= 1;
            if crc & 0x100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
            bit += 1;
        }
        table[i] = crc & CRC24_MASK;
        i += 1;
    }
    table
}

/// CRC-24 of `data` (init 0xB704CE, no final xor).
pub fn crc24(data: &[u8]) -> u32 {
    data.iter().fold(CRC24_INIT, |crc, &byte| {
        let index = (((crc >> 16) ^ byte as u32) & 0xFF) as usize;
        ((crc << 8) ^ CRC24_TABLE[index]) & CRC24_MASK
    })
}

/// CRC-32 (IEEE) of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

pub fn validate_crc24(data: &[u8], expected: u32) -> bool {
    crc24(data) == expected
}

pub fn validate_crc32(data: &[u8], expected: u32) -> bool {
    crc32(data) == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn crc24_check_value() {
        assert_eq!(crc24(b"123456789"), 0x21CF02);
    }

    #[test]
    fn crc24_empty_is_init() {
        assert_eq!(crc24(b""), CRC24_INIT);
    }

    #[test]
    fn crc24_known_sequence() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        let crc = crc24(&data);
        assert_eq!(crc, 0x5D2CAC);
        assert!(validate_crc24(&data, crc));

        let mut mutated = data;
        mutated[0] = 0xAB;
        assert_eq!(crc24(&mutated), 0x537708);
        assert!(!validate_crc24(&mutated, crc));
    }

    #[test]
    fn crc24_fits_in_24_bits() {
        assert_eq!(CRC24_TABLE[0], 0);
        assert!(CRC24_TABLE.iter().all(|&v| v <= CRC24_MASK));
    }

    #[test]
    fn crc32_check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF43926);
        assert!(validate_crc32(b"123456789", 0xCBF43926));
        assert!(!validate_crc32(b"123456780", 0xCBF43926));
    }

    #[test]
    fn sha256_empty() {
        let digest = sha256(b"");
        assert_eq!(digest[..4], [0xe3, 0xb0, 0xc4, 0x42]);
    }

    proptest! {
        #[test]
        fn crc24_matches_bitwise_reference(data in proptest::collection::vec(any::<u8>(), 0..=512)) {
            let mut reference = CRC24_INIT;
            for &byte in &data {
                reference ^= (byte as u32) << 16;
                for _ in 0..8 {
                    reference <<= 1;
                    if reference & 0x100_0000 != 0 {
                        reference ^= 0x186_4CFB;
                    }
                }
            }
            prop_assert_eq!(crc24(&data), reference & CRC24_MASK);
        }

        #[test]
        fn crc24_detects_single_bit_flips(
            data in proptest::collection::vec(any::<u8>(), 1..=256),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let original = crc24(&data);
            let mut flipped = data.clone();
            let i = index.index(flipped.len());
            flipped[i] ^= 1 << bit;
            prop_assert!(!validate_crc24(&flipped, original));
        }
    }
}
