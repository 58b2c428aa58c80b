//! gzip compression for document payloads
//!
//! The encoder writes a fixed header (no filename, mtime 0), so equal input
//! always produces an equal stream.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{CryptoError, CryptoResult};

/// gzip-compress `data` at the default level.
pub fn gzip_compress(data: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data).map_err(CryptoError::Compress)?;
    encoder.finish().map_err(CryptoError::Compress)
}

/// Decompress a complete gzip stream.
pub fn gzip_decompress(data: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    GzDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(CryptoError::Decompress)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_trip_small() {
        let data = b"hello gzip";
        let packed = gzip_compress(data).unwrap();
        assert_eq!(&packed[..2], &[0x1f, 0x8b], "gzip magic");
        assert_eq!(gzip_decompress(&packed).unwrap(), data);
    }

    #[test]
    fn compression_is_deterministic() {
        let data: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
        assert_eq!(gzip_compress(&data).unwrap(), gzip_compress(&data).unwrap());
    }

    #[test]
    fn empty_input_round_trips() {
        let packed = gzip_compress(b"").unwrap();
        assert!(!packed.is_empty());
        assert!(gzip_decompress(&packed).unwrap().is_empty());
    }

    #[test]
    fn garbage_fails_to_decompress() {
        let result = gzip_decompress(b"definitely not gzip");
        assert!(matches!(result, Err(CryptoError::Decompress(_))));
    }

    proptest! {
        #[test]
        fn compress_decompress_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..=8192)) {
            let packed = gzip_compress(&data).unwrap();
            prop_assert_eq!(gzip_decompress(&packed).unwrap(), data);
        }
    }
}
