//! BIP-39 passphrase generation
//!
//! A generated passphrase is a BIP-39 mnemonic: easy to write next to the
//! printed document (or store separately) and checksummed, so a mistyped
//! word is caught before an expensive KDF run.

use bip39::Mnemonic;
use rand::RngCore;
use secrecy::SecretString;

use crate::error::{CryptoError, CryptoResult};

/// Word counts BIP-39 defines
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Generate a new BIP-39 mnemonic of `words` words.
///
/// 12 words carry 128 bits of entropy, 24 words 256 bits.
pub fn generate_passphrase(words: usize) -> CryptoResult<SecretString> {
    if !VALID_WORD_COUNTS.contains(&words) {
        return Err(CryptoError::Mnemonic(format!(
            "unsupported word count {words} (expected one of {VALID_WORD_COUNTS:?})"
        )));
    }

    // 32 bits of entropy per 3 words
    let mut entropy = vec![0u8; words / 3 * 4];
    rand::thread_rng().fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| CryptoError::Mnemonic(format!("generation failed: {e}")))?;

    Ok(SecretString::from(mnemonic.to_string()))
}

/// Whether `words` is a valid BIP-39 mnemonic (word list and checksum).
pub fn is_mnemonic(words: &str) -> bool {
    words.parse::<Mnemonic>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_generate_24_words() {
        let phrase = generate_passphrase(24).unwrap();
        let words = phrase.expose_secret();

        assert_eq!(words.split_whitespace().count(), 24);
        assert!(is_mnemonic(words));
    }

    #[test]
    fn test_generate_12_words() {
        let phrase = generate_passphrase(12).unwrap();
        assert_eq!(phrase.expose_secret().split_whitespace().count(), 12);
    }

    #[test]
    fn test_invalid_word_count() {
        assert!(matches!(
            generate_passphrase(13),
            Err(CryptoError::Mnemonic(_))
        ));
    }

    #[test]
    fn test_not_a_mnemonic() {
        assert!(!is_mnemonic("not a valid mnemonic at all"));
    }

    #[test]
    fn test_different_phrases() {
        let a = generate_passphrase(24).unwrap();
        let b = generate_passphrase(24).unwrap();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }
}
