//! Content digest

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Compute the SHA-256 content digest of data as lowercase hex
pub fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Whether `value` has the shape of a content digest
pub fn is_valid_digest(value: &str) -> bool {
    value.len() == DIGEST_HEX_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            compute_digest(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_empty_input_has_digest() {
        assert_eq!(
            compute_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_deterministic() {
        let data = b"same bytes, same digest";
        assert_eq!(compute_digest(data), compute_digest(data));
        assert_ne!(compute_digest(data), compute_digest(b"other bytes"));
    }

    #[test]
    fn test_is_valid_digest() {
        assert!(is_valid_digest(&compute_digest(b"x")));
        assert!(!is_valid_digest("abc"));
        assert!(!is_valid_digest(&compute_digest(b"x").to_uppercase()));
        assert!(!is_valid_digest(&"g".repeat(DIGEST_HEX_LEN)));
    }
}
