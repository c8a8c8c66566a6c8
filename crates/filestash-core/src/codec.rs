//! Binary <-> text codec
//!
//! The substrate only stores strings, so every payload is kept as padded
//! standard base64. Decoding is strict: anything outside the alphabet, or
//! with bad padding, is reported as a [`CodecError`]. Payloads also carry
//! a SHA-256 [`checksum`] so decoded bytes can be checked against it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors raised when stored text cannot be turned back into bytes
#[derive(Error, Debug)]
pub enum CodecError {
    /// Text is not valid padded base64
    #[error("Stored payload is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
}

/// Encode raw bytes into their text-safe form
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode text produced by [`encode`] back into the original bytes
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    Ok(STANDARD.decode(text)?)
}

/// SHA-256 of a payload as lowercase hex
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Length of the decoded payload without decoding it
///
/// Returns `None` if `text` is not a well-formed padded base64 length.
pub fn decoded_len(text: &str) -> Option<usize> {
    let len = text.len();
    if len % 4 != 0 {
        return None;
    }
    let padding = text.bytes().rev().take_while(|&b| b == b'=').count();
    if padding > 2 {
        return None;
    }
    Some(len / 4 * 3 - padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_every_byte_value_survives() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        let text = encode(&bytes);

        assert!(text.is_ascii());
        assert_eq!(decode(&text).unwrap(), bytes);
        assert_eq!(decoded_len(&text), Some(256));
    }

    #[test]
    fn test_odd_lengths_survive() {
        for len in [1usize, 2, 3, 4, 5, 1023] {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
            let text = encode(&bytes);
            assert_eq!(decode(&text).unwrap(), bytes, "length {}", len);
            assert_eq!(decoded_len(&text), Some(len));
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode(b"hello world"), encode(b"hello world"));
        assert_eq!(encode(b"hello world"), "aGVsbG8gd29ybGQ=");
    }

    #[test]
    fn test_malformed_text_is_rejected() {
        assert!(matches!(
            decode("not*base64!"),
            Err(CodecError::InvalidEncoding(_))
        ));
        assert!(decode("abc").is_err());
        assert_eq!(decoded_len("abc"), None);
    }

    #[test]
    fn test_checksum_is_sha256_hex() {
        assert_eq!(
            checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
