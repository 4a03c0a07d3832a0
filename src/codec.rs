//! Text-safe serialization of effect state.
//!
//! Effect state travels as a base64 string: either the raw bytes of an
//! opaque bank chunk, or the little-endian byte image of the ordered
//! normalized parameter vector. `decode(encode(x)) == x` holds
//! byte-for-byte for any input.

use crate::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded)?)
}

/// Byte image of an ordered parameter vector, little-endian f32s.
pub fn params_to_bytes(params: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(params.len() * 4);
    for value in params {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Inverse of [`params_to_bytes`]. Trailing bytes that do not complete a
/// value are ignored; the caller validates the element count against the
/// effect's declared parameter count.
pub fn bytes_to_params(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_arbitrary_bytes() {
        let cases: &[&[u8]] = &[
            b"",
            b"\x00",
            b"\xff\xfe\xfd",
            b"plain ascii state",
            &[0u8, 255, 1, 254, 2, 253, 127, 128],
        ];
        for &case in cases {
            assert_eq!(decode(&encode(case)).unwrap(), case);
        }
    }

    #[test]
    fn test_roundtrip_large_chunk() {
        let chunk: Vec<u8> = (0..1 << 16).map(|i| (i * 31 % 251) as u8).collect();
        assert_eq!(decode(&encode(&chunk)).unwrap(), chunk);
    }

    #[test]
    fn test_encoded_is_text_safe() {
        let encoded = encode(&[0, 10, 13, 200, 255]);
        assert!(encoded.chars().all(|c| c.is_ascii_graphic()));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not*base64!").is_err());
    }

    #[test]
    fn test_param_bytes_roundtrip() {
        let params = [0.0f32, 0.25, 0.5, 0.99999, 1.0];
        let bytes = params_to_bytes(&params);
        assert_eq!(bytes.len(), params.len() * 4);
        assert_eq!(bytes_to_params(&bytes), params);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = params_to_bytes(&[0.5, 0.75]);
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(bytes_to_params(&bytes), vec![0.5, 0.75]);
    }

    #[test]
    fn test_empty_params() {
        assert!(params_to_bytes(&[]).is_empty());
        assert!(bytes_to_params(&[]).is_empty());
    }
}
