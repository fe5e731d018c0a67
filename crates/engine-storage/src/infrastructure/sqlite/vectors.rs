//! Embedding vectors are stored as length-prefixed little-endian `f32` blobs
//! (spec §4.B): a `u32` element count followed by that many 4-byte floats.

use crate::error::StorageError;

pub fn encode_vector(values: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + values.len() * 4);
    buf.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

pub fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>, StorageError> {
    if bytes.len() < 4 {
        return Err(StorageError::serialization("vector blob shorter than length prefix"));
    }
    let len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    let rest = &bytes[4..];
    if rest.len() != len * 4 {
        return Err(StorageError::serialization(format!(
            "vector blob length mismatch: header says {len} elements, found {} bytes",
            rest.len()
        )));
    }
    Ok(rest.chunks_exact(4).map(|c| f32::from_le_bytes(c.try_into().unwrap())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_vector() {
        let v = vec![0.1_f32, -0.5, 1.0, 0.0];
        let encoded = encode_vector(&v);
        let decoded = decode_vector(&encoded).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn round_trips_empty_vector() {
        let encoded = encode_vector(&[]);
        assert_eq!(decode_vector(&encoded).unwrap(), Vec::<f32>::new());
    }

    #[test]
    fn rejects_truncated_blob() {
        let mut encoded = encode_vector(&[1.0, 2.0]);
        encoded.truncate(encoded.len() - 1);
        assert!(decode_vector(&encoded).is_err());
    }
}
