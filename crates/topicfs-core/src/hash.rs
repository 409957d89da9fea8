//! Content-identity digests.
//!
//! The file "checksum" surfaced to callers is a digest of per-chunk hash
//! metadata, not of the literal file bytes: the ordered `(offset, hash)`
//! list is stable-sorted by offset, stripped of duplicate offsets (first
//! occurrence wins), JSON-serialized, and SHA-512 digested. Old and new
//! implementations must keep this exact pipeline for checksum comparisons
//! to keep matching.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

/// Chunk granularity the upload collaborator hashes at.
pub const CHUNK_PART_SIZE: i64 = 131_072;

/// Hash of one uploaded chunk, as reported by the remote service.
///
/// The serialized form is pinned to the wire shape older checksums were
/// computed over: capitalized field names and standard-base64 hash bytes.
/// Changing it would silently break checksum comparison against digests
/// stored by earlier releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChunkHash {
    pub offset: i64,
    pub limit: i32,
    #[serde(with = "base64_bytes")]
    pub hash: Vec<u8>,
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Digest an unordered list of chunk hashes into one content identity.
pub fn digest_chunk_hashes(mut chunks: Vec<ChunkHash>) -> Vec<u8> {
    // Stable sort, so for duplicate offsets the first-seen entry survives.
    chunks.sort_by_key(|chunk| chunk.offset);
    chunks.dedup_by_key(|chunk| chunk.offset);

    let serialized = serde_json::to_vec(&chunks).unwrap_or_default();
    Sha512::digest(&serialized).to_vec()
}

/// Hex form of [`digest_chunk_hashes`].
pub fn digest_hex(chunks: Vec<ChunkHash>) -> String {
    to_hex(&digest_chunk_hashes(chunks))
}

/// Placeholder identity for an object: a digest of its absolute path.
///
/// Content identity is deliberately opaque here; the real per-chunk digest
/// only exists once the upload collaborator has transferred the bytes.
pub fn placeholder_object_id(absolute: &str) -> String {
    to_hex(&Sha256::digest(absolute.as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(offset: i64, fill: u8) -> ChunkHash {
        ChunkHash {
            offset,
            limit: CHUNK_PART_SIZE as i32,
            hash: vec![fill; 32],
        }
    }

    #[test]
    fn test_digest_is_order_independent() {
        let forward = digest_chunk_hashes(vec![chunk(0, 1), chunk(131_072, 2), chunk(262_144, 3)]);
        let shuffled = digest_chunk_hashes(vec![chunk(262_144, 3), chunk(0, 1), chunk(131_072, 2)]);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_duplicate_offsets_are_removed() {
        let plain = digest_chunk_hashes(vec![chunk(0, 1), chunk(131_072, 2)]);
        let with_duplicates =
            digest_chunk_hashes(vec![chunk(0, 1), chunk(0, 1), chunk(131_072, 2)]);
        assert_eq!(plain, with_duplicates);
    }

    #[test]
    fn test_digest_is_sensitive_to_chunk_content() {
        let one = digest_chunk_hashes(vec![chunk(0, 1)]);
        let other = digest_chunk_hashes(vec![chunk(0, 9)]);
        assert_ne!(one, other);
    }

    #[test]
    fn test_digest_hex_width() {
        // SHA-512 digest: 64 bytes, 128 hex characters.
        assert_eq!(digest_hex(vec![chunk(0, 1)]).len(), 128);
    }

    #[test]
    fn test_serialized_form_matches_legacy_checksum_input() {
        let chunks = vec![ChunkHash {
            offset: 0,
            limit: CHUNK_PART_SIZE as i32,
            hash: vec![0xaa; 4],
        }];
        // Capitalized keys and base64 hash bytes, the exact bytes older
        // digests were computed over.
        assert_eq!(
            serde_json::to_string(&chunks).unwrap(),
            r#"[{"Offset":0,"Limit":131072,"Hash":"qqqqqg=="}]"#
        );

        let parsed: Vec<ChunkHash> =
            serde_json::from_str(r#"[{"Offset":0,"Limit":131072,"Hash":"qqqqqg=="}]"#).unwrap();
        assert_eq!(parsed, chunks);
    }

    #[test]
    fn test_placeholder_id_is_stable() {
        let a = placeholder_object_id("/root/a/file.txt");
        let b = placeholder_object_id("/root/a/file.txt");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, placeholder_object_id("/root/a/other.txt"));
    }
}
