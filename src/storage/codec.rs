//! Binary encoding of index packages.
//!
//! Layout (little endian):
//!
//! ```text
//! magic "QRPK" | version u32 | crc32 u32 | payload length u64 | bincode payload
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{QuarryError, Result};
use crate::index::package::IndexPackage;

/// File signature.
pub const MAGIC: &[u8; 4] = b"QRPK";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Serialize a package with header and checksum.
pub fn encode(package: &IndexPackage) -> Result<Vec<u8>> {
    let payload = bincode::serialize(package)
        .map_err(|e| QuarryError::storage(format!("Failed to serialize index package: {e}")))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    bytes.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
    bytes.write_u64::<LittleEndian>(payload.len() as u64)?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Validate the header and checksum, then deserialize the payload.
pub fn decode(bytes: &[u8]) -> Result<IndexPackage> {
    if bytes.len() < HEADER_LEN {
        return Err(QuarryError::corrupt(format!(
            "truncated header ({} bytes)",
            bytes.len()
        )));
    }
    if &bytes[..4] != MAGIC {
        return Err(QuarryError::corrupt("bad magic bytes"));
    }

    let mut header = &bytes[4..HEADER_LEN];
    let version = read_u32(&mut header)?;
    if version != FORMAT_VERSION {
        return Err(QuarryError::corrupt(format!(
            "unsupported format version {version}"
        )));
    }
    let checksum = read_u32(&mut header)?;
    let length = header
        .read_u64::<LittleEndian>()
        .map_err(|e| QuarryError::corrupt(format!("unreadable header: {e}")))?;

    let payload = &bytes[HEADER_LEN..];
    if payload.len() as u64 != length {
        return Err(QuarryError::corrupt(format!(
            "payload length {} does not match header length {length}",
            payload.len()
        )));
    }
    if crc32fast::hash(payload) != checksum {
        return Err(QuarryError::corrupt("checksum mismatch"));
    }

    bincode::deserialize(payload)
        .map_err(|e| QuarryError::corrupt(format!("Failed to deserialize index package: {e}")))
}

fn read_u32(header: &mut &[u8]) -> Result<u32> {
    header
        .read_u32::<LittleEndian>()
        .map_err(|e| QuarryError::corrupt(format!("unreadable header: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBuilder, IndexReader, TermKey};

    fn sample() -> IndexPackage {
        let docs = vec![vec!["alpha", "beta", "gamma"], vec!["beta", "alpha"]];
        IndexBuilder::build(&docs, Some(&[7, 3])).unwrap()
    }

    #[test]
    fn test_preserves_key_arity_and_statistics() {
        let package = sample();
        let decoded = decode(&encode(&package).unwrap()).unwrap();

        assert_eq!(decoded, package);
        assert_eq!(decoded.posting_list(&TermKey::term("alpha")), &[3, 7]);
        assert_eq!(decoded.posting_list(&["alpha", "beta"].into()), &[7]);
        assert!(decoded
            .posting_list(&TermKey::Phrase(vec!["alpha".into()]))
            .is_empty());
        assert_eq!(decoded.metadata.avgdl, Some(2.5));
    }

    #[test]
    fn test_rejects_damaged_input() {
        let bytes = encode(&sample()).unwrap();

        let err = decode(&bytes[..10]).unwrap_err();
        assert!(matches!(err, QuarryError::Corrupt(_)));

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(matches!(decode(&bad_magic), Err(QuarryError::Corrupt(_))));

        let mut flipped = bytes.clone();
        let last = flipped.len() - 1;
        flipped[last] ^= 0xff;
        assert!(matches!(decode(&flipped), Err(QuarryError::Corrupt(_))));

        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(decode(truncated), Err(QuarryError::Corrupt(_))));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[4] = 99;
        let err = decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("unsupported format version"));
    }
}
