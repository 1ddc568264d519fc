//! Wrapped-entry codec.
//!
//! A stored entry is a single little-endian blob:
//! `expire_at: u64 | hash: u64 | key_len: u16 | key | value`.
//! The redundant hash copy lets the sweeper clean the index without a
//! reverse mapping. Inputs are trusted; only this crate writes blobs.

const TIMESTAMP_SIZE: usize = 8;
const HASH_SIZE: usize = 8;
const KEY_LEN_SIZE: usize = 2;

const HEADER_SIZE: usize = TIMESTAMP_SIZE + HASH_SIZE + KEY_LEN_SIZE;

pub(crate) fn wrap_entry(expire_at: u64, hash: u64, key: &[u8], value: &[u8]) -> Box<[u8]> {
    debug_assert!(key.len() <= u16::MAX as usize);
    let mut blob = Vec::with_capacity(HEADER_SIZE + key.len() + value.len());
    blob.extend_from_slice(&expire_at.to_le_bytes());
    blob.extend_from_slice(&hash.to_le_bytes());
    blob.extend_from_slice(&(key.len() as u16).to_le_bytes());
    blob.extend_from_slice(key);
    blob.extend_from_slice(value);
    blob.into_boxed_slice()
}

pub(crate) fn read_expire_at(blob: &[u8]) -> u64 {
    u64::from_le_bytes(blob[..TIMESTAMP_SIZE].try_into().unwrap())
}

pub(crate) fn read_hash(blob: &[u8]) -> u64 {
    u64::from_le_bytes(
        blob[TIMESTAMP_SIZE..TIMESTAMP_SIZE + HASH_SIZE]
            .try_into()
            .unwrap(),
    )
}

fn read_key_len(blob: &[u8]) -> usize {
    u16::from_le_bytes(
        blob[TIMESTAMP_SIZE + HASH_SIZE..HEADER_SIZE]
            .try_into()
            .unwrap(),
    ) as usize
}

pub(crate) fn read_key(blob: &[u8]) -> &[u8] {
    &blob[HEADER_SIZE..HEADER_SIZE + read_key_len(blob)]
}

pub(crate) fn read_value(blob: &[u8]) -> &[u8] {
    &blob[HEADER_SIZE + read_key_len(blob)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let blob = wrap_entry(1_700_000_000, 0xdead_beef_cafe_f00d, b"asong", b"value");
        assert_eq!(blob.len(), HEADER_SIZE + 5 + 5);
        assert_eq!(read_expire_at(&blob), 1_700_000_000);
        assert_eq!(read_hash(&blob), 0xdead_beef_cafe_f00d);
        assert_eq!(read_key(&blob), b"asong");
        assert_eq!(read_value(&blob), b"value");
    }

    #[test]
    fn empty_value() {
        let blob = wrap_entry(7, 42, b"key", b"");
        assert_eq!(blob.len(), HEADER_SIZE + 3);
        assert_eq!(read_key(&blob), b"key");
        assert_eq!(read_value(&blob), b"");
    }

    #[test]
    fn non_ascii_key() {
        let key = "公众号".as_bytes();
        let blob = wrap_entry(1, 2, key, b"v");
        assert_eq!(read_key(&blob), key);
        assert_eq!(read_value(&blob), b"v");
    }

    #[test]
    fn header_is_little_endian() {
        let blob = wrap_entry(0x0102_0304_0506_0708, 0x1112_1314_1516_1718, b"ab", b"");
        assert_eq!(&blob[..8], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&blob[8..16], &[0x18, 0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11]);
        assert_eq!(&blob[16..18], &[0x02, 0x00]);
    }
}
