//! On-disk layout of `pg_replslot/<name>/state`.
//!
//! ```text
//! offset  size  field
//! 0       4     magic
//! 4       4     checksum         CRC-32C over [8, 16 + length)
//! 8       4     version
//! 12      4     length           size of the body that follows
//! 16      160   slotdata         version 2 body
//! ```
//!
//! Integers are in the byte order of the server that wrote the file. We read
//! them in native order and do not swap, so files are only readable on a
//! machine with the same endianness as the producer.
//!
//! Offsets are derived field by field rather than from the size of a Rust
//! struct. Every 8-byte field in the version 2 body already lands on an
//! 8-byte boundary, so the server's C layout has no interior padding.

use bytes::Buf;

pub const SLOT_MAGIC: u32 = 0x0105_1CA1;

pub const MIN_SLOT_VERSION: u32 = 2;
pub const MAX_SLOT_VERSION: u32 = 2;

/// `NAMEDATALEN`: fixed width of a NUL padded identifier.
pub const NAMEDATALEN: usize = 64;

/// Version independent prefix: magic, checksum, version, length.
pub const HEADER_SIZE: usize = 16;

/// Bytes before `version`, i.e. not covered by the checksum.
pub const NOT_CHECKSUMMED_SIZE: usize = 8;

const NAME_SIZE: usize = NAMEDATALEN;
const OID_SIZE: usize = 4;
const PERSISTENCY_SIZE: usize = 4;
const XID_SIZE: usize = 4;
const LSN_SIZE: usize = 8;

const RESTART_LSN_OFFSET: usize = NAME_SIZE + OID_SIZE + PERSISTENCY_SIZE + 2 * XID_SIZE;
const _: () = assert!(RESTART_LSN_OFFSET % LSN_SIZE == 0);
const _: () = assert!((HEADER_SIZE + RESTART_LSN_OFFSET) % LSN_SIZE == 0);

/// Size of the version 2 body.
pub const BODY_SIZE: usize = RESTART_LSN_OFFSET + 2 * LSN_SIZE + NAME_SIZE;
const _: () = assert!(BODY_SIZE % LSN_SIZE == 0);

/// Whole state file for format version 2.
pub const STATE_FILE_SIZE: usize = HEADER_SIZE + BODY_SIZE;

/// `ReplicationSlotPersistency` value for crash-safe slots.
pub const RS_PERSISTENT: u32 = 0;
/// `ReplicationSlotPersistency` value for slots dropped on release.
pub const RS_EPHEMERAL: u32 = 1;

/// Version independent prefix of a state file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHeader {
    pub magic: u32,
    pub checksum: u32,
    pub version: u32,
    pub length: u32,
}

impl SlotHeader {
    /// Decodes the first [`HEADER_SIZE`] bytes of `buf`.
    ///
    /// The caller guarantees that `buf` holds at least [`HEADER_SIZE`] bytes.
    pub fn decode(mut buf: &[u8]) -> Self {
        debug_assert!(buf.remaining() >= HEADER_SIZE);
        Self {
            magic: buf.get_u32_ne(),
            checksum: buf.get_u32_ne(),
            version: buf.get_u32_ne(),
            length: buf.get_u32_ne(),
        }
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic == SLOT_MAGIC
    }

    pub fn has_supported_version(&self) -> bool {
        (MIN_SLOT_VERSION..=MAX_SLOT_VERSION).contains(&self.version)
    }

    pub fn has_expected_length(&self) -> bool {
        self.length as usize == BODY_SIZE
    }
}

/// Version 2 body (`ReplicationSlotPersistentData`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPersistentData {
    pub name: String,
    pub database: u32,
    pub persistency: u32,
    pub xmin: u32,
    pub catalog_xmin: u32,
    pub restart_lsn: u64,
    pub confirmed_flush: u64,
    pub plugin: String,
}

impl SlotPersistentData {
    /// Decodes a version 2 body. `buf` must hold at least [`BODY_SIZE`] bytes.
    pub fn decode(mut buf: &[u8]) -> Self {
        debug_assert!(buf.remaining() >= BODY_SIZE);

        let name = name_from_bytes(&buf[..NAME_SIZE]);
        buf.advance(NAME_SIZE);

        let database = buf.get_u32_ne();
        let persistency = buf.get_u32_ne();
        let xmin = buf.get_u32_ne();
        let catalog_xmin = buf.get_u32_ne();
        let restart_lsn = buf.get_u64_ne();
        let confirmed_flush = buf.get_u64_ne();

        let plugin = name_from_bytes(&buf[..NAME_SIZE]);

        Self {
            name,
            database,
            persistency,
            xmin,
            catalog_xmin,
            restart_lsn,
            confirmed_flush,
            plugin,
        }
    }
}

/// Reads a `NameData` field: bytes up to the first NUL, or all of them.
pub fn name_from_bytes(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// CRC-32C over the checksummed part of a state file image.
///
/// `image` is the header followed by the body; everything from `version`
/// onward is covered.
pub fn compute_checksum(image: &[u8]) -> u32 {
    crc32c::crc32c(&image[NOT_CHECKSUMMED_SIZE..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_layout_sizes() {
        assert_eq!(HEADER_SIZE, 16);
        assert_eq!(BODY_SIZE, 160);
        assert_eq!(STATE_FILE_SIZE, 176);
    }

    #[test]
    fn test_header_decode() {
        let mut buf = BytesMut::new();
        buf.put_u32_ne(SLOT_MAGIC);
        buf.put_u32_ne(0xAABBCCDD);
        buf.put_u32_ne(2);
        buf.put_u32_ne(BODY_SIZE as u32);

        let header = SlotHeader::decode(&buf);
        assert_eq!(header.magic, SLOT_MAGIC);
        assert_eq!(header.checksum, 0xAABBCCDD);
        assert!(header.has_valid_magic());
        assert!(header.has_supported_version());
        assert!(header.has_expected_length());
    }

    #[test]
    fn test_header_predicates_reject() {
        let header = SlotHeader {
            magic: 0xDEADBEEF,
            checksum: 0,
            version: 3,
            length: 200,
        };
        assert!(!header.has_valid_magic());
        assert!(!header.has_supported_version());
        assert!(!header.has_expected_length());

        let header = SlotHeader { version: 1, ..header };
        assert!(!header.has_supported_version());
    }

    #[test]
    fn test_body_decode_all_fields() {
        let mut buf = BytesMut::new();
        let mut name = [0u8; NAMEDATALEN];
        name[..4].copy_from_slice(b"dec1");
        buf.put_slice(&name);
        buf.put_u32_ne(16384);
        buf.put_u32_ne(RS_EPHEMERAL);
        buf.put_u32_ne(700);
        buf.put_u32_ne(701);
        buf.put_u64_ne(0x0000_0001_0000_0028);
        buf.put_u64_ne(0x0000_0001_0000_0100);
        let mut plugin = [0u8; NAMEDATALEN];
        plugin[..8].copy_from_slice(b"pgoutput");
        buf.put_slice(&plugin);
        assert_eq!(buf.len(), BODY_SIZE);

        let body = SlotPersistentData::decode(&buf);
        assert_eq!(body.name, "dec1");
        assert_eq!(body.database, 16384);
        assert_eq!(body.persistency, RS_EPHEMERAL);
        assert_eq!(body.xmin, 700);
        assert_eq!(body.catalog_xmin, 701);
        assert_eq!(body.restart_lsn, 0x0000_0001_0000_0028);
        assert_eq!(body.confirmed_flush, 0x0000_0001_0000_0100);
        assert_eq!(body.plugin, "pgoutput");
    }

    #[test]
    fn test_name_without_nul_takes_whole_field() {
        let field = [b'x'; NAMEDATALEN];
        assert_eq!(name_from_bytes(&field).len(), NAMEDATALEN);
        assert_eq!(name_from_bytes(b"ab\0cd"), "ab");
        assert_eq!(name_from_bytes(b"\0\0\0"), "");
    }

    #[test]
    fn test_checksum_is_crc32c_from_version_onward() {
        // CRC-32C check value for "123456789"
        let mut image = vec![0xAAu8; NOT_CHECKSUMMED_SIZE];
        image.extend_from_slice(b"123456789");
        assert_eq!(compute_checksum(&image), 0xE306_9283);
    }

    #[test]
    fn test_checksum_known_state_image() {
        // little-endian v2 image of a logical slot "repl1" on database 16384
        let mut image = Vec::with_capacity(STATE_FILE_SIZE);
        for word in [SLOT_MAGIC, 0, 2, BODY_SIZE as u32] {
            image.extend_from_slice(&word.to_le_bytes());
        }
        let mut name = [0u8; NAMEDATALEN];
        name[..5].copy_from_slice(b"repl1");
        image.extend_from_slice(&name);
        for word in [16384u32, RS_PERSISTENT, 700, 701] {
            image.extend_from_slice(&word.to_le_bytes());
        }
        image.extend_from_slice(&0x0000_0001_0000_0028u64.to_le_bytes());
        image.extend_from_slice(&0x0000_0001_0000_0100u64.to_le_bytes());
        let mut plugin = [0u8; NAMEDATALEN];
        plugin[..8].copy_from_slice(b"pgoutput");
        image.extend_from_slice(&plugin);
        assert_eq!(image.len(), STATE_FILE_SIZE);

        assert_eq!(compute_checksum(&image), 0x41B4_2E3D);
    }

    #[test]
    fn test_checksum_skips_magic_and_checksum() {
        let mut a = vec![0u8; STATE_FILE_SIZE];
        let mut b = a.clone();
        a[0] = 1;
        b[4] = 9;
        assert_eq!(compute_checksum(&a), compute_checksum(&b));
        b[8] = 2;
        assert_ne!(compute_checksum(&a), compute_checksum(&b));
    }
}
