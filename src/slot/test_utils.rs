use bytes::{BufMut, Bytes, BytesMut};

use super::layout::{
    compute_checksum, BODY_SIZE, HEADER_SIZE, MAX_SLOT_VERSION, NAMEDATALEN, RS_PERSISTENT, SLOT_MAGIC,
};

/// Builds state file images for tests.
///
/// Defaults produce a valid physical, persistent slot. Individual header
/// fields can be overridden to produce corrupt files.
#[derive(Debug, Clone)]
pub struct SlotStateBuilder {
    name: Vec<u8>,
    database: u32,
    persistency: u32,
    xmin: u32,
    catalog_xmin: u32,
    restart_lsn: u64,
    confirmed_flush: u64,
    plugin: Vec<u8>,
    magic: u32,
    version: u32,
    length: Option<u32>,
    checksum: Option<u32>,
}

impl SlotStateBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            database: 0,
            persistency: RS_PERSISTENT,
            xmin: 0,
            catalog_xmin: 0,
            restart_lsn: 0x0000_0000_0300_0028,
            confirmed_flush: 0,
            plugin: Vec::new(),
            magic: SLOT_MAGIC,
            version: MAX_SLOT_VERSION,
            length: None,
            checksum: None,
        }
    }

    /// A logical slot on database `oid` decoded by `plugin`.
    pub fn logical(name: &str, oid: u32, plugin: &str) -> Self {
        Self::new(name).with_database(oid).with_plugin(plugin)
    }

    pub fn with_name_bytes(mut self, name: &[u8]) -> Self {
        self.name = name.to_vec();
        self
    }

    pub fn with_database(mut self, database: u32) -> Self {
        self.database = database;
        self
    }

    pub fn with_persistency(mut self, persistency: u32) -> Self {
        self.persistency = persistency;
        self
    }

    pub fn with_plugin(mut self, plugin: &str) -> Self {
        self.plugin = plugin.as_bytes().to_vec();
        self
    }

    pub fn with_xmins(mut self, xmin: u32, catalog_xmin: u32) -> Self {
        self.xmin = xmin;
        self.catalog_xmin = catalog_xmin;
        self
    }

    pub fn with_magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Stores `checksum` instead of the computed CRC-32C.
    pub fn with_checksum(mut self, checksum: u32) -> Self {
        self.checksum = Some(checksum);
        self
    }

    pub fn build(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + BODY_SIZE);
        buf.put_u32_ne(self.magic);
        buf.put_u32_ne(0); // patched below
        buf.put_u32_ne(self.version);
        buf.put_u32_ne(self.length.unwrap_or(BODY_SIZE as u32));

        put_name(&mut buf, &self.name);
        buf.put_u32_ne(self.database);
        buf.put_u32_ne(self.persistency);
        buf.put_u32_ne(self.xmin);
        buf.put_u32_ne(self.catalog_xmin);
        buf.put_u64_ne(self.restart_lsn);
        buf.put_u64_ne(self.confirmed_flush);
        put_name(&mut buf, &self.plugin);

        let checksum = self.checksum.unwrap_or_else(|| compute_checksum(&buf));
        buf[4..8].copy_from_slice(&checksum.to_ne_bytes());

        buf.freeze()
    }
}

fn put_name(buf: &mut BytesMut, name: &[u8]) {
    let mut field = [0u8; NAMEDATALEN];
    let len = name.len().min(NAMEDATALEN);
    field[..len].copy_from_slice(&name[..len]);
    buf.put_slice(&field);
}
