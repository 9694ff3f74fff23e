use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::layout::{
    compute_checksum, SlotHeader, SlotPersistentData, BODY_SIZE, HEADER_SIZE, RS_EPHEMERAL,
    RS_PERSISTENT, SLOT_MAGIC, STATE_FILE_SIZE,
};
use crate::config::SLOT_STATE_FILE;
use crate::error::SlotError;
use crate::report::{Persistency, SlotInfo, SlotKind, SlotReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Compare the stored CRC-32C against the file contents.
    pub verify_checksum: bool,
}

/// Reads `<dir>/state` and produces the slot's report. Never fails; any
/// problem is recorded on the report.
pub fn read_slot_dir(dir: &Path, options: ReadOptions) -> SlotReport {
    let path = dir.join(SLOT_STATE_FILE);

    match read_state_file(&path, options) {
        Ok(info) => {
            debug!(slot = %info.name, "Read replication slot state");
            SlotReport::parsed(dir, info)
        }
        Err(e) => {
            debug!("Failed to read replication slot state in {:?}: {}", dir, e);
            SlotReport::failed(dir, e)
        }
    }
}

/// Opens and decodes one state file.
pub fn read_state_file(path: &Path, options: ReadOptions) -> Result<SlotInfo, SlotError> {
    let file = File::open(path).map_err(|e| SlotError::OpenFailure {
        path: path.to_path_buf(),
        source: e,
    })?;

    // `file` is dropped on every return below
    decode_state(file, path, options)
}

/// Runs the header and body checks over any byte source.
///
/// `path` is used only for diagnostics.
pub fn decode_state<R: Read>(
    mut reader: R,
    path: &Path,
    options: ReadOptions,
) -> Result<SlotInfo, SlotError> {
    let mut image = [0u8; STATE_FILE_SIZE];

    let read = read_up_to(&mut reader, &mut image[..HEADER_SIZE], path)?;
    if read != HEADER_SIZE {
        return Err(SlotError::ShortRead {
            path: path.to_path_buf(),
            read,
            expected: HEADER_SIZE as u32,
        });
    }

    let header = SlotHeader::decode(&image[..HEADER_SIZE]);

    if !header.has_valid_magic() {
        return Err(SlotError::BadMagic {
            path: path.to_path_buf(),
            found: header.magic,
            expected: SLOT_MAGIC,
        });
    }

    if !header.has_supported_version() {
        return Err(SlotError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: header.version,
        });
    }

    if !header.has_expected_length() {
        return Err(SlotError::CorruptedLength {
            path: path.to_path_buf(),
            length: header.length,
        });
    }

    let read = read_up_to(&mut reader, &mut image[HEADER_SIZE..], path)?;
    if read != BODY_SIZE {
        return Err(SlotError::ShortRead {
            path: path.to_path_buf(),
            read,
            expected: header.length,
        });
    }

    if options.verify_checksum {
        let computed = compute_checksum(&image);
        if computed != header.checksum {
            warn!("Checksum mismatch in {:?}", path);
            return Err(SlotError::ChecksumMismatch {
                path: path.to_path_buf(),
                computed,
                stored: header.checksum,
            });
        }
    }

    let body = SlotPersistentData::decode(&image[HEADER_SIZE..]);

    Ok(SlotInfo {
        kind: SlotKind::from_database(body.database),
        persistency: persistency_from_raw(body.persistency, &body.name),
        name: body.name,
        version: header.version,
        length: header.length,
    })
}

fn persistency_from_raw(raw: u32, slot_name: &str) -> Persistency {
    match raw {
        RS_PERSISTENT => Persistency::Persistent,
        RS_EPHEMERAL => Persistency::Ephemeral,
        other => {
            warn!(
                slot = %slot_name,
                "Unknown persistency value {}, reporting as ephemeral", other
            );
            Persistency::Ephemeral
        }
    }
}

/// Fills `buf` until it is full or the reader hits end of file, returning
/// the number of bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8], path: &Path) -> Result<usize, SlotError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(SlotError::ReadFailure {
                    path: PathBuf::from(path),
                    source: e,
                })
            }
        }
    }
    Ok(filled)
}
