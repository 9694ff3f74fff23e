//! Error types and result handling for pg-replslot-reader.
//!
//! Two regimes exist. [`Error`] covers fatal setup failures (the data
//! directory itself is unusable) and aborts the run. [`SlotError`] covers
//! everything that can go wrong while decoding one slot's state file; it is
//! recorded on that slot's report and the scan continues.
//!
//! # Example
//!
//! ```rust
//! use pg_replslot_reader::{Error, Result};
//! use std::path::PathBuf;
//!
//! fn open_datadir() -> Result<()> {
//!     Err(Error::NotADataDirectory {
//!         datadir: PathBuf::from("/tmp/nowhere"),
//!     })
//! }
//!
//! match open_datadir() {
//!     Ok(()) => println!("ok"),
//!     Err(e) => println!("{}", e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. The `Display` form is the line shown to the user.
#[derive(Error, Debug)]
pub enum Error {
    /// `PG_VERSION` does not exist under the data directory.
    #[error("{} is not a PostgreSQL directory", .datadir.display())]
    NotADataDirectory { datadir: PathBuf },

    /// `PG_VERSION` exists but could not be opened or read.
    #[error("Unable to read PG_VERSION file in {}", .datadir.display())]
    VersionFileUnreadable {
        datadir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `PG_VERSION` does not start with `MAJOR[.MINOR]`.
    #[error(
        "PG_VERSION file in {} does not contain a valid version number",
        .datadir.display()
    )]
    InvalidVersionFile { datadir: PathBuf },

    /// The `pg_replslot` directory could not be listed.
    #[error("Unable to open directory '{}'", .path.display())]
    SlotsRootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error when rendering reports.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A convenient Result type alias for pg-replslot-reader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Per-slot decoding failure, kept on the slot's report.
#[derive(Error, Debug)]
pub enum SlotError {
    /// The `state` file could not be opened (missing, permissions, ...).
    #[error("unable to open replication slot file {}: {source}", .path.display())]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// End of file was reached before the expected number of bytes.
    #[error("could not read file \"{}\", read {read} of {expected}", .path.display())]
    ShortRead {
        path: PathBuf,
        read: usize,
        expected: u32,
    },

    /// The OS reported an error in the middle of reading.
    #[error("could not read file \"{}\": {source}", .path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "replication slot file \"{}\" has wrong magic number: {found} instead of {expected}",
        .path.display()
    )]
    BadMagic {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("replication slot file \"{}\" has unsupported version {version}", .path.display())]
    UnsupportedVersion { path: PathBuf, version: u32 },

    #[error("replication slot file \"{}\" has corrupted length {length}", .path.display())]
    CorruptedLength { path: PathBuf, length: u32 },

    /// Only produced when checksum verification is enabled.
    #[error(
        "replication slot file \"{}\" has checksum mismatch: is {computed}, should be {stored}",
        .path.display()
    )]
    ChecksumMismatch {
        path: PathBuf,
        computed: u32,
        stored: u32,
    },
}
