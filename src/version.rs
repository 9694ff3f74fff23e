//! Data directory version gate.
//!
//! Replication slots appeared in PostgreSQL 9.4; older data directories have
//! nothing for us to read. The gate looks at `PG_VERSION`, which holds the
//! server major version as `MAJOR` (10 and later) or `MAJOR.MINOR` (9.x).

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use crate::config::PG_VERSION_FILE;
use crate::{Error, Result};

/// Oldest supported server, as `MAJOR * 10000 + MINOR * 100`.
pub const MIN_SUPPORTED_VERSION_NUM: u32 = 90400;
pub const MIN_SUPPORTED_VERSION: &str = "9.4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgVersion {
    pub major: u32,
    pub minor: u32,
}

impl PgVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Composite number comparable with [`MIN_SUPPORTED_VERSION_NUM`].
    pub fn version_num(&self) -> u64 {
        u64::from(self.major) * 10000 + u64::from(self.minor) * 100
    }

    pub fn is_supported(&self) -> bool {
        self.version_num() >= u64::from(MIN_SUPPORTED_VERSION_NUM)
    }
}

impl fmt::Display for PgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Outcome of a successful read of `PG_VERSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCheck {
    Supported(PgVersion),
    /// Too old to have replication slots. Not an error.
    Unsupported(PgVersion),
}

/// Parses the contents of a `PG_VERSION` file.
///
/// The first whitespace-delimited token must be `MAJOR` or `MAJOR.MINOR`,
/// each an ASCII decimal integer. Anything after that token is ignored.
pub fn parse_pg_version(contents: &str) -> Option<PgVersion> {
    let token = contents.split_whitespace().next()?;

    let (major, minor) = match token.split_once('.') {
        Some((major, minor)) => (major, Some(minor)),
        None => (token, None),
    };

    let major = parse_decimal(major)?;
    let minor = match minor {
        Some(minor) => parse_decimal(minor)?,
        None => 0,
    };

    Some(PgVersion::new(major, minor))
}

fn parse_decimal(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Reads `<datadir>/PG_VERSION` and decides whether the directory is usable.
///
/// # Errors
///
/// - [`Error::NotADataDirectory`] if `PG_VERSION` does not exist
/// - [`Error::VersionFileUnreadable`] if it exists but cannot be read
/// - [`Error::InvalidVersionFile`] if its contents are not a version number
pub fn check_data_directory(datadir: &Path) -> Result<VersionCheck> {
    let path = datadir.join(PG_VERSION_FILE);

    let contents = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No {} at {:?}", PG_VERSION_FILE, path);
            return Err(Error::NotADataDirectory {
                datadir: datadir.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(Error::VersionFileUnreadable {
                datadir: datadir.to_path_buf(),
                source: e,
            });
        }
    };

    let version = parse_pg_version(&String::from_utf8_lossy(&contents)).ok_or_else(|| {
        Error::InvalidVersionFile {
            datadir: datadir.to_path_buf(),
        }
    })?;

    if version.is_supported() {
        info!(version = %version, "Data directory accepted");
        Ok(VersionCheck::Supported(version))
    } else {
        info!(version = %version, "Data directory predates replication slots");
        Ok(VersionCheck::Unsupported(version))
    }
}
