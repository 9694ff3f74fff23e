use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the version marker file inside a data directory.
pub const PG_VERSION_FILE: &str = "PG_VERSION";

/// Directory holding one subdirectory per replication slot.
pub const REPLSLOT_DIR: &str = "pg_replslot";

/// State file inside each slot directory.
pub const SLOT_STATE_FILE: &str = "state";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub datadir: PathBuf,
    #[serde(default = "default_progname")]
    pub progname: String,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub verify_checksum: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    pub fn new(datadir: impl AsRef<Path>) -> Self {
        Self {
            datadir: datadir.as_ref().to_path_buf(),
            progname: default_progname(),
            format: OutputFormat::default(),
            verify_checksum: false,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_checksum_verification(mut self, enabled: bool) -> Self {
        self.verify_checksum = enabled;
        self
    }

    pub fn version_file(&self) -> PathBuf {
        self.datadir.join(PG_VERSION_FILE)
    }

    pub fn slots_root(&self) -> PathBuf {
        self.datadir.join(REPLSLOT_DIR)
    }
}

fn default_progname() -> String {
    "pg_replslot_reader".to_string()
}
