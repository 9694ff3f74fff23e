use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::error::SlotError;

/// Whether a slot streams raw WAL or decoded changes for one database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlotKind {
    Physical,
    Logical { db_oid: u32 },
}

impl SlotKind {
    /// `InvalidOid` (0) marks a physical slot.
    pub fn from_database(database: u32) -> Self {
        if database == 0 {
            SlotKind::Physical
        } else {
            SlotKind::Logical { db_oid: database }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistency {
    Persistent,
    Ephemeral,
}

impl Persistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persistency::Persistent => "persistent",
            Persistency::Ephemeral => "ephemeral",
        }
    }
}

/// Fields extracted from a state file that passed every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    pub name: String,
    #[serde(flatten)]
    pub kind: SlotKind,
    pub persistency: Persistency,
    pub version: u32,
    pub length: u32,
}

#[derive(Debug)]
pub enum SlotOutcome {
    Parsed(SlotInfo),
    Failed(SlotError),
}

/// Result of reading one directory under `pg_replslot`.
#[derive(Debug)]
pub struct SlotReport {
    pub dir: PathBuf,
    pub outcome: SlotOutcome,
}

impl SlotReport {
    pub fn parsed(dir: impl AsRef<Path>, info: SlotInfo) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            outcome: SlotOutcome::Parsed(info),
        }
    }

    pub fn failed(dir: impl AsRef<Path>, error: SlotError) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            outcome: SlotOutcome::Failed(error),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self.outcome, SlotOutcome::Parsed(_))
    }

    pub fn info(&self) -> Option<&SlotInfo> {
        match &self.outcome {
            SlotOutcome::Parsed(info) => Some(info),
            SlotOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SlotError> {
        match &self.outcome {
            SlotOutcome::Parsed(_) => None,
            SlotOutcome::Failed(e) => Some(e),
        }
    }

    /// Slot name, empty when decoding failed before it was extracted.
    pub fn name(&self) -> &str {
        self.info().map(|info| info.name.as_str()).unwrap_or("")
    }
}

impl Serialize for SlotReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Parsed<'a> {
            path: &'a Path,
            parsed: bool,
            #[serde(flatten)]
            info: &'a SlotInfo,
        }

        #[derive(Serialize)]
        struct Failed<'a> {
            path: &'a Path,
            parsed: bool,
            error: String,
        }

        match &self.outcome {
            SlotOutcome::Parsed(info) => Parsed {
                path: &self.dir,
                parsed: true,
                info,
            }
            .serialize(serializer),
            SlotOutcome::Failed(e) => Failed {
                path: &self.dir,
                parsed: false,
                error: e.to_string(),
            }
            .serialize(serializer),
        }
    }
}
