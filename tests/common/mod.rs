use pg_replslot_reader::config::{PG_VERSION_FILE, REPLSLOT_DIR, SLOT_STATE_FILE};
use pg_replslot_reader::slot::test_utils::SlotStateBuilder;
use pg_replslot_reader::{Config, Exit, Inspector};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch PostgreSQL data directory.
pub struct TestDataDir {
    dir: TempDir,
}

impl TestDataDir {
    /// Data directory with `PG_VERSION` and an empty `pg_replslot`.
    pub fn new(pg_version: &str) -> Self {
        let data_dir = Self::bare();
        data_dir.write_pg_version(pg_version);
        fs::create_dir(data_dir.slots_root()).unwrap();
        data_dir
    }

    /// Data directory with nothing in it.
    pub fn bare() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn slots_root(&self) -> PathBuf {
        self.path().join(REPLSLOT_DIR)
    }

    pub fn write_pg_version(&self, contents: &str) {
        fs::write(self.path().join(PG_VERSION_FILE), format!("{}\n", contents)).unwrap();
    }

    /// Creates `pg_replslot/<dir_name>/state` holding `bytes`.
    pub fn add_slot_bytes(&self, dir_name: &str, bytes: &[u8]) -> PathBuf {
        let slot_dir = self.add_empty_slot_dir(dir_name);
        let state = slot_dir.join(SLOT_STATE_FILE);
        fs::write(&state, bytes).unwrap();
        state
    }

    pub fn add_slot(&self, dir_name: &str, builder: &SlotStateBuilder) -> PathBuf {
        self.add_slot_bytes(dir_name, &builder.build())
    }

    pub fn add_empty_slot_dir(&self, dir_name: &str) -> PathBuf {
        let slot_dir = self.slots_root().join(dir_name);
        fs::create_dir(&slot_dir).unwrap();
        slot_dir
    }

    pub fn config(&self) -> Config {
        Config::new(self.path())
    }
}

/// Runs an inspection and returns the exit status and captured stdout.
pub fn run_inspector(config: Config) -> (Exit, String) {
    let mut out = Vec::new();
    let exit = Inspector::new(config).run(&mut out).unwrap();
    (exit, String::from_utf8(out).unwrap())
}
