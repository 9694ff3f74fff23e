//! Drives a single inspection of a data directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use pg_replslot_reader::{Config, Inspector};
//!
//! let inspector = Inspector::new(Config::new("/var/lib/postgresql/data"));
//! let mut stdout = std::io::stdout();
//! let exit = inspector.run(&mut stdout)?;
//! std::process::exit(exit.code());
//! # Ok::<(), pg_replslot_reader::Error>(())
//! ```

use std::io::Write;
use tracing::{debug, info};

use crate::config::{Config, OutputFormat};
use crate::report::SlotReport;
use crate::scan::SlotDirs;
use crate::slot::{read_slot_dir, ReadOptions};
use crate::version::{check_data_directory, VersionCheck, MIN_SUPPORTED_VERSION};
use crate::{render, Error, Result};

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Slots listed, none found, or the server predates slots.
    Success,
    /// The data directory or its slots root was unusable.
    Failure,
}

impl Exit {
    pub fn code(&self) -> i32 {
        match self {
            Exit::Success => 0,
            Exit::Failure => 1,
        }
    }
}

pub struct Inspector {
    config: Config,
}

impl Inspector {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn check_version(&self) -> Result<VersionCheck> {
        check_data_directory(&self.config.datadir)
    }

    pub fn slot_dirs(&self) -> Result<SlotDirs> {
        SlotDirs::open(&self.config.datadir)
    }

    /// Reads every slot directory, in enumeration order.
    ///
    /// Only failing to list `pg_replslot` is an error; problems with
    /// individual slots end up on their reports.
    pub fn scan(&self) -> Result<Vec<SlotReport>> {
        let options = ReadOptions {
            verify_checksum: self.config.verify_checksum,
        };

        let reports: Vec<SlotReport> = self
            .slot_dirs()?
            .map(|dir| read_slot_dir(&dir, options))
            .collect();

        info!(
            slots = reports.len(),
            failed = reports.iter().filter(|r| !r.is_parsed()).count(),
            "Scan complete"
        );
        Ok(reports)
    }

    /// Runs the version gate and the scan, writing results to `out`.
    ///
    /// Setup failures are written to `out` as a single line and reported as
    /// [`Exit::Failure`]. `Err` is returned only when writing itself fails.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<Exit> {
        let datadir = &self.config.datadir;
        let json = self.config.format == OutputFormat::Json;

        if !json {
            writeln!(out, "Checking directory {}...", datadir.display())?;
        }

        let version = match self.check_version() {
            Ok(VersionCheck::Supported(version)) => version,
            Ok(VersionCheck::Unsupported(version)) => {
                if json {
                    render::write_json(out, datadir, version, false, &[])?;
                } else {
                    writeln!(
                        out,
                        "This data directory is for PostgreSQL {}; {} supports {} or later",
                        version, self.config.progname, MIN_SUPPORTED_VERSION
                    )?;
                }
                return Ok(Exit::Success);
            }
            Err(e) => return report_fatal(out, e),
        };

        let reports = match self.scan() {
            Ok(reports) => reports,
            Err(e) => return report_fatal(out, e),
        };

        if json {
            render::write_json(out, datadir, version, true, &reports)?;
        } else if reports.is_empty() {
            writeln!(out, "No replication slots found")?;
        } else {
            render::write_text(out, &reports)?;
        }

        Ok(Exit::Success)
    }
}

fn report_fatal<W: Write>(out: &mut W, e: Error) -> Result<Exit> {
    match e {
        Error::Io(_) | Error::Serialization(_) => Err(e),
        e => {
            debug!("Fatal: {:?}", e);
            writeln!(out, "{}", e)?;
            Ok(Exit::Failure)
        }
    }
}
