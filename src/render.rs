//! Output formatting for slot reports.

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::report::{SlotKind, SlotOutcome, SlotReport};
use crate::version::PgVersion;
use crate::Result;

/// Writes the human readable listing that follows the directory check.
pub fn write_text<W: Write>(out: &mut W, reports: &[SlotReport]) -> Result<()> {
    writeln!(out, "{} replication slot(s) found", reports.len())?;
    writeln!(out)?;

    for report in reports {
        match &report.outcome {
            SlotOutcome::Failed(e) => {
                writeln!(out, "Unable to parse slot \"{}\":", report.name())?;
                writeln!(out, "{}", e)?;
            }
            SlotOutcome::Parsed(info) => {
                writeln!(out, "{}", info.name)?;
                writeln!(out, "{}", "-".repeat(info.name.len()))?;
                match info.kind {
                    SlotKind::Physical => writeln!(out, "  Type: physical")?,
                    SlotKind::Logical { db_oid } => {
                        writeln!(out, "  Type: logical; DB oid: {}", db_oid)?
                    }
                }
                writeln!(out, "  Persistency: {}", info.persistency.as_str())?;
                writeln!(out, "  Version: {}", info.version)?;
                writeln!(out, "  Length: {}", info.length)?;
            }
        }
    }

    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    datadir: &'a Path,
    server_version: String,
    supported: bool,
    slots: &'a [SlotReport],
}

/// Writes a single JSON document describing the whole run.
pub fn write_json<W: Write>(
    out: &mut W,
    datadir: &Path,
    server_version: PgVersion,
    supported: bool,
    reports: &[SlotReport],
) -> Result<()> {
    let document = JsonDocument {
        datadir,
        server_version: server_version.to_string(),
        supported,
        slots: reports,
    };
    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out)?;
    Ok(())
}
