use anyhow::Context;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use pg_replslot_reader::version::MIN_SUPPORTED_VERSION;
use pg_replslot_reader::{Config, Exit, Inspector, OutputFormat};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "pg_replslot_reader")]
#[command(about = "replication slot reader", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// PostgreSQL data directory to examine
    #[arg(short = 'D', long = "pgdata", value_name = "DIR", env = "PGDATA")]
    pgdata: Option<OsString>,

    /// Output version information, then exit
    #[arg(short = 'V', long)]
    version: bool,

    /// Show this help, then exit
    #[arg(short = '?', long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Print the reports as a JSON document
    #[arg(long)]
    json: bool,

    /// Also verify each state file's CRC-32C
    #[arg(long)]
    verify_checksum: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,

    #[arg(long, help = "Enable JSON output for logs")]
    json_logs: bool,
}

fn main() {
    let progname = progname();

    match run(&progname) {
        Ok(exit) => std::process::exit(exit.code()),
        Err(e) => {
            eprintln!("{}: {:#}", progname, e);
            std::process::exit(1);
        }
    }
}

fn run(progname: &str) -> anyhow::Result<Exit> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            e.print().context("writing help")?;
            return Ok(Exit::Success);
        }
        Err(_) => {
            print_usage(progname);
            return Ok(Exit::Failure);
        }
    };

    if args.version {
        println!(
            "{} {} (PostgreSQL {} or later)",
            progname,
            env!("CARGO_PKG_VERSION"),
            MIN_SUPPORTED_VERSION
        );
        return Ok(Exit::Success);
    }

    init_logging(args.json_logs, args.verbose);

    let Some(datadir) = datadir_arg(args.pgdata) else {
        println!("Please provide the PostgreSQL data directory location with -D/--pgdata");
        return Ok(Exit::Failure);
    };

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let mut config = Config::new(datadir)
        .with_format(format)
        .with_checksum_verification(args.verify_checksum);
    config.progname = progname.to_string();

    info!(datadir = %config.datadir.display(), "Inspecting data directory");

    let inspector = Inspector::new(config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let exit = inspector.run(&mut out).context("writing report")?;
    out.flush().context("flushing stdout")?;

    Ok(exit)
}

/// An empty `-D` or `PGDATA` counts as not given.
fn datadir_arg(pgdata: Option<OsString>) -> Option<PathBuf> {
    pgdata.filter(|dir| !dir.is_empty()).map(PathBuf::from)
}

fn progname() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "pg_replslot_reader".to_string())
}

fn print_usage(progname: &str) {
    println!("{}: replication slot reader", progname);
    println!("Try \"{} --help\" for more information.", progname);
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("pg_replslot_reader=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("pg_replslot_reader=warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pgdata_counts_as_missing() {
        let args = Args::try_parse_from(["pg_replslot_reader", "-D", ""]).unwrap();
        assert_eq!(args.pgdata.as_deref(), Some(std::ffi::OsStr::new("")));
        assert_eq!(datadir_arg(args.pgdata), None);
    }

    #[test]
    fn test_pgdata_given() {
        let args = Args::try_parse_from(["pg_replslot_reader", "--pgdata", "/srv/pg"]).unwrap();
        assert_eq!(datadir_arg(args.pgdata), Some(PathBuf::from("/srv/pg")));
    }

    #[test]
    fn test_unknown_option_is_a_parse_error() {
        let err = Args::try_parse_from(["pg_replslot_reader", "--bogus"]).unwrap_err();
        assert_ne!(err.kind(), ErrorKind::DisplayHelp);

        let err = Args::try_parse_from(["pg_replslot_reader", "-?"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
