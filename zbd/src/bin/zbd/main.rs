// vim: tw=80
use std::{
    ffi::OsString,
    io::{self, Write},
    path::PathBuf,
    process::exit,
};

use clap::{crate_version, Args, Parser};
use tracing_subscriber::EnvFilter;
use zbd_core::{
    controller::{execute, Request},
    device::{open_device, DeviceConfig},
    range::ByteRange,
    zone::ReportFilter,
    Command,
    Error,
    Result,
    ZoneOp,
};

/// Long options that may also be spelled with a single dash
const SINGLE_DASH_LONG: [&str; 4] = ["-ofst", "-len", "-csv", "-ro"];

#[derive(Args, Clone, Debug)]
struct Common {
    /// Verbose mode (for debug)
    #[clap(short = 'v')]
    verbose: bool,
    /// Display device information
    #[clap(short = 'i')]
    info:    bool,
    /// Start offset of the first zone of the target range, in bytes
    #[clap(long, default_value_t = 0, value_name = "OFST")]
    ofst:    u64,
    /// Size of the zone range to operate on, in bytes [default: device
    /// capacity]
    #[clap(long, default_value_t = 0, value_name = "LEN")]
    len:     u64,
    /// Size unit for displaying zone report results, in bytes
    #[clap(short = 'u', long, default_value_t = 1, value_name = "UNIT")]
    unit:    u64,
    /// Zoned block device
    #[clap(required(true))]
    device:  PathBuf,
}

/// Options that only affect `report`.  The management commands accept them
/// too, and ignore them.
#[derive(Args, Clone, Debug)]
struct ReportOpts {
    /// Use csv output format
    #[clap(long)]
    csv:    bool,
    /// Only output the number of zones in the report
    #[clap(short = 'n')]
    count:  bool,
    /// Zone report filter: em (empty), oi (implicitly open), oe (explicitly
    /// open), cl (closed), fu (full), ro (read-only), ol (offline), nw
    /// (conventional), ns (non-seq write resources), rw (reset recommended)
    #[clap(long = "ro", default_value = "all", value_name = "FILTER")]
    filter: ReportFilter,
}

#[derive(Parser, Clone, Debug)]
/// Get zone information
struct Report {
    #[clap(flatten)]
    opts:   ReportOpts,
    #[clap(flatten)]
    common: Common,
}

#[derive(Parser, Clone, Debug)]
struct Manage {
    #[clap(flatten, next_help_heading = "Report options (ignored)")]
    _opts:  ReportOpts,
    #[clap(flatten)]
    common: Common,
}

#[derive(Parser, Clone, Debug)]
enum SubCommand {
    Report(Report),
    /// Reset zone(s)
    Reset(Manage),
    /// Explicitly open zone(s)
    Open(Manage),
    /// Close zone(s)
    Close(Manage),
    /// Finish zone(s)
    Finish(Manage),
}

impl SubCommand {
    fn common(&self) -> &Common {
        match self {
            SubCommand::Report(report) => &report.common,
            SubCommand::Reset(m) |
            SubCommand::Open(m) |
            SubCommand::Close(m) |
            SubCommand::Finish(m) => &m.common,
        }
    }

    fn command(&self) -> Command {
        match self {
            SubCommand::Report(_) => Command::Report,
            SubCommand::Reset(_) => Command::Manage(ZoneOp::Reset),
            SubCommand::Open(_) => Command::Manage(ZoneOp::Open),
            SubCommand::Close(_) => Command::Manage(ZoneOp::Close),
            SubCommand::Finish(_) => Command::Manage(ZoneOp::Finish),
        }
    }

    fn request(&self) -> Request {
        let common = self.common();
        let mut req = Request::new(self.command());
        req.range = ByteRange::new(common.ofst, common.len);
        req.unit = common.unit;
        req.info = common.info;
        if let SubCommand::Report(report) = self {
            req.csv = report.opts.csv;
            req.count_only = report.opts.count;
            req.filter = report.opts.filter;
        }
        req
    }
}

#[derive(Parser, Clone, Debug)]
#[clap(version = crate_version!())]
/// Inspect and manage the zones of a zoned block device
struct Cli {
    #[clap(subcommand)]
    cmd: SubCommand,
}

/// Rewrite single-dash long options, like "-ofst", as "--ofst"
fn normalize_args<I>(args: I) -> Vec<OsString>
    where I: IntoIterator<Item = OsString>
{
    args.into_iter()
        .map(|arg| {
            match arg.to_str() {
                Some(s) if SINGLE_DASH_LONG.contains(&s) => {
                    OsString::from(format!("-{s}"))
                }
                _ => arg,
            }
        }).collect()
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cmd: &SubCommand) -> Result<()> {
    let common = cmd.common();
    let req = cmd.request();
    let cfg = DeviceConfig::new(req.command.access_mode())
        .verbose(common.verbose);
    tracing::debug!(?req, device = %common.device.display(), "executing");
    let dev = open_device(&common.device, &cfg)?;
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    execute(&*dev, &common.device, &req, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Parse the command line.  Requests for help or the version are returned
/// as `Ok(None)`, after printing them.
fn parse_args<I>(args: I) -> Result<Option<Cli>>
    where I: IntoIterator<Item = OsString>
{
    match Cli::try_parse_from(normalize_args(args)) {
        Ok(cli) => Ok(Some(cli)),
        Err(e) if e.use_stderr() => {
            let msg = e.render().to_string();
            Err(Error::InvalidCommand(msg.trim_end().to_owned()))
        }
        Err(e) => {
            e.print()?;
            Ok(None)
        }
    }
}

fn main() {
    let cli = match parse_args(std::env::args_os()) {
        Ok(Some(cli)) => cli,
        Ok(None) => exit(0),
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };
    init_logging(cli.cmd.common().verbose);
    if let Err(e) = run(&cli.cmd) {
        eprintln!("{e}");
        exit(1);
    }
}
