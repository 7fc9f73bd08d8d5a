// vim: tw=80
//! Entry point for every zbd command.  One `Request` is executed against one
//! open device per invocation.

use std::{
    io::Write,
    path::Path,
};

use crate::{
    device::ZonedDevice,
    format::{self, Style},
    mgmt,
    range::{self, ByteRange},
    report::{self, Report, ReportRequest},
    types::*,
    zone::ReportFilter,
};

/// A fully parsed command, ready to execute
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Request {
    pub command:    Command,
    /// Range as given by the user.  A `len` of 0 means "to the end".
    pub range:      ByteRange,
    /// Divisor for every offset and length printed
    pub unit:       u64,
    /// Print the device information block first
    pub info:       bool,
    pub csv:        bool,
    /// Print only the number of matching zones
    pub count_only: bool,
    pub filter:     ReportFilter,
}

impl Request {
    pub fn new(command: Command) -> Self {
        Request {
            command,
            range: ByteRange::default(),
            unit: 1,
            info: false,
            csv: false,
            count_only: false,
            filter: ReportFilter::All,
        }
    }

    fn style(&self) -> Style {
        if self.csv {
            Style::Csv
        } else {
            Style::Human
        }
    }
}

/// Execute `req` against `dev`, writing any output to `out`.
///
/// `path` is only used to label the device information block.  All validation
/// happens before anything is printed or any zone is modified.  A range that
/// starts beyond the end of the device succeeds without output.
pub fn execute<D, W>(dev: &D, path: &Path, req: &Request, out: &mut W)
    -> Result<()>
    where D: ZonedDevice + ?Sized,
          W: Write
{
    let geo = dev.geometry();
    let unit = range::validate_unit(req.unit, geo)?;
    let range = range::validate(req.range, geo, req.command.alignment())?;
    if range.is_empty() {
        tracing::debug!(offset = req.range.offset,
            "range starts beyond the end of the device");
        return Ok(());
    }

    let style = req.style();
    if req.info && !(req.command == Command::Report && style == Style::Csv) {
        format::print_info(out, path, geo)?;
    }

    match req.command {
        Command::Report => {
            let rreq = if req.count_only {
                ReportRequest::Count(req.filter)
            } else {
                ReportRequest::Zones(req.filter)
            };
            match report::report(dev, &range, rreq)? {
                Report::Count(n) => format::print_count(out, geo, n, style),
                Report::Zones(zones) => {
                    format::print_zones(out, geo, &zones, unit, style)
                }
            }
        }
        Command::Manage(op) => mgmt::manage(dev, op, &range),
    }
}

// LCOV_EXCL_STOP
