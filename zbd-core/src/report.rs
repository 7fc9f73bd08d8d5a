// vim: tw=80
//! Zone reports: either the zones themselves, or just how many there are

use crate::{
    device::ZonedDevice,
    range::ByteRange,
    types::*,
    util::div_roundup,
    zone::{ReportFilter, Zone},
};

/// What a report should produce
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportRequest {
    /// Only the number of matching zones.  No zone descriptors are transferred.
    Count(ReportFilter),
    /// The matching zones themselves
    Zones(ReportFilter),
}

impl ReportRequest {
    pub fn filter(self) -> ReportFilter {
        match self {
            Self::Count(f) | Self::Zones(f) => f,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Report {
    Count(u32),
    /// Matching zones, in ascending order of start offset
    Zones(Vec<Zone>),
}

/// Upper bound on the number of zones that `range` touches, including
/// partially covered zones at either end.
pub fn max_zones(range: &ByteRange, zone_size: u64) -> u32 {
    let first = range.offset / zone_size;
    let last = div_roundup(range.end(), zone_size);
    u32::try_from(last - first).unwrap_or(u32::MAX)
}

/// Report the zones within an already validated range.
///
/// The filter is applied by the device, so the result is passed through
/// as-is.
#[tracing::instrument(skip(dev))]
pub fn report<D>(dev: &D, range: &ByteRange, req: ReportRequest)
    -> Result<Report>
    where D: ZonedDevice + ?Sized
{
    if range.is_empty() {
        return Ok(match req {
            ReportRequest::Count(_) => Report::Count(0),
            ReportRequest::Zones(_) => Report::Zones(Vec::new()),
        });
    }
    match req {
        ReportRequest::Count(filter) => {
            dev.count_zones(*range, filter)
                .map(Report::Count)
                .map_err(Error::QueryFailed)
        }
        ReportRequest::Zones(filter) => {
            let bound = max_zones(range, dev.geometry().zone_size);
            let zones = dev.query_zones(*range, filter, bound)
                .map_err(Error::QueryFailed)?;
            tracing::debug!(nzones = zones.len(), "report complete");
            Ok(Report::Zones(zones))
        }
    }
}

// LCOV_EXCL_STOP
