// vim: tw=80
//! Validation of the byte ranges that every command operates on
//!
//! Every command must use whole sectors.  Commands that change zone conditions
//! must additionally cover whole zones, because the device cannot reset, open,
//! close, or finish part of a zone.  Reports may cover any sector-aligned
//! range, and include every zone that the range touches.

use std::num::NonZeroU64;

use crate::{
    geometry::DeviceGeometry,
    types::*,
    util::*,
};

/// A `[offset, offset + len)` interval of device bytes
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ByteRange {
    pub offset: u64,
    pub len:    u64,
}

impl ByteRange {
    pub fn new(offset: u64, len: u64) -> Self {
        ByteRange { offset, len }
    }

    /// First byte past the end of the range
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Granularity that a range must respect
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Alignment {
    /// Whole 512-byte sectors
    Sector,
    /// Whole zones
    Zone,
}

impl Command {
    /// The alignment that this command's range must have
    pub fn alignment(self) -> Alignment {
        match self {
            Command::Report => Alignment::Sector,
            Command::Manage(_) => Alignment::Zone,
        }
    }
}

/// Normalize and validate a caller-supplied range.
///
/// * A `len` of 0 means "to the end of the device".
/// * A range extending past the end of the device is truncated.
/// * A range starting at or past the end of the device is valid but empty.
///   Operating on it must be a no-op.
///
/// With `Alignment::Zone` the range must begin on a zone boundary and must
/// either end on a zone boundary or at the end of the device.
pub fn validate(range: ByteRange, geo: &DeviceGeometry, alignment: Alignment)
    -> Result<ByteRange>
{
    if !is_aligned(range.offset, SECTOR_SIZE) ||
        !is_aligned(range.len, SECTOR_SIZE)
    {
        return Err(Error::MisalignedSector);
    }

    let capacity = geo.capacity();
    if range.offset >= capacity {
        return Ok(ByteRange::new(range.offset, 0));
    }

    let remaining = capacity - range.offset;
    let len = if range.len == 0 {
        remaining
    } else {
        range.len.min(remaining)
    };
    let normalized = ByteRange::new(range.offset, len);

    if alignment == Alignment::Zone {
        let zone_size = geo.zone_size;
        if !is_aligned(normalized.offset, zone_size) ||
            (!is_aligned(normalized.len, zone_size) &&
             normalized.end() != capacity)
        {
            return Err(Error::MisalignedZone);
        }
    }
    Ok(normalized)
}

/// Validate the unit used to display offsets and lengths.
///
/// It must be 1, or a multiple of the sector size no larger than a zone.
pub fn validate_unit(unit: u64, geo: &DeviceGeometry) -> Result<NonZeroU64> {
    let nzunit = NonZeroU64::new(unit).ok_or(Error::InvalidUnit)?;
    if unit == 1 ||
        (is_aligned(unit, SECTOR_SIZE) && unit <= geo.zone_size)
    {
        Ok(nzunit)
    } else {
        Err(Error::InvalidUnit)
    }
}

// LCOV_EXCL_STOP
