// vim: tw=80
//! Static description of a zoned device's layout

use crate::{types::*, util::*, zone::Zone};

/// Zone layout and block sizes of a device.
///
/// Obtained once, when the device is opened, and never modified afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceGeometry {
    /// Vendor, model and revision strings, as reported by the device
    pub vendor_id:        String,
    pub model:            ZoneModel,
    /// Total capacity in 512-byte sectors
    pub nr_sectors:       u64,
    /// Logical block size in bytes
    pub lblock_size:      u32,
    pub nr_lblocks:       u64,
    /// Physical block size in bytes
    pub pblock_size:      u32,
    pub nr_pblocks:       u64,
    /// Zone size in bytes.  Always a power of two.
    pub zone_size:        u64,
    pub nr_zones:         u32,
    /// Maximum number of simultaneously open zones.  0 means no limit.
    pub max_open_zones:   u32,
    /// Maximum number of simultaneously active zones.  0 means no limit.
    pub max_active_zones: u32,
}

impl DeviceGeometry {
    /// Device capacity in bytes
    pub fn capacity(&self) -> u64 {
        self.nr_sectors * SECTOR_SIZE
    }

    /// Does this geometry describe a usable zoned device?
    ///
    /// The zone size must be a power of two and a whole number of sectors, and
    /// the zones must cover the whole capacity.
    pub fn is_consistent(&self) -> bool {
        self.zone_size.is_power_of_two() &&
            is_aligned(self.zone_size, SECTOR_SIZE) &&
            u64::from(self.nr_zones)
                .checked_mul(self.zone_size)
                .is_some_and(|covered| covered >= self.capacity())
    }

    /// Index of the zone that starts, or contains, byte offset `ofst`
    pub fn zone_index(&self, ofst: u64) -> u32 {
        (ofst / self.zone_size) as u32
    }

    /// Index of a reported zone
    pub fn zone_no(&self, zone: &Zone) -> u32 {
        self.zone_index(zone.start)
    }
}

// LCOV_EXCL_STOP
