// vim: tw=80
//! Functional tests that run the core against an in-memory zoned device

use std::cell::RefCell;

use nix::errno::Errno;

use zbd_core::{
    device::ZonedDevice,
    geometry::DeviceGeometry,
    range::ByteRange,
    types::*,
    util::*,
    zone::{ReportFilter, Zone},
};

const MIB: u64 = 1 << 20;

/// A zoned device that lives entirely in memory.
///
/// Sequential zones follow the usual condition state machine, simplified.
/// Transitions on conventional zones, or on ranges that aren't zone aligned,
/// fail with `EINVAL` and change nothing.
#[derive(Debug)]
struct Emulator {
    geometry: DeviceGeometry,
    zones:    RefCell<Vec<Zone>>,
}

impl Emulator {
    fn zones(&self) -> Vec<Zone> {
        self.zones.borrow().clone()
    }

    /// Emulate a write of `len` bytes at the write pointer of zone `i`
    fn write(&self, i: usize, len: u64) {
        let mut zones = self.zones.borrow_mut();
        let z = &mut zones[i];
        assert!(z.is_sequential());
        z.wp += len;
        assert!(z.wp <= z.start + z.capacity);
        z.cond = if z.wp == z.start + z.capacity {
            ZoneCondition::Full
        } else if z.cond == ZoneCondition::ExplicitOpen {
            ZoneCondition::ExplicitOpen
        } else {
            ZoneCondition::ImplicitOpen
        };
    }

    fn touched(zone: &Zone, range: &ByteRange) -> bool {
        zone.start < range.end() && zone.end() > range.offset
    }
}

impl ZonedDevice for Emulator {
    fn geometry(&self) -> &DeviceGeometry {
        &self.geometry
    }

    fn query_zones(&self, range: ByteRange, filter: ReportFilter,
                   max_zones: u32)
        -> std::result::Result<Vec<Zone>, Errno>
    {
        Ok(self.zones.borrow()
            .iter()
            .filter(|z| Self::touched(z, &range))
            .filter(|z| filter.matches(z))
            .take(max_zones as usize)
            .copied()
            .collect())
    }

    fn count_zones(&self, range: ByteRange, filter: ReportFilter)
        -> std::result::Result<u32, Errno>
    {
        Ok(self.zones.borrow()
            .iter()
            .filter(|z| Self::touched(z, &range))
            .filter(|z| filter.matches(z))
            .count() as u32)
    }

    fn request_transition(&self, op: ZoneOp, range: ByteRange)
        -> std::result::Result<(), Errno>
    {
        let zs = self.geometry.zone_size;
        if !is_aligned(range.offset, zs) ||
            (!is_aligned(range.len, zs) &&
             range.end() != self.geometry.capacity())
        {
            return Err(Errno::EINVAL);
        }
        let mut zones = self.zones.borrow_mut();
        let targets = zones.iter_mut()
            .filter(|z| Self::touched(z, &range))
            .collect::<Vec<_>>();
        if targets.iter().any(|z| !z.is_sequential()) {
            return Err(Errno::EINVAL);
        }
        for z in targets {
            match op {
                ZoneOp::Reset => {
                    z.wp = z.start;
                    z.cond = ZoneCondition::Empty;
                }
                ZoneOp::Open => {
                    if z.cond != ZoneCondition::Full {
                        z.cond = ZoneCondition::ExplicitOpen;
                    }
                }
                ZoneOp::Close => {
                    if matches!(z.cond, ZoneCondition::ImplicitOpen |
                                        ZoneCondition::ExplicitOpen)
                    {
                        z.cond = if z.wp == z.start {
                            ZoneCondition::Empty
                        } else {
                            ZoneCondition::Closed
                        };
                    }
                }
                ZoneOp::Finish => {
                    z.wp = z.start + z.len;
                    z.cond = ZoneCondition::Full;
                }
            }
        }
        Ok(())
    }
}

/// Helper to create a fresh emulated device
#[derive(Debug)]
struct EmulatorBuilder {
    /// Device capacity in bytes
    capacity:  u64,
    zone_size: u64,
    /// Writable bytes per zone
    zone_cap:  Option<u64>,
    /// Number of conventional zones at the start of the device
    nr_cnv:    u32,
}

impl EmulatorBuilder {
    fn build(&self) -> Emulator {
        let nr_zones = div_roundup(self.capacity, self.zone_size) as u32;
        let geometry = DeviceGeometry {
            vendor_id: String::from("zbd emulator"),
            model: ZoneModel::HostManaged,
            nr_sectors: self.capacity / SECTOR_SIZE,
            lblock_size: 4096,
            nr_lblocks: self.capacity / 4096,
            pblock_size: 4096,
            nr_pblocks: self.capacity / 4096,
            zone_size: self.zone_size,
            nr_zones,
            max_open_zones: 0,
            max_active_zones: 0,
        };
        assert!(geometry.is_consistent());
        let zones = (0..nr_zones).map(|i| {
            let start = u64::from(i) * self.zone_size;
            let len = self.zone_size.min(self.capacity - start);
            if i < self.nr_cnv {
                Zone {
                    start,
                    len,
                    capacity: len,
                    wp: u64::MAX,
                    zone_type: ZoneType::Conventional,
                    cond: ZoneCondition::NotWp,
                    non_seq: false,
                    reset: false,
                }
            } else {
                Zone {
                    start,
                    len,
                    capacity: self.zone_cap.unwrap_or(len).min(len),
                    wp: start,
                    zone_type: ZoneType::SeqWriteRequired,
                    cond: ZoneCondition::Empty,
                    non_seq: false,
                    reset: false,
                }
            }
        }).collect();
        Emulator { geometry, zones: RefCell::new(zones) }
    }

    fn capacity(&mut self, capacity: u64) -> &mut Self {
        self.capacity = capacity;
        self
    }

    fn conventional(&mut self, nr_cnv: u32) -> &mut Self {
        self.nr_cnv = nr_cnv;
        self
    }

    fn new() -> Self {
        Self {
            capacity: 1 << 30,  // 1 GiB
            zone_size: 256 * MIB,
            zone_cap: None,
            nr_cnv: 0,
        }
    }

    fn zone_capacity(&mut self, cap: u64) -> &mut Self {
        self.zone_cap = Some(cap);
        self
    }

    fn zone_size(&mut self, zone_size: u64) -> &mut Self {
        self.zone_size = zone_size;
        self
    }
}

mod mgmt;
