// vim: tw=80
//! Text rendering of device information and zone reports

use std::{
    io::Write,
    num::NonZeroU64,
    path::Path,
};

use crate::{
    geometry::DeviceGeometry,
    types::*,
    zone::Zone,
};

const CSV_HEADER: &str =
    "zone num, type, ofst, len, cap, wp, cond, non_seq, reset";

/// Output style for zone reports
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Style {
    #[default]
    Human,
    Csv,
}

fn limit(n: u32) -> String {
    if n == 0 {
        String::from("no limit")
    } else {
        n.to_string()
    }
}

/// Print the device information block
pub fn print_info<W>(out: &mut W, path: &Path, geo: &DeviceGeometry)
    -> Result<()>
    where W: Write
{
    writeln!(out, "Device {}:", path.display())?;
    writeln!(out, "    Vendor ID: {}", geo.vendor_id)?;
    writeln!(out, "    Zone model: {}", geo.model)?;
    writeln!(out, "    Capacity: {:.3} GB ({} 512-bytes sectors)",
             geo.capacity() as f64 / 1_000_000_000.0, geo.nr_sectors)?;
    writeln!(out, "    Logical blocks: {} blocks of {} B",
             geo.nr_lblocks, geo.lblock_size)?;
    writeln!(out, "    Physical blocks: {} blocks of {} B",
             geo.nr_pblocks, geo.pblock_size)?;
    writeln!(out, "    Zones: {} zones of {:.1} MB",
             geo.nr_zones, geo.zone_size as f64 / 1_048_576.0)?;
    writeln!(out, "    Maximum number of open zones: {}",
             limit(geo.max_open_zones))?;
    writeln!(out, "    Maximum number of active zones: {}",
             limit(geo.max_active_zones))?;
    Ok(())
}

/// Print one line describing `zone`, scaling offsets and lengths by `unit`.
pub fn print_zone<W>(out: &mut W, geo: &DeviceGeometry, zone: &Zone,
                     unit: NonZeroU64, style: Style)
    -> Result<()>
    where W: Write
{
    let zno = geo.zone_no(zone);
    let u = unit.get();
    if style == Style::Csv {
        writeln!(out,
            "{:05}, {}, {:014}, {:014}, {:014}, {:014}, 0x{:01x}, {}, {}",
            zno, u8::from(zone.zone_type), zone.start / u, zone.len / u,
            zone.capacity / u, zone.wp / u, u8::from(zone.cond),
            u8::from(zone.non_seq), u8::from(zone.reset))?;
    } else if zone.is_conventional() {
        writeln!(out, "Zone {:05}: {}, ofst {:014}, len {:014}, cap {:014}",
            zno, zone.zone_type.short_name(), zone.start / u, zone.len / u,
            zone.capacity / u)?;
    } else if zone.is_sequential() {
        writeln!(out,
            "Zone {:05}: {}, ofst {:014}, len {:014}, cap {:014}, wp {:014}, \
             {}, non_seq {}, reset {}",
            zno, zone.zone_type.short_name(), zone.start / u, zone.len / u,
            zone.capacity / u, zone.wp / u, zone.cond.short_name(),
            u8::from(zone.non_seq), u8::from(zone.reset))?;
    } else {
        writeln!(out,
            "Zone {:05}: unknown type 0x{:01x}, ofst {:014}, len {:014}",
            zno, u8::from(zone.zone_type), zone.start / u, zone.len / u)?;
    }
    Ok(())
}

/// Print a list of zones, preceded by a header line in CSV style
pub fn print_zones<W>(out: &mut W, geo: &DeviceGeometry, zones: &[Zone],
                      unit: NonZeroU64, style: Style)
    -> Result<()>
    where W: Write
{
    if style == Style::Csv {
        writeln!(out, "{CSV_HEADER}")?;
    }
    for zone in zones {
        print_zone(out, geo, zone, unit, style)?;
    }
    Ok(())
}

/// Print the number of zones matched by a report
pub fn print_count<W>(out: &mut W, geo: &DeviceGeometry, n: u32, style: Style)
    -> Result<()>
    where W: Write
{
    match style {
        Style::Csv => writeln!(out, "{n}")?,
        Style::Human => writeln!(out, "{} / {} zones", n, geo.nr_zones)?,
    }
    Ok(())
}

// LCOV_EXCL_STOP
