// vim: tw=80

use std::{
    fs::{self, File, OpenOptions},
    io,
    mem,
    os::unix::{
        fs::{FileTypeExt, MetadataExt, OpenOptionsExt},
        io::{AsRawFd, RawFd},
    },
    path::{Path, PathBuf},
    slice,
};

use nix::{
    errno::Errno,
    sys::stat::{major, minor},
};

use crate::{
    device::*,
    geometry::DeviceGeometry,
    range::ByteRange,
    types::*,
    zone::{ReportFilter, Zone},
};

/// FFI definitions from `<linux/blkzoned.h>` and `<linux/fs.h>`.  The ioctls
/// can't go in libc because they use Nix's macros.
#[doc(hidden)]
#[allow(non_camel_case_types)]
mod ffi {
    use nix::{
        ioctl_read,
        ioctl_read_bad,
        ioctl_readwrite,
        ioctl_write_ptr,
        libc::{c_int, size_t},
        request_code_none,
        request_code_read,
    };

    /// The `capacity` field of each `blk_zone` is valid
    pub const BLK_ZONE_REP_CAPACITY: u32 = 1 << 0;

    #[repr(C)]
    #[derive(Clone, Copy, Debug)]
    pub struct blk_zone {
        /// Zone start sector
        pub start:    u64,
        /// Zone length in sectors
        pub len:      u64,
        /// Write pointer position, in sectors
        pub wp:       u64,
        pub type_:    u8,
        pub cond:     u8,
        pub non_seq:  u8,
        pub reset:    u8,
        pub resv:     [u8; 4],
        /// Zone capacity in sectors
        pub capacity: u64,
        pub reserved: [u8; 24],
    }

    /// Header of a zone report.  The kernel fills in up to `nr_zones`
    /// `blk_zone` structures immediately following it.
    #[repr(C)]
    #[derive(Clone, Copy, Debug)]
    pub struct blk_zone_report {
        pub sector:   u64,
        pub nr_zones: u32,
        pub flags:    u32,
    }

    #[repr(C)]
    #[derive(Clone, Copy, Debug)]
    pub struct blk_zone_range {
        pub sector:     u64,
        pub nr_sectors: u64,
    }

    ioctl_read_bad!(blksszget, request_code_none!(0x12, 104), c_int);
    // The request code is defined in terms of size_t, but the kernel always
    // writes a 64-bit value.
    ioctl_read_bad! {
        blkgetsize64,
        request_code_read!(0x12, 114, std::mem::size_of::<size_t>()),
        u64
    }
    ioctl_read_bad!(blkpbszget, request_code_none!(0x12, 123), c_int);
    ioctl_readwrite!(blkreportzone, 0x12, 130, blk_zone_report);
    ioctl_write_ptr!(blkresetzone, 0x12, 131, blk_zone_range);
    ioctl_read!(blkgetzonesz, 0x12, 132, u32);
    ioctl_read!(blkgetnrzones, 0x12, 133, u32);
    ioctl_write_ptr!(blkopenzone, 0x12, 134, blk_zone_range);
    ioctl_write_ptr!(blkclosezone, 0x12, 135, blk_zone_range);
    ioctl_write_ptr!(blkfinishzone, 0x12, 136, blk_zone_range);
}

use ffi::{blk_zone, blk_zone_range, blk_zone_report};

/// Maximum number of zone descriptors fetched by one `BLKREPORTZONE`
const REPORT_BATCH: u32 = 4096;

/// Buffer for `BLKREPORTZONE`: a `blk_zone_report` header followed by an
/// array of `blk_zone`.
struct ReportBuf {
    // Stored as u64s so the structures within are suitably aligned
    words: Vec<u64>,
    nr_zones: u32,
}

impl ReportBuf {
    const HDR_WORDS: usize = mem::size_of::<blk_zone_report>() / 8;
    const ZONE_WORDS: usize = mem::size_of::<blk_zone>() / 8;

    fn new(nr_zones: u32) -> Self {
        let words = Self::HDR_WORDS + nr_zones as usize * Self::ZONE_WORDS;
        ReportBuf { words: vec![0; words], nr_zones }
    }

    /// Report the zones starting with the one containing `sector`.
    ///
    /// Return the report flags and the descriptors that the kernel filled in.
    fn report(&mut self, fd: RawFd, sector: u64)
        -> std::result::Result<(u32, &[blk_zone]), Errno>
    {
        let hdr = self.words.as_mut_ptr().cast::<blk_zone_report>();
        let (flags, n) = unsafe {
            // Safe because the buffer has room for a header plus `nr_zones`
            // descriptors, and the kernel writes no more than that.
            hdr.write(blk_zone_report {
                sector,
                nr_zones: self.nr_zones,
                flags: 0,
            });
            ffi::blkreportzone(fd, hdr)?;
            let h = hdr.read();
            (h.flags, h.nr_zones.min(self.nr_zones) as usize)
        };
        let zones = unsafe {
            // Safe because the descriptors begin right after the 16-byte
            // header, and the kernel initialized the first `n` of them.
            let p = self.words.as_ptr().add(Self::HDR_WORDS).cast::<blk_zone>();
            slice::from_raw_parts(p, n)
        };
        Ok((flags, zones))
    }
}

/// Something that answers zone reports, one batch at a time
trait ZoneSource {
    /// Report up to one batch of zones, starting with the one containing
    /// `sector`.  Return the report flags and the descriptors.
    fn report(&mut self, sector: u64)
        -> std::result::Result<(u32, &[blk_zone]), Errno>;
}

/// Report zones with `BLKREPORTZONE`
struct ReportIoctl<'a> {
    dev: &'a BlockDevice,
    buf: ReportBuf,
}

impl ZoneSource for ReportIoctl<'_> {
    fn report(&mut self, sector: u64)
        -> std::result::Result<(u32, &[blk_zone]), Errno>
    {
        let (flags, zones) = self.buf.report(self.dev.fd(), sector)?;
        if self.dev.verbose {
            tracing::debug!(path = %self.dev.path.display(), sector,
                nr_zones = zones.len(), "BLKREPORTZONE");
        }
        Ok((flags, zones))
    }
}

/// Number of descriptors to request per report, when stopping after `limit`
/// matches
fn batch_size(limit: Option<u32>) -> u32 {
    limit.unwrap_or(REPORT_BATCH).clamp(1, REPORT_BATCH)
}

/// Visit every zone touched by `range` that matches `filter`, stopping after
/// `limit` matches, if given.
fn walk_zones<S, F>(src: &mut S, range: ByteRange, filter: ReportFilter,
                    limit: Option<u32>, mut f: F)
    -> std::result::Result<(), Errno>
    where S: ZoneSource + ?Sized,
          F: FnMut(Zone)
{
    if limit == Some(0) {
        return Ok(());
    }
    let end = range.end() / SECTOR_SIZE;
    let mut sector = range.offset / SECTOR_SIZE;
    let mut matched = 0u32;

    while sector < end {
        let (flags, blkzones) = src.report(sector)?;
        if blkzones.is_empty() {
            break;
        }
        for bz in blkzones {
            if bz.start >= end || bz.len == 0 {
                return Ok(());
            }
            sector = bz.start + bz.len;
            let zone = Zone::from_blk_zone(bz, flags);
            if filter.matches(&zone) {
                f(zone);
                matched += 1;
                if limit.is_some_and(|l| matched >= l) {
                    return Ok(());
                }
            }
        }
    }
    Ok(())
}

impl Zone {
    fn from_blk_zone(bz: &blk_zone, flags: u32) -> Self {
        let len = bz.len * SECTOR_SIZE;
        let capacity = if flags & ffi::BLK_ZONE_REP_CAPACITY != 0 {
            bz.capacity * SECTOR_SIZE
        } else {
            len
        };
        Zone {
            start: bz.start * SECTOR_SIZE,
            len,
            capacity,
            wp: bz.wp * SECTOR_SIZE,
            zone_type: bz.type_.into(),
            cond: bz.cond.into(),
            non_seq: bz.non_seq != 0,
            reset: bz.reset != 0,
        }
    }
}

fn os_errno(e: &io::Error) -> Errno {
    e.raw_os_error().map(Errno::from_raw).unwrap_or(Errno::EIO)
}

/// Read a sysfs attribute, if present
fn sysfs_attr(dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(dir.join(name))
        .ok()
        .map(|s| s.trim().to_owned())
}

/// Read a numeric sysfs attribute.  A missing attribute reads as 0.
fn sysfs_u32(dir: &Path, name: &str) -> u32 {
    sysfs_attr(dir, name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// `BlockDevice`: a Linux zoned block device, accessed through the kernel's
/// zone ioctls.
///
/// The device is closed when this object is dropped.
#[derive(Debug)]
pub struct BlockDevice {
    file:     File,
    geometry: DeviceGeometry,
    /// The name used to open this device
    path:     PathBuf,
    verbose:  bool,
}

impl ZonedDevice for BlockDevice {
    fn geometry(&self) -> &DeviceGeometry {
        &self.geometry
    }

    fn query_zones(&self, range: ByteRange, filter: ReportFilter,
                   max_zones: u32)
        -> std::result::Result<Vec<Zone>, Errno>
    {
        let cap = max_zones.min(REPORT_BATCH) as usize;
        let mut zones = Vec::with_capacity(cap);
        self.walk(range, filter, Some(max_zones), |z| zones.push(z))?;
        Ok(zones)
    }

    fn count_zones(&self, range: ByteRange, filter: ReportFilter)
        -> std::result::Result<u32, Errno>
    {
        let mut n = 0;
        self.walk(range, filter, None, |_| n += 1)?;
        Ok(n)
    }

    fn request_transition(&self, op: ZoneOp, range: ByteRange)
        -> std::result::Result<(), Errno>
    {
        let zr = blk_zone_range {
            sector:     range.offset / SECTOR_SIZE,
            nr_sectors: range.len / SECTOR_SIZE,
        };
        if self.verbose {
            tracing::debug!(path = %self.path.display(), %op,
                sector = zr.sector, nr_sectors = zr.nr_sectors,
                "zone management ioctl");
        }
        let fd = self.fd();
        let r = unsafe {
            match op {
                ZoneOp::Reset => ffi::blkresetzone(fd, &zr),
                ZoneOp::Open => ffi::blkopenzone(fd, &zr),
                ZoneOp::Close => ffi::blkclosezone(fd, &zr),
                ZoneOp::Finish => ffi::blkfinishzone(fd, &zr),
            }
        };
        r.map(drop)
    }
}

impl BlockDevice {
    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Open a zoned block device
    ///
    /// * `path`:   Pathname of the device node
    /// * `cfg`:    Access mode and logging options
    pub fn open<P: AsRef<Path>>(path: P, cfg: &DeviceConfig) -> Result<Self> {
        let path = path.as_ref();
        let fail = |e: Errno| Error::open_failed(path, e);
        let file = OpenOptions::new()
            .read(true)
            .write(cfg.access == AccessMode::ReadWrite)
            .custom_flags(libc::O_LARGEFILE)
            .open(path)
            .map_err(|e| fail(os_errno(&e)))?;
        let md = file.metadata()
            .map_err(|e| fail(os_errno(&e)))?;
        if !md.file_type().is_block_device() {
            return Err(fail(Errno::ENOTBLK));
        }

        let mut sysdir = PathBuf::from(format!("/sys/dev/block/{}:{}",
            major(md.rdev()), minor(md.rdev())));
        if sysdir.join("partition").exists() {
            // Partitions share the queue attributes of their parent
            sysdir.push("..");
        }
        let queue = sysdir.join("queue");
        let model = sysfs_attr(&queue, "zoned")
            .and_then(|s| ZoneModel::from_sysfs(&s))
            .unwrap_or(ZoneModel::NotZoned);
        if model == ZoneModel::NotZoned {
            return Err(Error::DeviceOpenFailed {
                path:   path.to_owned(),
                reason: OpenFailure::NotZoned,
            });
        }

        let fd = file.as_raw_fd();
        let mut bytes = 0u64;
        let mut lblock_size: libc::c_int = 0;
        let mut pblock_size: libc::c_int = 0;
        let mut zone_sectors = 0u32;
        let mut nr_zones = 0u32;
        unsafe {
            ffi::blkgetsize64(fd, &mut bytes).map_err(fail)?;
            ffi::blksszget(fd, &mut lblock_size).map_err(fail)?;
            ffi::blkpbszget(fd, &mut pblock_size).map_err(fail)?;
            ffi::blkgetzonesz(fd, &mut zone_sectors).map_err(fail)?;
            ffi::blkgetnrzones(fd, &mut nr_zones).map_err(fail)?;
        }
        if zone_sectors == 0 || lblock_size <= 0 || pblock_size <= 0 {
            return Err(Error::DeviceOpenFailed {
                path:   path.to_owned(),
                reason: OpenFailure::NotZoned,
            });
        }

        let devdir = sysdir.join("device");
        let vendor_id = ["vendor", "model", "rev"].iter()
            .filter_map(|attr| sysfs_attr(&devdir, attr))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let lblock_size = lblock_size as u32;
        let pblock_size = pblock_size as u32;
        let geometry = DeviceGeometry {
            vendor_id: if vendor_id.is_empty() {
                String::from("Unknown")
            } else {
                vendor_id
            },
            model,
            nr_sectors: bytes / SECTOR_SIZE,
            lblock_size,
            nr_lblocks: bytes / u64::from(lblock_size),
            pblock_size,
            nr_pblocks: bytes / u64::from(pblock_size),
            zone_size: u64::from(zone_sectors) * SECTOR_SIZE,
            nr_zones,
            max_open_zones: sysfs_u32(&queue, "max_open_zones"),
            max_active_zones: sysfs_u32(&queue, "max_active_zones"),
        };
        if !geometry.is_consistent() {
            return Err(fail(Errno::EINVAL));
        }
        if cfg.verbose {
            tracing::debug!(path = %path.display(), ?geometry,
                access = ?cfg.access, "opened zoned block device");
        }
        Ok(BlockDevice {
            file,
            geometry,
            path: path.to_owned(),
            verbose: cfg.verbose,
        })
    }

    fn walk<F>(&self, range: ByteRange, filter: ReportFilter,
               limit: Option<u32>, f: F)
        -> std::result::Result<(), Errno>
        where F: FnMut(Zone)
    {
        let mut src = ReportIoctl {
            dev: self,
            buf: ReportBuf::new(batch_size(limit)),
        };
        walk_zones(&mut src, range, filter, limit, f)
    }
}

// LCOV_EXCL_STOP
