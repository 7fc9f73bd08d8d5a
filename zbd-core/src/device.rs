// vim: tw=80

use std::path::Path;

use cfg_if::cfg_if;
#[cfg(test)] use mockall::automock;
use nix::errno::Errno;

use crate::{
    geometry::DeviceGeometry,
    range::ByteRange,
    types::*,
    zone::{ReportFilter, Zone},
};

/// Options that control how a device is opened
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeviceConfig {
    pub access:  AccessMode,
    /// Log every zone ioctl issued to the device
    pub verbose: bool,
}

impl DeviceConfig {
    pub fn new(access: AccessMode) -> Self {
        DeviceConfig { access, verbose: false }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// ZonedDevice: an open handle to a zoned block device
///
/// Implementors own the device handle and release it on `Drop`.  All methods
/// block until the device answers.  Errors are the device's own errno values,
/// uninterpreted.
#[cfg_attr(test, automock)]
pub trait ZonedDevice {
    /// The device's layout, as discovered when it was opened
    fn geometry(&self) -> &DeviceGeometry;

    /// Return the zones touched by `range` that match `filter`, in ascending
    /// order of start offset.
    ///
    /// No more than `max_zones` zones will be returned.
    fn query_zones(&self, range: ByteRange, filter: ReportFilter,
                   max_zones: u32)
        -> std::result::Result<Vec<Zone>, Errno>;

    /// Count the zones touched by `range` that match `filter`, without
    /// transferring their descriptors.
    fn count_zones(&self, range: ByteRange, filter: ReportFilter)
        -> std::result::Result<u32, Errno>;

    /// Ask the device to perform `op` on every zone in `range`.
    ///
    /// `range` must be zone-aligned.  The device decides whether the
    /// transition is legal for each zone's current condition.
    fn request_transition(&self, op: ZoneOp, range: ByteRange)
        -> std::result::Result<(), Errno>;
}

/// Open the zoned block device at `path`.
pub fn open_device(path: &Path, cfg: &DeviceConfig)
    -> Result<Box<dyn ZonedDevice>>
{
    cfg_if! {
        if #[cfg(target_os = "linux")] {
            let dev = crate::blkdev::BlockDevice::open(path, cfg)?;
            Ok(Box::new(dev))
        } else {
            // Zone ioctls are only available on Linux
            let _ = cfg;
            Err(Error::open_failed(path, Errno::EOPNOTSUPP))
        }
    }
}

// LCOV_EXCL_STOP
