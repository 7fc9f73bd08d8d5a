// vim: tw=80
//! Common type definitions used throughout zbd

use std::{
    fmt::{self, Display, Formatter},
    io,
    path::PathBuf,
};

use nix::errno::Errno;
use num_enum::{FromPrimitive, IntoPrimitive};
use thiserror::Error;

/// Size of the unit used by every zone ioctl: a 512-byte sector, regardless of
/// the device's logical block size.
pub const SECTOR_SIZE: u64 = 512;

/// Why a device could not be opened
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpenFailure {
    /// The device is a block device, but not a zoned one
    NotZoned,
    Os(Errno),
}

impl Display for OpenFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotZoned => "not a zoned block device".fmt(f),
            Self::Os(e) => e.desc().fmt(f),
        }
    }
}

/// zbd's error type.
///
/// Every variant is terminal for the invocation that produced it.  Errors that
/// originate in the device carry the device's errno unmodified.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("{0}")]
    InvalidCommand(String),
    #[error("Invalid unaligned offset/length")]
    MisalignedSector,
    #[error("Invalid unaligned zone offset/length")]
    MisalignedZone,
    #[error("Invalid unit")]
    InvalidUnit,
    #[error("Open {} failed ({reason})", path.display())]
    DeviceOpenFailed {
        path:   PathBuf,
        reason: OpenFailure,
    },
    #[error("Report zones failed {} ({})", code(.0), .0.desc())]
    QueryFailed(Errno),
    #[error("Zone operation failed {} ({})", code(.0), .0.desc())]
    OperationFailed(Errno),
    #[error("Output error: {}", .0.desc())]
    Io(Errno),
}

impl Error {
    /// Build a `DeviceOpenFailed` from an OS error.
    pub fn open_failed<P: Into<PathBuf>>(path: P, errno: Errno) -> Self {
        Error::DeviceOpenFailed {
            path:   path.into(),
            reason: OpenFailure::Os(errno),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e.raw_os_error().map(Errno::from_raw).unwrap_or(Errno::EIO))
    }
}

impl From<nix::Error> for Error {
    fn from(e: nix::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

fn code(e: &Errno) -> i32 {
    *e as i32
}

/// Zone model of a device, as reported by the block layer
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ZoneModel {
    /// A regular block device, or a host-aware device used as one
    NotZoned,
    HostAware,
    HostManaged,
}

impl ZoneModel {
    /// Parse the contents of the sysfs `queue/zoned` attribute
    pub fn from_sysfs(s: &str) -> Option<Self> {
        match s.trim() {
            "none" => Some(ZoneModel::NotZoned),
            "host-aware" => Some(ZoneModel::HostAware),
            "host-managed" => Some(ZoneModel::HostManaged),
            _ => None,
        }
    }
}

impl Display for ZoneModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NotZoned => "Not-zoned".fmt(f),
            Self::HostAware => "Host-aware".fmt(f),
            Self::HostManaged => "Host-managed".fmt(f),
        }
    }
}

/// Zone type, using the kernel's `blk_zone_type` codes.
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, IntoPrimitive, PartialEq)]
#[repr(u8)]
pub enum ZoneType {
    Conventional = 0x1,
    SeqWriteRequired = 0x2,
    SeqWritePreferred = 0x3,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl ZoneType {
    /// Abbreviated name, as used by the human-readable report
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Conventional => "cnv",
            Self::SeqWriteRequired => "swr",
            Self::SeqWritePreferred => "swp",
            Self::Unknown(_) => "???",
        }
    }
}

/// Zone condition, using the kernel's `blk_zone_cond` codes.
///
/// Only the device changes a zone's condition.  zbd merely decodes what the
/// device reports.
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, IntoPrimitive, PartialEq)]
#[repr(u8)]
pub enum ZoneCondition {
    NotWp = 0x0,
    Empty = 0x1,
    ImplicitOpen = 0x2,
    ExplicitOpen = 0x3,
    Closed = 0x4,
    ReadOnly = 0xD,
    Full = 0xE,
    Offline = 0xF,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl ZoneCondition {
    /// Abbreviated name, as used by the human-readable report
    pub fn short_name(self) -> &'static str {
        match self {
            Self::NotWp => "nw",
            Self::Empty => "em",
            Self::ImplicitOpen => "oi",
            Self::ExplicitOpen => "oe",
            Self::Closed => "cl",
            Self::ReadOnly => "ro",
            Self::Full => "fu",
            Self::Offline => "ol",
            Self::Unknown(_) => "??",
        }
    }
}

/// How a device handle must be opened
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

/// A zone lifecycle transition that can be requested of the device
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ZoneOp {
    /// Return the zones to Empty, rewinding their write pointers
    Reset,
    /// Explicitly open the zones
    Open,
    Close,
    /// Transition the zones to Full
    Finish,
}

impl Display for ZoneOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Reset => "reset".fmt(f),
            Self::Open => "open".fmt(f),
            Self::Close => "close".fmt(f),
            Self::Finish => "finish".fmt(f),
        }
    }
}

/// Everything that zbd can be asked to do with a device
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Report,
    Manage(ZoneOp),
}

// LCOV_EXCL_STOP
