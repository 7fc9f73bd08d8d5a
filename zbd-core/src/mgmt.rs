// vim: tw=80
//! Zone condition transitions: reset, open, close, and finish

use crate::{
    device::ZonedDevice,
    range::ByteRange,
    types::*,
};

impl Command {
    /// How the device must be opened to carry out this command
    pub fn access_mode(self) -> AccessMode {
        match self {
            Command::Report => AccessMode::ReadOnly,
            Command::Manage(_) => AccessMode::ReadWrite,
        }
    }
}

/// Ask the device to apply `op` to every zone in `range`.
///
/// `range` must already be validated with zone alignment.  Whether the
/// transition is legal is up to the device.  A failure may leave some zones
/// transitioned.
#[tracing::instrument(skip(dev))]
pub fn manage<D>(dev: &D, op: ZoneOp, range: &ByteRange) -> Result<()>
    where D: ZonedDevice + ?Sized
{
    if range.is_empty() {
        return Ok(());
    }
    dev.request_transition(op, *range)
        .map_err(Error::OperationFailed)
}

// LCOV_EXCL_STOP
