// vim: tw=80

// I use a common pattern to substitute mock objects for real ones in test
// builds.  Silence clippy's complaints.
#![allow(clippy::module_inception)]

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_os = "linux")] {
        pub mod blkdev;
    }
}
pub mod controller;
pub mod device;
pub mod format;
pub mod geometry;
pub mod mgmt;
pub mod range;
pub mod report;
pub mod types;
pub mod util;
pub mod zone;

pub use crate::types::*;
pub use crate::util::*;
