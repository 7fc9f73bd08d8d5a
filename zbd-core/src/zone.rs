// vim: tw=80
//! Zone snapshots and the predicates used to select them

use std::{
    fmt,
    str::FromStr,
};

use crate::types::*;

/// One zone, as reported by the device at the time of the query.
///
/// All offsets and lengths are in bytes.  A `Zone` is only a snapshot: the
/// device may change its condition at any time afterwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Zone {
    /// Device offset of the first byte of the zone
    pub start:     u64,
    pub len:       u64,
    /// Number of writable bytes.  Never larger than `len`.
    pub capacity:  u64,
    /// Device offset of the write pointer.  Only meaningful for sequential
    /// zones.
    pub wp:        u64,
    pub zone_type: ZoneType,
    pub cond:      ZoneCondition,
    /// Non-sequential write resources are active
    pub non_seq:   bool,
    /// The device recommends resetting the write pointer
    pub reset:     bool,
}

impl Zone {
    /// Offset of the first byte past the end of the zone
    pub fn end(&self) -> u64 {
        self.start + self.len
    }

    pub fn is_conventional(&self) -> bool {
        self.zone_type == ZoneType::Conventional
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self.zone_type,
                 ZoneType::SeqWriteRequired | ZoneType::SeqWritePreferred)
    }
}

/// Selects which zones a report includes.
///
/// The device (or whatever stands in for it) applies the filter; callers must
/// not filter the result again.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReportFilter {
    #[default]
    All,
    Empty,
    ImplicitOpen,
    ExplicitOpen,
    Closed,
    Full,
    ReadOnly,
    Offline,
    /// Conventional zones, i.e. zones without a write pointer
    NotWp,
    /// Zones with non-sequential write resources active
    NonSeq,
    /// Zones for which a write pointer reset is recommended
    ResetRecommended,
}

impl ReportFilter {
    /// Should `zone` be included in a report using this filter?
    pub fn matches(self, zone: &Zone) -> bool {
        match self {
            Self::All => true,
            Self::Empty => zone.cond == ZoneCondition::Empty,
            Self::ImplicitOpen => zone.cond == ZoneCondition::ImplicitOpen,
            Self::ExplicitOpen => zone.cond == ZoneCondition::ExplicitOpen,
            Self::Closed => zone.cond == ZoneCondition::Closed,
            Self::Full => zone.cond == ZoneCondition::Full,
            Self::ReadOnly => zone.cond == ZoneCondition::ReadOnly,
            Self::Offline => zone.cond == ZoneCondition::Offline,
            Self::NotWp => zone.cond == ZoneCondition::NotWp,
            Self::NonSeq => zone.non_seq,
            Self::ResetRecommended => zone.reset,
        }
    }
}

impl fmt::Display for ReportFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Empty => "em",
            Self::ImplicitOpen => "oi",
            Self::ExplicitOpen => "oe",
            Self::Closed => "cl",
            Self::Full => "fu",
            Self::ReadOnly => "ro",
            Self::Offline => "ol",
            Self::NotWp => "nw",
            Self::NonSeq => "ns",
            Self::ResetRecommended => "rw",
        };
        s.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseFilterError(String);

impl fmt::Display for ParseFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown report option \"{}\"", self.0)
    }
}

impl std::error::Error for ParseFilterError {}

impl FromStr for ReportFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseFilterError> {
        match s {
            "all" => Ok(Self::All),
            "em" => Ok(Self::Empty),
            "oi" => Ok(Self::ImplicitOpen),
            "oe" => Ok(Self::ExplicitOpen),
            "cl" => Ok(Self::Closed),
            "fu" => Ok(Self::Full),
            "ro" => Ok(Self::ReadOnly),
            "ol" => Ok(Self::Offline),
            "nw" => Ok(Self::NotWp),
            "ns" => Ok(Self::NonSeq),
            "rw" => Ok(Self::ResetRecommended),
            _ => Err(ParseFilterError(s.to_owned())),
        }
    }
}

// LCOV_EXCL_STOP
