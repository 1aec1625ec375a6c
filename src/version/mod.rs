//! Version grammar, field extraction, normalization and release history.
//!
//! Every operation here takes the release registry it should consult as its
//! first argument, so callers decide which registry is authoritative. The
//! crate root re-exposes the same operations bound to the built-in registry.

pub mod extract;
pub mod grammar;
pub mod history;
pub mod normalize;

pub use extract::{has_minor_component, major_version, minor_value, parse, version_number};
pub use grammar::{is_valid, is_well_formed, validate, validate_well_formed};
pub use history::{
    check_released, compare_release, is_released, release_date, release_date_or_zero,
    released_after, yyyymmdd,
};
pub use normalize::normalize;

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// First major version of the two-component numbering scheme.
pub const MODERN_ERA_START: u32 = 10;

/// Numbering scheme a version belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Era {
    /// `MAJOR.MINOR.PATCH`, major below 10
    Legacy,
    /// `MAJOR.MINOR`, major 10 and above
    Modern,
}

impl Era {
    pub fn of_major(major: u32) -> Self {
        if major < MODERN_ERA_START {
            Era::Legacy
        } else {
            Era::Modern
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Era::Legacy => f.write_str("legacy"),
            Era::Modern => f.write_str("modern"),
        }
    }
}

/// A validated version split into its numeric fields.
///
/// `patch` is present exactly for legacy versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ParsedVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}

impl ParsedVersion {
    pub fn era(&self) -> Era {
        if self.patch.is_some() {
            Era::Legacy
        } else {
            Era::Modern
        }
    }

    /// The release series: `9.3` for `9.3.14`, `11` for `11.1`.
    pub fn major_version(&self) -> MajorVersion {
        match self.patch {
            Some(_) => MajorVersion::Legacy {
                major: self.major,
                series: self.minor,
            },
            None => MajorVersion::Modern { major: self.major },
        }
    }

    /// Position within the release series: the patch for legacy versions,
    /// the minor for modern ones.
    pub fn minor_value(&self) -> u32 {
        self.patch.unwrap_or(self.minor)
    }

    /// The `server_version_num` encoding, e.g. `90314` or `110001`.
    pub fn version_number(&self) -> u32 {
        match self.patch {
            Some(patch) => self.major * 10_000 + self.minor * 100 + patch,
            None => self.major * 10_000 + self.minor,
        }
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

/// Major release series of a version.
///
/// Before 10 the series is named by two numbers (`9.6`), from 10 on by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorVersion {
    Legacy { major: u32, series: u32 },
    Modern { major: u32 },
}

impl MajorVersion {
    pub fn era(&self) -> Era {
        match self {
            MajorVersion::Legacy { .. } => Era::Legacy,
            MajorVersion::Modern { .. } => Era::Modern,
        }
    }

    /// First number of the version regardless of era.
    pub fn major(&self) -> u32 {
        match *self {
            MajorVersion::Legacy { major, .. } | MajorVersion::Modern { major } => major,
        }
    }

    /// Single-number form: `9.3` for legacy series, `11.0` for modern ones.
    ///
    /// Lossy for legacy series with two-digit second numbers (`9.10` reads
    /// back as `9.1`); compare `MajorVersion` values instead.
    pub fn as_decimal(&self) -> f64 {
        match *self {
            MajorVersion::Legacy { .. } => self.to_string().parse().unwrap_or(f64::NAN),
            MajorVersion::Modern { major } => f64::from(major),
        }
    }
}

impl fmt::Display for MajorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MajorVersion::Legacy { major, series } => write!(f, "{}.{}", major, series),
            MajorVersion::Modern { major } => write!(f, "{}", major),
        }
    }
}

impl Serialize for MajorVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Anything that can be read as a version string.
///
/// Numbers are accepted so `11.1` and `"11.1"` mean the same thing. Integral
/// floats keep their fractional zero (`10.0` reads as `"10.0"`, not `"10"`).
pub trait VersionInput {
    fn to_version_text(&self) -> Cow<'_, str>;
}

impl VersionInput for str {
    fn to_version_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl VersionInput for String {
    fn to_version_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: VersionInput + ?Sized> VersionInput for &T {
    fn to_version_text(&self) -> Cow<'_, str> {
        (**self).to_version_text()
    }
}

impl VersionInput for f64 {
    fn to_version_text(&self) -> Cow<'_, str> {
        if self.is_finite() && self.fract() == 0.0 {
            Cow::Owned(format!("{:.1}", self))
        } else {
            Cow::Owned(self.to_string())
        }
    }
}

impl VersionInput for f32 {
    fn to_version_text(&self) -> Cow<'_, str> {
        if self.is_finite() && self.fract() == 0.0 {
            Cow::Owned(format!("{:.1}", self))
        } else {
            Cow::Owned(self.to_string())
        }
    }
}

macro_rules! integer_version_input {
    ($($ty:ty),*) => {
        $(
            impl VersionInput for $ty {
                fn to_version_text(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

integer_version_input!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
