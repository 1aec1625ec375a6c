//! PostgreSQL version strings: validation, parsing, normalization and
//! release history.
//!
//! Versions before 10 have three components (`9.6.24`), versions from 10 on
//! have two (`16.0`). The functions at the crate root use the built-in
//! release registry; [`version`] has the same operations taking any
//! [`ReleaseLookup`].
//!
//! ```
//! assert!(pgver::is_valid_version("9.6.1"));
//! assert!(!pgver::is_valid_version("9.7.1"));
//! assert_eq!(pgver::version_number("10.14"), Ok(100014));
//! assert_eq!(pgver::normalize_version("11"), "11.0");
//! assert!(pgver::released_after("12.1", "11.5"));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod version;

pub use cli::{Cli, Command};
pub use config::PgverConfig;
pub use error::{RegistryError, SemanticError, SyntaxError, VersionError};
pub use registry::{Release, ReleaseLookup, ReleaseRegistry};
pub use version::{Era, MajorVersion, ParsedVersion, VersionInput};

use chrono::NaiveDate;

fn builtin() -> &'static ReleaseRegistry {
    ReleaseRegistry::builtin()
}

/// True if `input` is a real version (registry-confirmed policy).
pub fn is_valid_version(input: impl VersionInput) -> bool {
    version::is_valid(builtin(), input)
}

/// True if `input` satisfies grammar and numeric bounds, shipped or not.
pub fn is_well_formed_version(input: impl VersionInput) -> bool {
    version::is_well_formed(input)
}

/// True if `input` is valid and present in the built-in registry.
pub fn is_released_version(input: impl VersionInput) -> bool {
    version::is_released(builtin(), input)
}

pub fn get_major_version(input: impl VersionInput) -> Result<MajorVersion, VersionError> {
    version::major_version(builtin(), input)
}

pub fn get_minor_version(input: impl VersionInput) -> Result<u32, VersionError> {
    version::minor_value(builtin(), input)
}

pub fn has_minor_component(input: impl VersionInput) -> bool {
    version::has_minor_component(builtin(), input)
}

pub fn parse_version(input: impl VersionInput) -> Result<ParsedVersion, VersionError> {
    version::parse(builtin(), input)
}

pub fn normalize_version(input: impl VersionInput) -> String {
    version::normalize(builtin(), input)
}

pub fn version_number(input: impl VersionInput) -> Result<u32, VersionError> {
    version::version_number(builtin(), input)
}

pub fn release_date(input: impl VersionInput) -> Result<NaiveDate, VersionError> {
    version::release_date(builtin(), input)
}

/// Release date as `YYYY-MM-DD`, or `"0"` when unavailable.
pub fn release_date_or_zero(input: impl VersionInput) -> String {
    version::release_date_or_zero(builtin(), input)
}

/// True if `a` shipped strictly after `b`.
pub fn released_after(a: impl VersionInput, b: impl VersionInput) -> bool {
    version::released_after(builtin(), a, b)
}
