use super::{MajorVersion, ParsedVersion, VersionInput, grammar, normalize};
use crate::error::VersionError;
use crate::registry::ReleaseLookup;

/// Major release series of `input`, completing a bare major first.
///
/// `"11"` works because it normalizes to `"11.0"`; `"9.3"` works because it
/// normalizes to `"9.3.0"`.
pub fn major_version<R: ReleaseLookup + ?Sized>(
    registry: &R,
    input: impl VersionInput,
) -> Result<MajorVersion, VersionError> {
    let normalized = normalize::normalize(registry, input);
    grammar::validate(registry, normalized.as_str()).map(|parsed| parsed.major_version())
}

/// Position of `input` within its series: the patch for legacy versions,
/// the minor for modern ones. No normalization is applied.
pub fn minor_value<R: ReleaseLookup + ?Sized>(
    registry: &R,
    input: impl VersionInput,
) -> Result<u32, VersionError> {
    grammar::validate(registry, input).map(|parsed| parsed.minor_value())
}

/// True if `input` is valid and past the first release of its series
/// (`11.1`, `9.3.2`), false for `11.0`, `9.3.0` and anything invalid.
pub fn has_minor_component<R: ReleaseLookup + ?Sized>(
    registry: &R,
    input: impl VersionInput,
) -> bool {
    matches!(minor_value(registry, input), Ok(minor) if minor > 0)
}

/// Parse a complete version.
///
/// Requires both the major and the minor extraction to succeed, so partial
/// versions such as `"9.3"` or `"11"` are rejected even though
/// [`major_version`] accepts them.
pub fn parse<R: ReleaseLookup + ?Sized>(
    registry: &R,
    input: impl VersionInput,
) -> Result<ParsedVersion, VersionError> {
    let text = input.to_version_text();
    let parsed = grammar::validate(registry, &*text)?;
    major_version(registry, &*text)?;
    Ok(parsed)
}

/// The `server_version_num` integer of `input`.
///
/// For example `9.3.14` is `90314`, `10.14` is `100014`, `11.1` is `110001`.
pub fn version_number<R: ReleaseLookup + ?Sized>(
    registry: &R,
    input: impl VersionInput,
) -> Result<u32, VersionError> {
    grammar::validate(registry, input).map(|parsed| parsed.version_number())
}
