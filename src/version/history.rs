//! Release history: dates, released-ness and release ordering.
//!
//! Every lookup validates first, so an invalid string and an unregistered
//! one are reported differently (`SyntaxInvalid`/`SemanticInvalid` versus
//! `Unavailable`/`Unreleased`). The boolean helpers collapse both to `false`.

use super::{ParsedVersion, VersionInput, grammar};
use crate::error::VersionError;
use crate::registry::ReleaseLookup;
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use tracing::debug;

/// Sentinel returned by [`release_date_or_zero`] when there is no date.
pub const UNAVAILABLE_DATE: &str = "0";

/// Release date of a valid, registered version.
pub fn release_date<R: ReleaseLookup + ?Sized>(
    registry: &R,
    input: impl VersionInput,
) -> Result<NaiveDate, VersionError> {
    let text = input.to_version_text();
    grammar::validate(registry, &*text)?;
    registry.release_date(&text).ok_or_else(|| {
        debug!("Release date unavailable for release: {}", text);
        VersionError::Unavailable(text.into_owned())
    })
}

/// Release date as `YYYY-MM-DD`, or `"0"` when it can't be determined.
pub fn release_date_or_zero<R: ReleaseLookup + ?Sized>(
    registry: &R,
    input: impl VersionInput,
) -> String {
    release_date(registry, input)
        .map(|date| date.to_string())
        .unwrap_or_else(|_| UNAVAILABLE_DATE.to_string())
}

/// Validate `input` and require a registry entry for it.
pub fn check_released<R: ReleaseLookup + ?Sized>(
    registry: &R,
    input: impl VersionInput,
) -> Result<ParsedVersion, VersionError> {
    let text = input.to_version_text();
    let parsed = grammar::validate(registry, &*text)?;
    if registry.contains(&text) {
        Ok(parsed)
    } else {
        debug!("Version hasn't been released yet: {}", text);
        Err(VersionError::Unreleased(text.into_owned()))
    }
}

/// True if `input` is valid and has shipped.
pub fn is_released<R: ReleaseLookup + ?Sized>(registry: &R, input: impl VersionInput) -> bool {
    check_released(registry, input).is_ok()
}

/// Order two versions by release date.
///
/// `None` when either side is invalid or has no registry entry.
pub fn compare_release<R: ReleaseLookup + ?Sized>(
    registry: &R,
    a: impl VersionInput,
    b: impl VersionInput,
) -> Option<Ordering> {
    let a = release_date(registry, a).ok()?;
    let b = release_date(registry, b).ok()?;
    Some(yyyymmdd(a).cmp(&yyyymmdd(b)))
}

/// True if `a` shipped strictly later than `b`.
///
/// Release order isn't version order: `12.14` shipped after `15.1`, and
/// `9.4.23` after `9.5.15`. Anything that can't be dated yields `false`.
pub fn released_after<R: ReleaseLookup + ?Sized>(
    registry: &R,
    a: impl VersionInput,
    b: impl VersionInput,
) -> bool {
    compare_release(registry, a, b) == Some(Ordering::Greater)
}

/// Date as a `YYYYMMDD` integer, e.g. `2023-02-01` becomes `20230201`.
pub fn yyyymmdd(date: NaiveDate) -> u32 {
    let year = u32::try_from(date.year()).unwrap_or(0);
    year * 10_000 + date.month() * 100 + date.day()
}
