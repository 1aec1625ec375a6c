//! Version string grammar.
//!
//! Two policies share the same syntax rules and differ in how numbers are
//! judged:
//!
//! - [`validate`] is the canonical policy. Three-component versions, and
//!   two-component versions up to 10.x, must appear verbatim in the release
//!   registry, since e.g. `9.7.1` is plausible but never shipped.
//! - [`validate_well_formed`] only checks numeric bounds and never looks at a
//!   registry.

use super::{MODERN_ERA_START, ParsedVersion, VersionInput};
use crate::error::{SemanticError, SyntaxError, VersionError};
use crate::registry::ReleaseLookup;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Shortest possible version string (`9.3.0` and `11.0` alike need 4+).
const MIN_LENGTH: usize = 4;

/// Modern majors stop at 99.
const MAX_MAJOR: u64 = 100;

/// Modern minors stop at 9999.
const MAX_MODERN_MINOR: u64 = 10_000;

/// Legacy series and patch numbers stop at 99.
const MAX_LEGACY_COMPONENT: u64 = 100;

/// Modern majors up to this one are end-of-life and confirmed by the registry.
const LAST_REGISTRY_CONFIRMED_MAJOR: u64 = 10;

static VERSION_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9.]+$").expect("Invalid version charset regex"));

/// True if `input` names a real version under the registry-confirmed policy.
pub fn is_valid<R: ReleaseLookup + ?Sized>(registry: &R, input: impl VersionInput) -> bool {
    validate(registry, input).is_ok()
}

/// True if `input` satisfies the grammar and numeric bounds, shipped or not.
pub fn is_well_formed(input: impl VersionInput) -> bool {
    validate_well_formed(input).is_ok()
}

/// Validate `input` against the grammar and the release registry.
pub fn validate<R: ReleaseLookup + ?Sized>(
    registry: &R,
    input: impl VersionInput,
) -> Result<ParsedVersion, VersionError> {
    let text: &str = &input.to_version_text();
    let components = split_components(text).inspect_err(log_rejection)?;

    let confirm = match components.as_slice() {
        [_, _, _] => true,
        [major, _] => *major <= LAST_REGISTRY_CONFIRMED_MAJOR,
        _ => false,
    };
    if confirm && !registry.contains(text) {
        let err = VersionError::semantic(text, SemanticError::NotInRegistry);
        log_rejection(&err);
        return Err(err);
    }

    if let [major, minor] = components.as_slice() {
        check_modern_bounds(text, *major, *minor).inspect_err(log_rejection)?;
    }

    into_parsed(text, &components).inspect_err(log_rejection)
}

/// Validate `input` against the grammar and numeric bounds only.
pub fn validate_well_formed(input: impl VersionInput) -> Result<ParsedVersion, VersionError> {
    let text: &str = &input.to_version_text();
    let components = split_components(text).inspect_err(log_rejection)?;

    // Legacy bounds are enforced by `into_parsed`.
    if let [major, minor] = components.as_slice() {
        check_modern_bounds(text, *major, *minor).inspect_err(log_rejection)?;
    }

    into_parsed(text, &components).inspect_err(log_rejection)
}

/// Apply the syntax rules and split `text` into its numbers.
///
/// Digit runs too long for `u64` saturate, so they fail the numeric bounds
/// later instead of erroring here.
fn split_components(text: &str) -> Result<Vec<u64>, VersionError> {
    let len = text.chars().count();
    if len < MIN_LENGTH {
        return Err(VersionError::syntax(text, SyntaxError::TooShort { len }));
    }

    if text.starts_with('.') || text.ends_with('.') {
        return Err(VersionError::syntax(text, SyntaxError::PeriodAtEdge));
    }

    if text.contains("..") {
        return Err(VersionError::syntax(text, SyntaxError::AdjacentPeriods));
    }

    if !VERSION_CHARS.is_match(text) {
        let bad = text
            .chars()
            .find(|c| !c.is_ascii_digit() && *c != '.')
            .unwrap_or_default();
        return Err(VersionError::syntax(
            text,
            SyntaxError::UnexpectedCharacter(bad),
        ));
    }

    let dots = text.matches('.').count();
    if dots == 0 {
        return Err(VersionError::syntax(text, SyntaxError::MissingMinor));
    }
    if dots > 2 {
        return Err(VersionError::syntax(
            text,
            SyntaxError::TooManyComponents { count: dots },
        ));
    }

    Ok(text
        .split('.')
        .map(|part| part.parse::<u64>().unwrap_or(u64::MAX))
        .collect())
}

fn check_modern_bounds(text: &str, major: u64, minor: u64) -> Result<(), VersionError> {
    if major >= MAX_MAJOR {
        return Err(VersionError::semantic(
            text,
            SemanticError::MajorOutOfRange { major },
        ));
    }
    if minor >= MAX_MODERN_MINOR {
        return Err(VersionError::semantic(
            text,
            SemanticError::MinorOutOfRange { minor },
        ));
    }
    if major < u64::from(MODERN_ERA_START) {
        return Err(VersionError::semantic(
            text,
            SemanticError::EraMismatch {
                major,
                components: 2,
            },
        ));
    }
    Ok(())
}

/// Build the parsed form, rejecting anything outside the era layout.
///
/// Pairs arrive here already bounded by `check_modern_bounds`. Triples are
/// bounded here: the lookup that confirmed them may hold anything, such as
/// `11.1.1` or `9.50000000.1`.
fn into_parsed(text: &str, components: &[u64]) -> Result<ParsedVersion, VersionError> {
    let narrow = |value: u64, reason: SemanticError| {
        u32::try_from(value).map_err(|_| VersionError::semantic(text, reason))
    };

    match *components {
        [major, minor, patch] => {
            let reason = if major >= u64::from(MODERN_ERA_START) {
                Some(SemanticError::EraMismatch {
                    major,
                    components: 3,
                })
            } else if patch >= MAX_LEGACY_COMPONENT {
                Some(SemanticError::PatchOutOfRange { patch })
            } else if minor >= MAX_LEGACY_COMPONENT {
                Some(SemanticError::MinorOutOfRange { minor })
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(VersionError::semantic(text, reason));
            }

            Ok(ParsedVersion {
                major: narrow(major, SemanticError::MajorOutOfRange { major })?,
                minor: narrow(minor, SemanticError::MinorOutOfRange { minor })?,
                patch: Some(narrow(patch, SemanticError::PatchOutOfRange { patch })?),
            })
        }
        [major, minor] => Ok(ParsedVersion {
            major: narrow(major, SemanticError::MajorOutOfRange { major })?,
            minor: narrow(minor, SemanticError::MinorOutOfRange { minor })?,
            patch: None,
        }),
        _ => Err(VersionError::syntax(
            text,
            SyntaxError::TooManyComponents {
                count: components.len().saturating_sub(1),
            },
        )),
    }
}

fn log_rejection(err: &VersionError) {
    debug!("Rejected version: {}", err);
}
