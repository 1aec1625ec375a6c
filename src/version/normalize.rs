use super::{VersionInput, grammar};
use crate::registry::ReleaseLookup;
use tracing::debug;

/// Best-effort completion of a version missing its final component.
///
/// Returns `input` unchanged when it already validates. Otherwise tries
/// `input + ".0"` and keeps that only when it validates and is itself a
/// registry entry, so `9.3` becomes `9.3.0` and `11` becomes `11.0` while
/// `1.1` never turns into `1.1.0`. Anything else comes back untouched.
pub fn normalize<R: ReleaseLookup + ?Sized>(registry: &R, input: impl VersionInput) -> String {
    let text = input.to_version_text();
    if grammar::is_valid(registry, &*text) {
        return text.into_owned();
    }

    let attempt = format!("{}.0", text);
    if grammar::is_valid(registry, attempt.as_str()) && registry.contains(&attempt) {
        debug!("Normalized {} to {}", text, attempt);
        return attempt;
    }

    text.into_owned()
}
