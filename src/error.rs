use std::path::PathBuf;
use thiserror::Error;

/// Why a string fails the version grammar before any number is looked at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("requires at least 4 characters, got {len}")]
    TooShort { len: usize },

    #[error("shouldn't begin or end with a period")]
    PeriodAtEdge,

    #[error("has two or more adjacent periods")]
    AdjacentPeriods,

    #[error("unexpected character {0:?}, only digits and periods are allowed")]
    UnexpectedCharacter(char),

    #[error("should have both a major and a minor version")]
    MissingMinor,

    #[error("has {count} periods, at most 2 are allowed")]
    TooManyComponents { count: usize },
}

/// Why a syntactically clean string still isn't a version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("not in the release registry")]
    NotInRegistry,

    #[error("major version {major} is out of range")]
    MajorOutOfRange { major: u64 },

    #[error("minor version {minor} is out of range")]
    MinorOutOfRange { minor: u64 },

    #[error("patch version {patch} is out of range")]
    PatchOutOfRange { patch: u64 },

    #[error("major version {major} can't have {components} components")]
    EraMismatch { major: u64, components: usize },
}

/// Outcome of a failed version operation.
///
/// `SyntaxInvalid` and `SemanticInvalid` mean the input isn't a version at
/// all; `Unreleased` and `Unavailable` mean it is one but the registry has no
/// entry for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid version string '{input}': {reason}")]
    SyntaxInvalid { input: String, reason: SyntaxError },

    #[error("invalid version '{input}': {reason}")]
    SemanticInvalid { input: String, reason: SemanticError },

    #[error("version {0} hasn't been released")]
    Unreleased(String),

    #[error("release date unavailable for {0}")]
    Unavailable(String),
}

impl VersionError {
    pub(crate) fn syntax(input: &str, reason: SyntaxError) -> Self {
        Self::SyntaxInvalid {
            input: input.to_string(),
            reason,
        }
    }

    pub(crate) fn semantic(input: &str, reason: SemanticError) -> Self {
        Self::SemanticInvalid {
            input: input.to_string(),
            reason,
        }
    }

    /// True when the input failed validation, as opposed to a registry miss.
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            Self::SyntaxInvalid { .. } | Self::SemanticInvalid { .. }
        )
    }
}

/// Errors raised while building a release registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read release data {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("release data too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("invalid TOML in release data: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid release date {date:?} for version {version}: {source}")]
    InvalidDate {
        version: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("registry entry rejected: {0}")]
    InvalidEntry(#[source] VersionError),
}
