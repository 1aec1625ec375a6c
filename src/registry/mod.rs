//! Release registry: the record of which versions shipped and when.
//!
//! The built-in registry is compiled from `data/releases.toml`. Custom
//! registries load the same TOML layout:
//!
//! ```toml
//! [releases]
//! "16.0" = "2023-09-14"
//! "9.6.1" = "2016-10-27"
//! ```

#[cfg(test)]
pub mod mock;

#[cfg(test)]
pub use mock::MockRegistry;

use crate::error::RegistryError;
use crate::version::{self, Era, ParsedVersion};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Maximum size for release data files (4 MB)
const MAX_REGISTRY_FILE_SIZE: u64 = 4 * 1024 * 1024;

const BUILTIN_RELEASES: &str = include_str!("../../data/releases.toml");

static BUILTIN: LazyLock<ReleaseRegistry> = LazyLock::new(|| {
    ReleaseRegistry::from_toml_str(BUILTIN_RELEASES)
        .expect("Built-in release data should be well-formed")
});

/// Read access to release dates, keyed by exact version string.
pub trait ReleaseLookup {
    /// Release date of `version`, if it shipped
    fn release_date(&self, version: &str) -> Option<NaiveDate>;

    /// Whether `version` appears verbatim
    fn contains(&self, version: &str) -> bool {
        self.release_date(version).is_some()
    }
}

impl<T: ReleaseLookup + ?Sized> ReleaseLookup for &T {
    fn release_date(&self, version: &str) -> Option<NaiveDate> {
        (**self).release_date(version)
    }
}

/// A single registry row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub parsed: ParsedVersion,
    pub date: NaiveDate,
}

/// Immutable map from version string to release date.
#[derive(Debug, Clone, Default)]
pub struct ReleaseRegistry {
    releases: HashMap<String, Release>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    #[serde(default)]
    releases: BTreeMap<String, String>,
}

impl ReleaseRegistry {
    /// The registry shipped with the crate, initialized on first use.
    pub fn builtin() -> &'static ReleaseRegistry {
        &BUILTIN
    }

    /// Parse release data in the TOML layout described in the module docs.
    pub fn from_toml_str(content: &str) -> Result<Self, RegistryError> {
        let file: ReleaseFile = toml::from_str(content)?;
        Self::from_entries(file.releases)
    }

    /// Load release data from a file on disk.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let io_err = |source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > MAX_REGISTRY_FILE_SIZE {
            return Err(RegistryError::TooLarge {
                size,
                max: MAX_REGISTRY_FILE_SIZE,
            });
        }

        let content = std::fs::read_to_string(path).map_err(io_err)?;
        let registry = Self::from_toml_str(&content)?;
        debug!(
            "Loaded {} releases from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Build a registry from `(version, YYYY-MM-DD)` pairs.
    ///
    /// Each version must be well-formed for its era, so that every entry is
    /// also a valid version once it is in the registry.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut releases = HashMap::new();
        for (version, date) in entries {
            let release = Self::check_entry(version.into(), date.as_ref())?;
            releases.insert(release.version.clone(), release);
        }
        Ok(Self { releases })
    }

    fn check_entry(version: String, date: &str) -> Result<Release, RegistryError> {
        let parsed = version::validate_well_formed(version.as_str())
            .map_err(RegistryError::InvalidEntry)?;
        let date = date
            .parse::<NaiveDate>()
            .map_err(|source| RegistryError::InvalidDate {
                version: version.clone(),
                date: date.to_string(),
                source,
            })?;
        Ok(Release {
            version,
            parsed,
            date,
        })
    }

    /// Combine with `other`; entries in `other` win on conflict.
    pub fn merged_with(mut self, other: ReleaseRegistry) -> Self {
        self.releases.extend(other.releases);
        self
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn get(&self, version: &str) -> Option<&Release> {
        self.releases.get(version)
    }

    /// All releases, newest first. Same-day releases are ordered by version,
    /// highest first.
    pub fn releases(&self) -> Vec<&Release> {
        let mut releases: Vec<&Release> = self.releases.values().collect();
        releases.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.parsed.version_number().cmp(&a.parsed.version_number()))
        });
        releases
    }

    /// The most recent release, or `None` for an empty registry.
    pub fn latest(&self) -> Option<&Release> {
        self.releases().into_iter().next()
    }

    /// Releases of one era, newest first.
    pub fn releases_in(&self, era: Era) -> Vec<&Release> {
        self.releases()
            .into_iter()
            .filter(|release| release.parsed.era() == era)
            .collect()
    }
}

impl ReleaseLookup for ReleaseRegistry {
    fn release_date(&self, version: &str) -> Option<NaiveDate> {
        self.releases.get(version).map(|release| release.date)
    }
}
