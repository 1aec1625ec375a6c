//! Configuration file support for pgver
//!
//! Supports `.pgverrc.toml` and `pgver.toml` configuration files.
//!
//! Example configuration:
//! ```toml
//! # Replace the built-in release registry (relative to this file)
//! registry = "releases.toml"
//!
//! # Releases newer than the registry snapshot
//! [releases]
//! "16.1" = "2023-11-09"
//! "15.5" = "2023-11-09"
//! ```

use crate::error::RegistryError;
use crate::registry::ReleaseRegistry;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Maximum size for config files (1 MB) to prevent DoS
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Configuration loaded from .pgverrc.toml or pgver.toml
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PgverConfig {
    /// Release data file replacing the built-in registry
    #[serde(default)]
    pub registry: Option<PathBuf>,

    /// Extra releases (version -> YYYY-MM-DD) layered over the registry
    #[serde(default)]
    pub releases: BTreeMap<String, String>,
}

impl PgverConfig {
    /// Load configuration by searching for config files in the given directory and parents
    pub fn discover(start_dir: &Path) -> Option<(Self, PathBuf)> {
        let config_names = [".pgverrc.toml", "pgver.toml", ".pgverrc"];

        let mut current = Some(start_dir);
        while let Some(dir) = current {
            for name in &config_names {
                let config_path = dir.join(name);
                if config_path.exists() {
                    match Self::load_from_path_with_error(&config_path) {
                        Ok(config) => return Some((config, config_path)),
                        Err(e) => warn!("Skipping config file: {}", e),
                    }
                }
            }
            current = dir.parent();
        }

        None
    }

    /// Load configuration from a specific file path with detailed error messages
    ///
    /// A relative `registry` path is resolved against the config file's directory.
    pub fn load_from_path_with_error(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }

        match std::fs::metadata(path) {
            Ok(metadata) => {
                if metadata.len() > MAX_CONFIG_FILE_SIZE {
                    return Err(format!(
                        "Config file too large: {} bytes (max {} MB)",
                        metadata.len(),
                        MAX_CONFIG_FILE_SIZE / 1024 / 1024
                    ));
                }
            }
            Err(e) => {
                return Err(format!(
                    "Cannot read config file metadata: {}. Check file permissions.",
                    e
                ));
            }
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                format!(
                    "Permission denied reading config file: {}. Check file permissions.",
                    path.display()
                )
            } else {
                format!("Failed to read config file {}: {}", path.display(), e)
            }
        })?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| format!("Invalid TOML in config file {}:\n  {}", path.display(), e))?;

        if let Some(registry) = config.registry.take() {
            let resolved = match path.parent() {
                Some(dir) if registry.is_relative() => dir.join(registry),
                _ => registry,
            };
            config.registry = Some(resolved);
        }

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Discover configuration from `start_dir` upward, then layer `explicit`
    /// over it. Returns the merged configuration and the files it came from.
    pub fn resolve(
        explicit: Option<&Path>,
        start_dir: &Path,
    ) -> Result<(Self, Vec<PathBuf>), String> {
        let mut config = Self::default();
        let mut sources = Vec::new();

        if let Some((discovered, path)) = Self::discover(start_dir) {
            config.merge(discovered);
            sources.push(path);
        }

        if let Some(path) = explicit {
            config.merge(Self::load_from_path_with_error(path)?);
            sources.push(path.to_path_buf());
        }

        Ok((config, sources))
    }

    /// Check if any configuration is present
    pub fn has_config(&self) -> bool {
        self.registry.is_some() || !self.releases.is_empty()
    }

    /// Merge another configuration into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        if other.registry.is_some() {
            self.registry = other.registry;
        }
        self.releases.extend(other.releases);
    }

    /// Build the release registry this configuration describes.
    ///
    /// Without any configuration this is the built-in registry itself.
    pub fn build_registry(&self) -> Result<Cow<'static, ReleaseRegistry>, RegistryError> {
        if !self.has_config() {
            return Ok(Cow::Borrowed(ReleaseRegistry::builtin()));
        }

        let base = match &self.registry {
            Some(path) => ReleaseRegistry::load(path)?,
            None => ReleaseRegistry::builtin().clone(),
        };
        let extra = ReleaseRegistry::from_entries(&self.releases)?;
        if !extra.is_empty() {
            debug!("Adding {} configured releases", extra.len());
        }

        Ok(Cow::Owned(base.merged_with(extra)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ReleaseLookup;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".pgverrc.toml");

        let content = r#"
registry = "/opt/pg/releases.toml"

[releases]
"16.1" = "2023-11-09"
"15.5" = "2023-11-09"
"#;
        fs::write(&config_path, content).unwrap();

        let config = PgverConfig::load_from_path_with_error(&config_path).unwrap();

        assert_eq!(
            config.registry,
            Some(PathBuf::from("/opt/pg/releases.toml"))
        );
        assert_eq!(config.releases.len(), 2);
        assert_eq!(
            config.releases.get("16.1"),
            Some(&"2023-11-09".to_string())
        );
    }

    #[test]
    fn test_relative_registry_resolves_against_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("pgver.toml");
        fs::write(&config_path, "registry = \"data/releases.toml\"").unwrap();

        let config = PgverConfig::load_from_path_with_error(&config_path).unwrap();
        assert_eq!(
            config.registry,
            Some(temp_dir.path().join("data/releases.toml"))
        );
    }

    #[test]
    fn test_discover_config_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".pgverrc.toml");
        fs::write(&config_path, "[releases]\n\"16.1\" = \"2023-11-09\"\n").unwrap();

        let result = PgverConfig::discover(temp_dir.path());
        assert!(result.is_some());
        let (config, path) = result.unwrap();
        assert_eq!(config.releases.len(), 1);
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_config_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("pgver.toml");
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(&config_path, "[releases]\n\"16.1\" = \"2023-11-09\"\n").unwrap();

        let result = PgverConfig::discover(&subdir);
        assert!(result.is_some());
        let (_, path) = result.unwrap();
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_prefers_closer_config() {
        let temp_dir = TempDir::new().unwrap();

        let parent_config = temp_dir.path().join(".pgverrc.toml");
        fs::write(&parent_config, "[releases]\n\"16.1\" = \"2023-11-09\"\n").unwrap();

        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        let child_config = subdir.join(".pgverrc.toml");
        fs::write(&child_config, "[releases]\n\"16.2\" = \"2024-02-08\"\n").unwrap();

        let (config, path) = PgverConfig::discover(&subdir).unwrap();
        assert!(config.releases.contains_key("16.2"));
        assert!(!config.releases.contains_key("16.1"));
        assert_eq!(path, child_config);
    }

    #[test]
    fn test_discover_skips_broken_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".pgverrc.toml"), "releases = [").unwrap();
        let fallback = temp_dir.path().join("pgver.toml");
        fs::write(&fallback, "").unwrap();

        let (_, path) = PgverConfig::discover(temp_dir.path()).unwrap();
        assert_eq!(path, fallback);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".pgverrc.toml");
        fs::write(&config_path, "releases = [").unwrap();

        let err = PgverConfig::load_from_path_with_error(&config_path).unwrap_err();
        assert!(err.starts_with("Invalid TOML in config file"));
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let err =
            PgverConfig::load_from_path_with_error(&temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(err.starts_with("Config file not found"));
    }

    #[test]
    fn test_empty_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".pgverrc.toml");
        fs::write(&config_path, "").unwrap();

        let config = PgverConfig::load_from_path_with_error(&config_path).unwrap();
        assert!(config.registry.is_none());
        assert!(config.releases.is_empty());
        assert!(!config.has_config());
    }

    #[test]
    fn test_merge_configs() {
        let mut base = PgverConfig {
            registry: Some(PathBuf::from("a.toml")),
            releases: BTreeMap::from([("16.1".to_string(), "2023-11-09".to_string())]),
        };
        let other = PgverConfig {
            registry: None,
            releases: BTreeMap::from([
                ("16.1".to_string(), "2023-11-10".to_string()),
                ("16.2".to_string(), "2024-02-08".to_string()),
            ]),
        };

        base.merge(other);

        assert_eq!(base.registry, Some(PathBuf::from("a.toml")));
        assert_eq!(base.releases.len(), 2);
        assert_eq!(base.releases["16.1"], "2023-11-10");
    }

    #[test]
    fn test_resolve_layers_explicit_over_discovered() {
        let temp_dir = TempDir::new().unwrap();
        let discovered = temp_dir.path().join(".pgverrc.toml");
        fs::write(
            &discovered,
            "registry = \"base.toml\"\n[releases]\n\"16.1\" = \"2023-11-09\"\n",
        )
        .unwrap();

        let other_dir = TempDir::new().unwrap();
        let explicit = other_dir.path().join("override.toml");
        fs::write(
            &explicit,
            "[releases]\n\"16.1\" = \"2023-11-10\"\n\"16.2\" = \"2024-02-08\"\n",
        )
        .unwrap();

        let (config, sources) =
            PgverConfig::resolve(Some(&explicit), temp_dir.path()).unwrap();

        assert_eq!(sources, vec![discovered, explicit]);
        assert_eq!(config.registry, Some(temp_dir.path().join("base.toml")));
        assert_eq!(config.releases.len(), 2);
        assert_eq!(config.releases["16.1"], "2023-11-10");
        assert_eq!(config.releases["16.2"], "2024-02-08");
    }

    #[test]
    fn test_resolve_without_any_config() {
        let temp_dir = TempDir::new().unwrap();
        let (config, sources) = PgverConfig::resolve(None, temp_dir.path()).unwrap();
        assert!(sources.is_empty());
        assert!(!config.has_config());
    }

    #[test]
    fn test_resolve_reports_missing_explicit_config() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        let err = PgverConfig::resolve(Some(&missing), temp_dir.path()).unwrap_err();
        assert!(err.starts_with("Config file not found"));
    }

    #[test]
    fn test_build_registry_without_config_is_builtin() {
        let registry = PgverConfig::default().build_registry().unwrap();
        assert!(matches!(registry, Cow::Borrowed(_)));
        assert_eq!(registry.len(), ReleaseRegistry::builtin().len());
    }

    #[test]
    fn test_build_registry_adds_releases() {
        let config = PgverConfig {
            registry: None,
            releases: BTreeMap::from([("16.1".to_string(), "2023-11-09".to_string())]),
        };

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.len(), ReleaseRegistry::builtin().len() + 1);
        assert!(registry.contains("16.1"));
        assert!(registry.contains("9.6.1"));
    }

    #[test]
    fn test_build_registry_replaces_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("releases.toml");
        fs::write(&data, "[releases]\n\"17.0\" = \"2024-09-26\"\n").unwrap();

        let config = PgverConfig {
            registry: Some(data),
            releases: BTreeMap::new(),
        };

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("17.0"));
        assert!(!registry.contains("9.6.1"));
    }

    #[test]
    fn test_build_registry_rejects_bad_release() {
        let config = PgverConfig {
            registry: None,
            releases: BTreeMap::from([("16.1".to_string(), "yesterday".to_string())]),
        };
        assert!(matches!(
            config.build_registry(),
            Err(RegistryError::InvalidDate { .. })
        ));
    }
}
