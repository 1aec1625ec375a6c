//! Mock registry for testing version operations against hand-picked data.

use super::ReleaseLookup;
use chrono::NaiveDate;
use std::collections::HashMap;

/// A registry that holds exactly the releases it was given.
///
/// Unlike `ReleaseRegistry` it skips the well-formedness check on entries,
/// so tests can feed the grammar data a real registry would refuse.
#[derive(Debug, Default)]
pub struct MockRegistry {
    releases: HashMap<String, NaiveDate>,
}

impl MockRegistry {
    /// Create an empty mock registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a release with its `YYYY-MM-DD` date.
    pub fn with_release(mut self, version: &str, date: &str) -> Self {
        let date = date.parse().expect("mock release dates are YYYY-MM-DD");
        self.releases.insert(version.to_string(), date);
        self
    }
}

impl ReleaseLookup for MockRegistry {
    fn release_date(&self, version: &str) -> Option<NaiveDate> {
        self.releases.get(version).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_registry_basic() {
        let registry = MockRegistry::new()
            .with_release("12.1", "2019-11-14")
            .with_release("9.6.1", "2016-10-27");

        assert!(registry.contains("12.1"));
        assert!(registry.contains("9.6.1"));
        assert!(!registry.contains("12.2"));
        assert_eq!(
            registry.release_date("12.1"),
            NaiveDate::from_ymd_opt(2019, 11, 14)
        );
    }

    #[test]
    fn test_mock_registry_accepts_anything() {
        let registry = MockRegistry::new().with_release("11.1.1", "2030-01-01");
        assert!(registry.contains("11.1.1"));
    }

    #[test]
    fn test_mock_registry_empty() {
        let registry = MockRegistry::new();
        assert_eq!(registry.release_date("16.0"), None);
    }
}
