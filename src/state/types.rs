use crate::core::types::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One tool-managed package: the backend that owns it and the last version
/// known to be installed. Versions are opaque and only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub source: Source,
    pub version: String,
}

impl PackageRecord {
    pub fn new(source: Source, version: impl Into<String>) -> Self {
        Self {
            source,
            version: version.into(),
        }
    }
}

/// Package name -> record.
///
/// Persisted as a flat JSON object (`{"name": {"source": .., "version": ..}}`);
/// keys are kept sorted so identical lists serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageList {
    packages: BTreeMap<String, PackageRecord>,
}

impl PackageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Insert or overwrite; returns the previous record
    pub fn insert(&mut self, name: impl Into<String>, record: PackageRecord) -> Option<PackageRecord> {
        self.packages.insert(name.into(), record)
    }

    pub fn remove(&mut self, name: &str) -> Option<PackageRecord> {
        self.packages.remove(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PackageRecord)> {
        self.packages.iter()
    }

    /// Tracked package names grouped by owning backend, names sorted
    pub fn names_by_source(&self) -> BTreeMap<Source, Vec<String>> {
        let mut grouped: BTreeMap<Source, Vec<String>> = BTreeMap::new();
        for (name, record) in &self.packages {
            grouped.entry(record.source).or_default().push(name.clone());
        }
        grouped
    }
}

impl FromIterator<(String, PackageRecord)> for PackageList {
    fn from_iter<I: IntoIterator<Item = (String, PackageRecord)>>(iter: I) -> Self {
        Self {
            packages: iter.into_iter().collect(),
        }
    }
}
