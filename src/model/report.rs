use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BinDefinition, BinSet};

/// Increments logged per bin during a single day. Stored on disk as a flat json object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report(BTreeMap<String, u64>);

impl Report {
    /// A report with a zero entry for every known bin.
    pub fn seeded(bins: &BinSet) -> Self {
        bins.iter().map(|v| (v.name.clone(), 0)).collect()
    }

    /// Adds one unit to the bin and returns the new count for it.
    pub fn increment(&mut self, bin: &BinDefinition) -> u64 {
        let count = self.0.entry(bin.name.clone()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn get(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn entries(&self) -> &BTreeMap<String, u64> {
        &self.0
    }
}

impl FromIterator<(String, u64)> for Report {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{BinDefinition, BinSet};

    use super::Report;

    #[test]
    fn test_seeded_has_zero_per_bin() {
        let mut bins = BinSet::default_set();
        bins.add(BinDefinition::new("travel", "Travel", "")).unwrap();

        let report = Report::seeded(&bins);
        assert_eq!(report.entries().len(), 2);
        assert!(report.entries().values().all(|v| *v == 0));
    }

    #[test]
    fn test_increment_missing_entry_starts_at_one() {
        let mut report = Report::default();
        let bin = BinDefinition::new("travel", "Travel", "");
        assert_eq!(report.increment(&bin), 1);
        assert_eq!(report.increment(&bin), 2);
        assert_eq!(report.get("travel"), 2);
        assert_eq!(report.get("other"), 0);
    }

    #[test]
    fn test_serialized_as_flat_object() {
        let report: Report = [("b".to_string(), 2), ("a".to_string(), 1)]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_string(&report).unwrap(), r#"{"a":1,"b":2}"#);
    }
}
