use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BinError {
    #[error("a bin named '{0}' already exists")]
    DuplicateName(String),
    #[error("a bin displayed as '{0}' already exists")]
    DuplicateNiceName(String),
    #[error("bin {0} can't be empty")]
    EmptyField(&'static str),
    #[error("there is no bin '{0}'")]
    UnknownBin(String),
}

/// A category time can be logged against. `name` is the key used inside reports, `nice_name` is
/// what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinDefinition {
    pub name: String,
    pub nice_name: String,
    #[serde(default)]
    pub description: String,
}

impl BinDefinition {
    pub fn new(
        name: impl Into<String>,
        nice_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            nice_name: nice_name.into(),
            description: description.into(),
        }
    }

    /// Matches either the key or the label, ignoring case.
    fn answers_to(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key) || self.nice_name.eq_ignore_ascii_case(key)
    }
}

/// Partial replacement of a [BinDefinition]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinUpdate {
    pub name: Option<String>,
    pub nice_name: Option<String>,
    pub description: Option<String>,
}

/// Ordered bin definitions. Both names and nice names are unique, compared case-insensitively.
///
/// Sets read from disk are taken as they are, the invariants are enforced on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinSet(Vec<BinDefinition>);

impl From<Vec<BinDefinition>> for BinSet {
    fn from(value: Vec<BinDefinition>) -> Self {
        Self(value)
    }
}

impl BinSet {
    /// Bin set of a fresh installation.
    pub fn default_set() -> Self {
        Self(vec![BinDefinition::new(
            "meetings",
            "Meetings",
            "Time spent in meetings",
        )])
    }

    /// Builds a set from definitions read elsewhere, enforcing the same rules as [BinSet::add].
    pub fn validated(bins: Vec<BinDefinition>) -> Result<Self, BinError> {
        let mut set = Self::default();
        for bin in bins {
            set.add(bin)?;
        }
        Ok(set)
    }

    /// Checks a set taken as is, e.g. a hand edited file.
    pub fn verify(&self) -> Result<(), BinError> {
        Self::validated(self.0.clone()).map(drop)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BinDefinition> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BinDefinition] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finds a bin by its name, or by its nice name when no name matches.
    pub fn find(&self, key: &str) -> Option<&BinDefinition> {
        self.position(key).map(|i| &self.0[i])
    }

    fn position(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        self.0
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(key))
            .or_else(|| self.0.iter().position(|v| v.answers_to(key)))
    }

    pub fn add(&mut self, bin: BinDefinition) -> Result<&BinDefinition, BinError> {
        let bin = self.validate(bin, None)?;
        self.0.push(bin);
        Ok(&self.0[self.0.len() - 1])
    }

    pub fn edit(&mut self, key: &str, update: BinUpdate) -> Result<&BinDefinition, BinError> {
        let index = self
            .position(key)
            .ok_or_else(|| BinError::UnknownBin(key.to_owned()))?;
        let current = self.0[index].clone();
        let candidate = BinDefinition {
            name: update.name.unwrap_or(current.name),
            nice_name: update.nice_name.unwrap_or(current.nice_name),
            description: update.description.unwrap_or(current.description),
        };
        self.0[index] = self.validate(candidate, Some(index))?;
        Ok(&self.0[index])
    }

    pub fn remove(&mut self, key: &str) -> Result<BinDefinition, BinError> {
        let index = self
            .position(key)
            .ok_or_else(|| BinError::UnknownBin(key.to_owned()))?;
        Ok(self.0.remove(index))
    }

    fn validate(
        &self,
        bin: BinDefinition,
        replaced: Option<usize>,
    ) -> Result<BinDefinition, BinError> {
        let bin = BinDefinition {
            name: bin.name.trim().to_owned(),
            nice_name: bin.nice_name.trim().to_owned(),
            description: bin.description.trim().to_owned(),
        };
        if bin.name.is_empty() {
            return Err(BinError::EmptyField("name"));
        }
        if bin.nice_name.is_empty() {
            return Err(BinError::EmptyField("nice name"));
        }

        let others = self
            .0
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != replaced)
            .map(|v| v.1);
        for other in others {
            if other.name.eq_ignore_ascii_case(&bin.name) {
                return Err(BinError::DuplicateName(bin.name));
            }
            if other.nice_name.eq_ignore_ascii_case(&bin.nice_name) {
                return Err(BinError::DuplicateNiceName(bin.nice_name));
            }
        }
        Ok(bin)
    }
}

#[cfg(test)]
mod tests {
    use super::{BinDefinition, BinError, BinSet, BinUpdate};

    fn travel() -> BinDefinition {
        BinDefinition::new("travel", "Travel", "Time traveling")
    }

    #[test]
    fn test_add_rejects_duplicates_ignoring_case() {
        let mut bins = BinSet::default_set();
        bins.add(travel()).unwrap();

        assert_eq!(
            bins.add(BinDefinition::new("TRAVEL", "Commute", "")),
            Err(BinError::DuplicateName("TRAVEL".into()))
        );
        assert_eq!(
            bins.add(BinDefinition::new("commute", "travel", "")),
            Err(BinError::DuplicateNiceName("travel".into()))
        );
        assert_eq!(bins.iter().filter(|v| v.name == "travel").count(), 1);
    }

    #[test]
    fn test_add_trims_and_rejects_empty_fields() {
        let mut bins = BinSet::default();
        assert_eq!(
            bins.add(BinDefinition::new("  ", "Blank", "")),
            Err(BinError::EmptyField("name"))
        );
        assert_eq!(
            bins.add(BinDefinition::new("x", "", "")),
            Err(BinError::EmptyField("nice name"))
        );

        let added = bins.add(BinDefinition::new(" support ", "Support ", " desk")).unwrap();
        assert_eq!(added, &BinDefinition::new("support", "Support", "desk"));
    }

    #[test]
    fn test_find_by_name_or_nice_name() {
        let mut bins = BinSet::default_set();
        bins.add(travel()).unwrap();

        assert_eq!(bins.find("MEETINGS").map(|v| v.name.as_str()), Some("meetings"));
        assert_eq!(bins.find("Travel").map(|v| v.name.as_str()), Some("travel"));
        assert_eq!(bins.find("nothing"), None);
    }

    #[test]
    fn test_edit_keeps_other_fields_and_allows_own_name() {
        let mut bins = BinSet::default_set();
        bins.add(travel()).unwrap();

        let edited = bins
            .edit(
                "travel",
                BinUpdate {
                    name: Some("Travel".into()),
                    description: Some("Trains and planes".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(edited, &BinDefinition::new("Travel", "Travel", "Trains and planes"));

        assert_eq!(
            bins.edit(
                "travel",
                BinUpdate {
                    nice_name: Some("meetings".into()),
                    ..Default::default()
                }
            ),
            Err(BinError::DuplicateNiceName("meetings".into()))
        );
    }

    #[test]
    fn test_validated_rejects_duplicates_from_outside() {
        let bins = vec![
            BinDefinition::new("support", "Support", ""),
            BinDefinition::new("SUPPORT", "Helpdesk", ""),
        ];

        assert_eq!(
            BinSet::validated(bins.clone()),
            Err(BinError::DuplicateName("SUPPORT".into()))
        );
        assert_eq!(
            BinSet::from(bins).verify(),
            Err(BinError::DuplicateName("SUPPORT".into()))
        );
        assert_eq!(BinSet::default_set().verify(), Ok(()));
    }

    #[test]
    fn test_remove() {
        let mut bins = BinSet::default_set();
        assert_eq!(
            bins.remove("travel"),
            Err(BinError::UnknownBin("travel".into()))
        );
        let removed = bins.remove("Meetings").unwrap();
        assert_eq!(removed.name, "meetings");
        assert!(bins.is_empty());
    }
}
