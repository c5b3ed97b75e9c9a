use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::DomainError;

/// Marker character conventionally prefixed to every tag (`#화재`).
pub const TAG_MARKER: char = '#';

/// The four tag groups every interest and product profile is organised into.
///
/// Serialized with the labels used by the catalog file; the English names are
/// accepted as aliases on input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TagCategory {
    #[serde(rename = "누구", alias = "who")]
    Who,
    #[serde(rename = "위험", alias = "risk")]
    Risk,
    #[serde(rename = "우선순위", alias = "priority")]
    Priority,
    #[serde(rename = "변화", alias = "change")]
    Change,
}

impl TagCategory {
    pub const ALL: [TagCategory; 4] = [Self::Who, Self::Risk, Self::Priority, Self::Change];

    pub fn label(self) -> &'static str {
        match self {
            Self::Who => "누구",
            Self::Risk => "위험",
            Self::Priority => "우선순위",
            Self::Change => "변화",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Who => "who",
            Self::Risk => "risk",
            Self::Priority => "priority",
            Self::Change => "change",
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TagCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| {
                category.label() == trimmed || category.key().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| DomainError::UnknownCategory(trimmed.to_string()))
    }
}

/// Tags grouped by category.
///
/// Used both for a product's tag profile and for the tags a visitor selected
/// in one session. Groups keyed by anything other than the four categories
/// are kept aside: they count toward similarity but never toward the risk
/// bonus.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagGroups {
    groups: BTreeMap<TagCategory, Vec<String>>,
    other: BTreeMap<String, Vec<String>>,
}

/// Tags a visitor picked during one session, grouped by category.
pub type SelectedTags = TagGroups;

impl TagGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: TagCategory, tags: &[&str]) -> Self {
        self.extend(category, tags.iter().map(|tag| (*tag).to_string()));
        self
    }

    pub fn push(&mut self, category: TagCategory, tag: impl Into<String>) {
        self.groups.entry(category).or_default().push(tag.into());
    }

    pub fn extend(&mut self, category: TagCategory, tags: impl IntoIterator<Item = String>) {
        self.groups.entry(category).or_default().extend(tags);
    }

    /// Files `tags` under a group key that is not one of the four categories.
    pub fn extend_other(
        &mut self,
        key: impl Into<String>,
        tags: impl IntoIterator<Item = String>,
    ) {
        self.other.entry(key.into()).or_default().extend(tags);
    }

    pub fn tags(&self, category: TagCategory) -> &[String] {
        self.groups.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct tags of one category.
    pub fn category_set(&self, category: TagCategory) -> BTreeSet<&str> {
        self.tags(category).iter().map(String::as_str).collect()
    }

    /// Distinct tags across every group, uncategorised ones included.
    pub fn flatten(&self) -> BTreeSet<&str> {
        self.groups
            .values()
            .chain(self.other.values())
            .flatten()
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().chain(self.other.values()).all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagCategory, &[String])> {
        self.groups.iter().map(|(category, tags)| (*category, tags.as_slice()))
    }

    /// Keys of groups outside the four categories.
    pub fn other_keys(&self) -> impl Iterator<Item = &str> {
        self.other.keys().map(String::as_str)
    }
}

impl Serialize for TagGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len() + self.other.len()))?;
        for (category, tags) in &self.groups {
            map.serialize_entry(category.label(), tags)?;
        }
        for (key, tags) in &self.other {
            map.serialize_entry(key, tags)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TagGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        let mut groups = Self::new();
        for (key, tags) in raw {
            match key.parse::<TagCategory>() {
                Ok(category) => groups.extend(category, tags),
                Err(_) => groups.extend_other(key, tags),
            }
        }
        Ok(groups)
    }
}
