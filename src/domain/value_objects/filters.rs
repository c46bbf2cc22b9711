//! Encounter filter criteria
//!
//! Filters select which monsters are eligible for a table. Every axis is
//! optional and absence means "no constraint". Across axes the criteria are
//! combined with AND; within a tag axis a monster qualifies if it carries
//! at least one of the requested tags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_CHALLENGE_LEVEL: u8 = 1;
pub const MAX_CHALLENGE_LEVEL: u8 = 20;
pub const MAX_SEARCH_QUERY_LENGTH: usize = 100;

/// Location tag that matches every location filter
pub const ANY_LOCATION: &str = "any";

/// Which part of the catalog a table draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterSource {
    /// Monsters from the published rulebooks
    Official,
    /// Homebrew monsters that are public or owned by the viewer
    User,
    #[default]
    All,
}

impl MonsterSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::User => "user",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Minimum level ({min}) must be less than or equal to maximum level ({max})")]
    InvertedLevelRange { min: u8, max: u8 },
    #[error("Challenge level {0} is outside the supported range 1-20")]
    LevelOutOfRange(u8),
    #[error("{axis} tags must be non-empty strings")]
    EmptyTag { axis: &'static str },
    #[error("Search query cannot exceed 100 characters (got {0})")]
    SearchQueryTooLong(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncounterFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_challenge_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_challenge_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monster_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
    #[serde(default)]
    pub source: MonsterSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

impl EncounterFilters {
    pub fn with_levels(mut self, min: u8, max: u8) -> Self {
        self.min_challenge_level = Some(min);
        self.max_challenge_level = Some(max);
        self
    }

    pub fn with_type(mut self, tag: impl Into<String>) -> Self {
        self.monster_types.push(tag.into());
        self
    }

    pub fn with_location(mut self, tag: impl Into<String>) -> Self {
        self.locations.push(tag.into());
        self
    }

    pub fn with_source(mut self, source: MonsterSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        for level in [self.min_challenge_level, self.max_challenge_level]
            .into_iter()
            .flatten()
        {
            if !(MIN_CHALLENGE_LEVEL..=MAX_CHALLENGE_LEVEL).contains(&level) {
                return Err(FilterError::LevelOutOfRange(level));
            }
        }

        if let (Some(min), Some(max)) = (self.min_challenge_level, self.max_challenge_level) {
            if min > max {
                return Err(FilterError::InvertedLevelRange { min, max });
            }
        }

        if self.monster_types.iter().any(|t| t.trim().is_empty()) {
            return Err(FilterError::EmptyTag { axis: "Monster type" });
        }
        if self.locations.iter().any(|t| t.trim().is_empty()) {
            return Err(FilterError::EmptyTag { axis: "Location" });
        }

        if let Some(query) = &self.search_query {
            let length = query.chars().count();
            if length > MAX_SEARCH_QUERY_LENGTH {
                return Err(FilterError::SearchQueryTooLong(length));
            }
        }

        Ok(())
    }

    /// Canonical form used for catalog queries: tags trimmed, lowercased and
    /// deduplicated in first-seen order; blank search dropped.
    pub fn normalized(&self) -> Self {
        Self {
            min_challenge_level: self.min_challenge_level,
            max_challenge_level: self.max_challenge_level,
            monster_types: normalize_tags(&self.monster_types),
            locations: normalize_tags(&self.locations),
            source: self.source,
            search_query: self
                .search_query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        }
    }
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_are_valid() {
        assert!(EncounterFilters::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_levels_rejected() {
        let filters = EncounterFilters::default().with_levels(5, 3);
        assert_eq!(
            filters.validate(),
            Err(FilterError::InvertedLevelRange { min: 5, max: 3 })
        );
    }

    #[test]
    fn test_single_bound_is_valid() {
        let filters = EncounterFilters {
            max_challenge_level: Some(4),
            ..Default::default()
        };
        assert!(filters.validate().is_ok());
    }

    #[test]
    fn test_level_outside_range_rejected() {
        let filters = EncounterFilters::default().with_levels(0, 3);
        assert_eq!(filters.validate(), Err(FilterError::LevelOutOfRange(0)));
        let filters = EncounterFilters::default().with_levels(1, 21);
        assert_eq!(filters.validate(), Err(FilterError::LevelOutOfRange(21)));
    }

    #[test]
    fn test_blank_tags_rejected() {
        let filters = EncounterFilters::default().with_type("  ");
        assert!(matches!(filters.validate(), Err(FilterError::EmptyTag { .. })));
        let filters = EncounterFilters::default().with_location("");
        assert!(matches!(filters.validate(), Err(FilterError::EmptyTag { .. })));
    }

    #[test]
    fn test_long_search_rejected() {
        let filters = EncounterFilters::default().with_search("x".repeat(101));
        assert_eq!(filters.validate(), Err(FilterError::SearchQueryTooLong(101)));
    }

    #[test]
    fn test_normalized_dedupes_and_lowercases() {
        let filters = EncounterFilters::default()
            .with_type(" Undead ")
            .with_type("undead")
            .with_type("Beast")
            .with_search("   ");
        let normalized = filters.normalized();
        assert_eq!(normalized.monster_types, vec!["undead", "beast"]);
        assert_eq!(normalized.search_query, None);
    }

    #[test]
    fn test_deserialize_defaults() {
        let filters: EncounterFilters = serde_json::from_str("{}").unwrap();
        assert_eq!(filters, EncounterFilters::default());
        assert_eq!(filters.source, MonsterSource::All);

        let filters: EncounterFilters =
            serde_json::from_str(r#"{"source":"official","monster_types":["undead"]}"#).unwrap();
        assert_eq!(filters.source, MonsterSource::Official);
        assert_eq!(filters.monster_types, vec!["undead"]);
    }
}
