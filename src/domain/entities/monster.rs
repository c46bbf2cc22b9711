//! Monster entity - Catalog creatures eligible for encounter tables
//!
//! Monsters live in the catalog, outside the encounter table aggregate.
//! Tables keep a [`MonsterSnapshot`] so a generated entry still reads the
//! same after the catalog entry is edited or removed.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{MonsterId, UserId};

/// Where a monster came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Official,
    User,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::User => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "official" => Some(Self::Official),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    #[serde(default)]
    pub id: MonsterId,
    pub name: String,
    pub challenge_level: u8,
    pub source: ContentSource,
    /// Author of a homebrew monster
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub is_public: bool,
    /// Creature type tags, e.g. "undead", "beast"
    #[serde(default)]
    pub types: Vec<String>,
    /// Habitat tags, e.g. "dungeon", "forest", or "any"
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub armor_class: Option<u16>,
    #[serde(default)]
    pub hit_points: Option<u16>,
}

impl Monster {
    pub fn snapshot(&self) -> MonsterSnapshot {
        MonsterSnapshot::from(self)
    }
}

#[cfg(test)]
impl Monster {
    /// An official rulebook monster; always visible
    pub fn official(name: impl Into<String>, challenge_level: u8) -> Self {
        Self {
            id: MonsterId::new(),
            name: name.into(),
            challenge_level,
            source: ContentSource::Official,
            owner_id: None,
            is_public: true,
            types: Vec::new(),
            locations: Vec::new(),
            description: None,
            armor_class: None,
            hit_points: None,
        }
    }

    /// A homebrew monster, private to its author until published
    pub fn homebrew(owner_id: UserId, name: impl Into<String>, challenge_level: u8) -> Self {
        Self {
            source: ContentSource::User,
            owner_id: Some(owner_id),
            is_public: false,
            ..Self::official(name, challenge_level)
        }
    }

    pub fn with_type(mut self, tag: impl Into<String>) -> Self {
        self.types.push(tag.into());
        self
    }

    pub fn with_location(mut self, tag: impl Into<String>) -> Self {
        self.locations.push(tag.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn published(mut self) -> Self {
        self.is_public = true;
        self
    }
}

/// Denormalized copy of a monster stored on each table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterSnapshot {
    pub name: String,
    pub challenge_level: u8,
    pub source: ContentSource,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub armor_class: Option<u16>,
    #[serde(default)]
    pub hit_points: Option<u16>,
}

impl MonsterSnapshot {
    /// One-line summary shown next to a roll result
    pub fn encounter_description(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => format!(
                "{} (level {}): {}",
                self.name, self.challenge_level, description
            ),
            _ => format!("{} (level {})", self.name, self.challenge_level),
        }
    }
}

impl From<&Monster> for MonsterSnapshot {
    fn from(monster: &Monster) -> Self {
        Self {
            name: monster.name.clone(),
            challenge_level: monster.challenge_level,
            source: monster.source,
            types: monster.types.clone(),
            locations: monster.locations.clone(),
            description: monster.description.clone(),
            armor_class: monster.armor_class,
            hit_points: monster.hit_points,
        }
    }
}
