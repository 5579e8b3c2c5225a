//! Core data models used throughout setlist.
//!
//! These types represent the music entities that flow between pipeline
//! elements. Identity fields (the MusicBrainz ids) are fixed at construction;
//! later stages only fill in optional fields.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Type tag for an entity, used to declare element inputs and outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Recording,
    Artist,
    ArtistCredit,
    Release,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Recording => "Recording",
            EntityKind::Artist => "Artist",
            EntityKind::ArtistCredit => "ArtistCredit",
            EntityKind::Release => "Release",
        };
        f.write_str(name)
    }
}

/// A single artist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Artist {
    pub mbid: Option<String>,
    pub name: Option<String>,
    /// Service-specific attributes (e.g. listen counts).
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

/// The credited artist(s) of a recording or release, as displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArtistCredit {
    pub artist_credit_id: Option<i64>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<Artist>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

/// A release (album, single, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Release {
    pub mbid: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_credit: Option<ArtistCredit>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

/// A recording, the entity most playlists are made of.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    mbid: String,
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_credit: Option<ArtistCredit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<Release>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Recording {
    pub fn new(mbid: impl Into<String>) -> Self {
        Self {
            mbid: mbid.into(),
            name: None,
            year: None,
            artist_credit: None,
            release: None,
            attributes: Map::new(),
        }
    }

    pub fn mbid(&self) -> &str {
        &self.mbid
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_artist_credit(mut self, credit: ArtistCredit) -> Self {
        self.artist_credit = Some(credit);
        self
    }

    /// Display name of the credited artist, if known.
    pub fn artist_name(&self) -> Option<&str> {
        self.artist_credit.as_ref().and_then(|ac| ac.name.as_deref())
    }
}

/// Any entity that can flow between elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Recording(Recording),
    Artist(Artist),
    ArtistCredit(ArtistCredit),
    Release(Release),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Recording(_) => EntityKind::Recording,
            Entity::Artist(_) => EntityKind::Artist,
            Entity::ArtistCredit(_) => EntityKind::ArtistCredit,
            Entity::Release(_) => EntityKind::Release,
        }
    }

    pub fn as_recording(&self) -> Option<&Recording> {
        match self {
            Entity::Recording(r) => Some(r),
            _ => None,
        }
    }

    /// Human-readable one-line label.
    pub fn label(&self) -> String {
        match self {
            Entity::Recording(r) => match (r.name.as_deref(), r.artist_name()) {
                (Some(name), Some(artist)) => format!("{} - {}", name, artist),
                (Some(name), None) => name.to_string(),
                _ => r.mbid().to_string(),
            },
            Entity::Artist(a) => a
                .name
                .clone()
                .or_else(|| a.mbid.clone())
                .unwrap_or_default(),
            Entity::ArtistCredit(ac) => ac.name.clone().unwrap_or_default(),
            Entity::Release(rel) => rel
                .name
                .clone()
                .or_else(|| rel.mbid.clone())
                .unwrap_or_default(),
        }
    }
}

impl From<Recording> for Entity {
    fn from(r: Recording) -> Self {
        Entity::Recording(r)
    }
}

impl From<Artist> for Entity {
    fn from(a: Artist) -> Self {
        Entity::Artist(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_label_prefers_name_and_artist() {
        let rec = Recording::new("r-1")
            .with_name("Autobahn")
            .with_artist_credit(ArtistCredit {
                name: Some("Kraftwerk".to_string()),
                ..Default::default()
            });
        assert_eq!(Entity::from(rec).label(), "Autobahn - Kraftwerk");
        assert_eq!(Entity::from(Recording::new("r-2")).label(), "r-2");
    }

    #[test]
    fn entity_kind_matches_variant() {
        assert_eq!(
            Entity::from(Recording::new("x")).kind(),
            EntityKind::Recording
        );
        assert_eq!(Entity::from(Artist::default()).kind(), EntityKind::Artist);
    }
}
