//! `top-country`: popular recordings from one country.
//!
//! The difficulty mode picks which third of the popularity ranking the
//! playlist is drawn from:
//!
//! | Mode | Window (percent of positions) |
//! |------|-------------------------------|
//! | easy | 66–100 |
//! | medium | 33–66 |
//! | hard | 0–33 |

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::element::{Element, InputSpec, PipelineState};
use crate::error::{ElementError, PipelineError};
use crate::filters::ArtistCreditLimiter;
use crate::models::{ArtistCredit, Entity, EntityKind, Recording};
use crate::patch::{arg_or_default, ArgKind, ArgValue, Patch, PatchInput};
use crate::ranked::RankedList;
use crate::source::{RecordingRow, RecordingSource};

const MODES: &[&str] = &["easy", "medium", "hard"];

/// Selection difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Easy,
    Medium,
    Hard,
}

impl Mode {
    /// Percentile window of the ranking this mode samples from.
    pub fn window(&self) -> (usize, usize) {
        match self {
            Mode::Easy => (66, 100),
            Mode::Medium => (33, 66),
            Mode::Hard => (0, 33),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Mode::Easy),
            "medium" => Ok(Mode::Medium),
            "hard" => Ok(Mode::Hard),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Easy => "easy",
            Mode::Medium => "medium",
            Mode::Hard => "hard",
        })
    }
}

/// Data-origin element: recordings popular in one area.
pub struct CountryRecordingElement {
    area_name: String,
    mode: Mode,
    target_size: usize,
    source: Arc<dyn RecordingSource>,
    sources: Vec<Box<dyn Element>>,
}

impl CountryRecordingElement {
    pub fn new(
        area_name: impl Into<String>,
        mode: Mode,
        target_size: usize,
        source: Arc<dyn RecordingSource>,
    ) -> Self {
        Self {
            area_name: area_name.into(),
            mode,
            target_size,
            source,
            sources: Vec::new(),
        }
    }

    pub fn area_name(&self) -> &str {
        &self.area_name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }
}

/// Build a recording from a dataset row; rows without an id are placeholders.
fn recording_from_row(row: &RecordingRow) -> Option<Recording> {
    let mbid = row.recording_mbid.as_deref()?;
    let mut recording = Recording::new(mbid);
    recording.name = row.recording_name.clone();
    recording.year = row.year;
    if let Some(name) = &row.artist_credit_name {
        recording.artist_credit = Some(ArtistCredit {
            name: Some(name.clone()),
            ..Default::default()
        });
    }
    if let Some(count) = row.listen_count {
        recording
            .attributes
            .insert("listen_count".to_string(), Value::from(count));
    }
    Some(recording)
}

#[async_trait]
impl Element for CountryRecordingElement {
    fn name(&self) -> &str {
        "country-recordings"
    }

    fn inputs(&self) -> Vec<InputSpec> {
        vec![]
    }

    fn outputs(&self) -> Vec<EntityKind> {
        vec![EntityKind::Recording]
    }

    fn sources(&self) -> &[Box<dyn Element>] {
        &self.sources
    }

    fn sources_mut(&mut self) -> &mut Vec<Box<dyn Element>> {
        &mut self.sources
    }

    async fn resolve(
        &self,
        _inputs: &[Vec<Entity>],
        state: &mut PipelineState,
    ) -> Result<Vec<Entity>, ElementError> {
        let (start, stop) = self.mode.window();

        let area_mbid = self.source.lookup_area(&self.area_name).await?;
        debug!(area = %self.area_name, %area_mbid, "resolved area");
        let rows = self.source.popular_recordings_by_country(&area_mbid).await?;

        state.describe(format!("country {}", self.area_name));

        let mut ranked = RankedList::new();
        for row in &rows {
            let recording = recording_from_row(row);
            match row.listen_count {
                Some(count) => ranked.append_scored(recording, count as f64),
                None => ranked.append(recording),
            }
        }

        Ok(ranked
            .random_window(start, stop, self.target_size)
            .into_iter()
            .map(Entity::from)
            .collect())
    }
}

/// Playlist of popular recordings from a country, at a chosen difficulty.
pub struct TopCountryPatch {
    source: Arc<dyn RecordingSource>,
    target_size: usize,
    max_per_artist: usize,
}

impl TopCountryPatch {
    pub fn new(source: Arc<dyn RecordingSource>, target_size: usize, max_per_artist: usize) -> Self {
        Self {
            source,
            target_size,
            max_per_artist,
        }
    }

    /// The leaf element this patch wires under its limiter.
    pub fn recording_element(
        &self,
        args: &[ArgValue],
    ) -> Result<CountryRecordingElement, PipelineError> {
        let invalid = |argument: &str, reason: String| PipelineError::Validation {
            patch: self.slug().to_string(),
            argument: argument.to_string(),
            reason,
        };

        let area = arg_or_default(self, args, 0)?;
        let area_name = area
            .as_str()
            .ok_or_else(|| invalid("area name", "must be a string".to_string()))?;

        let mode = arg_or_default(self, args, 1)?;
        let mode = mode
            .as_str()
            .ok_or_else(|| invalid("mode", "must be a string".to_string()))?
            .parse::<Mode>()
            .map_err(|reason| invalid("mode", reason))?;

        Ok(CountryRecordingElement::new(
            area_name,
            mode,
            self.target_size,
            self.source.clone(),
        ))
    }
}

impl Patch for TopCountryPatch {
    fn slug(&self) -> &str {
        "top-country"
    }

    fn description(&self) -> &str {
        "Popular recordings from a country, picked from the easy, medium or hard third of the ranking"
    }

    fn inputs(&self) -> Vec<PatchInput> {
        vec![
            PatchInput::required("area name", ArgKind::Str),
            PatchInput::optional(
                "mode",
                ArgKind::Choice(MODES),
                ArgValue::Choice("easy".to_string()),
            ),
        ]
    }

    fn create(&self, args: &[ArgValue]) -> Result<Box<dyn Element>, PipelineError> {
        let recordings = self.recording_element(args)?;
        let mut limiter = ArtistCreditLimiter::new(self.max_per_artist);
        limiter.set_sources(vec![Box::new(recordings)])?;
        Ok(Box::new(limiter))
    }
}
