//! Generic recording filters.
//!
//! Both filters take one `Recording` input, keep the input order and never
//! invent entities.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::element::{Element, InputSpec, PipelineState};
use crate::error::ElementError;
use crate::models::{Entity, EntityKind};

/// Drops every recording whose id was already seen earlier in the list.
#[derive(Default)]
pub struct DuplicateRecordingFilter {
    sources: Vec<Box<dyn Element>>,
}

impl DuplicateRecordingFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Element for DuplicateRecordingFilter {
    fn name(&self) -> &str {
        "duplicate-recording-filter"
    }

    fn inputs(&self) -> Vec<InputSpec> {
        vec![InputSpec::required("recordings", EntityKind::Recording)]
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
        inputs: &[Vec<Entity>],
        _state: &mut PipelineState,
    ) -> Result<Vec<Entity>, ElementError> {
        let mut seen = HashSet::new();
        Ok(inputs[0]
            .iter()
            .filter(|entity| match entity.as_recording() {
                Some(rec) => seen.insert(rec.mbid().to_string()),
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// Keeps at most `limit` recordings per artist credit.
///
/// Recordings without a credited artist name are always kept.
pub struct ArtistCreditLimiter {
    limit: usize,
    sources: Vec<Box<dyn Element>>,
}

impl ArtistCreditLimiter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            sources: Vec::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[async_trait]
impl Element for ArtistCreditLimiter {
    fn name(&self) -> &str {
        "artist-credit-limiter"
    }

    fn inputs(&self) -> Vec<InputSpec> {
        vec![InputSpec::required("recordings", EntityKind::Recording)]
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
        inputs: &[Vec<Entity>],
        state: &mut PipelineState,
    ) -> Result<Vec<Entity>, ElementError> {
        let mut per_artist: HashMap<String, usize> = HashMap::new();
        let kept: Vec<Entity> = inputs[0]
            .iter()
            .filter(|entity| {
                let Some(artist) = entity.as_recording().and_then(|r| r.artist_name()) else {
                    return true;
                };
                let count = per_artist.entry(artist.to_lowercase()).or_insert(0);
                *count += 1;
                *count <= self.limit
            })
            .cloned()
            .collect();

        let dropped = inputs[0].len() - kept.len();
        if dropped > 0 {
            state.describe(format!("at most {} per artist", self.limit));
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtistCredit, Recording};

    fn rec(mbid: &str, artist: Option<&str>) -> Entity {
        let mut r = Recording::new(mbid);
        if let Some(a) = artist {
            r = r.with_artist_credit(ArtistCredit {
                name: Some(a.to_string()),
                ..Default::default()
            });
        }
        r.into()
    }

    fn mbids(entities: &[Entity]) -> Vec<&str> {
        entities
            .iter()
            .filter_map(|e| e.as_recording())
            .map(|r| r.mbid())
            .collect()
    }

    #[tokio::test]
    async fn duplicates_keep_first_occurrence() {
        let input = vec![rec("a", None), rec("b", None), rec("a", None), rec("c", None)];
        let out = DuplicateRecordingFilter::new()
            .resolve(&[input], &mut PipelineState::new())
            .await
            .unwrap();
        assert_eq!(mbids(&out), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn limiter_caps_each_artist_in_order() {
        let input = vec![
            rec("1", Some("Kraftwerk")),
            rec("2", Some("kraftwerk")),
            rec("3", Some("Can")),
            rec("4", Some("Kraftwerk")),
            rec("5", None),
        ];
        let mut state = PipelineState::new();
        let out = ArtistCreditLimiter::new(2)
            .resolve(&[input], &mut state)
            .await
            .unwrap();
        assert_eq!(mbids(&out), vec!["1", "2", "3", "5"]);
        assert_eq!(state.element_descriptions(), &["at most 2 per artist".to_string()]);
    }

    #[tokio::test]
    async fn limiter_is_silent_when_nothing_dropped() {
        let mut state = PipelineState::new();
        let out = ArtistCreditLimiter::new(3)
            .resolve(&[vec![rec("1", Some("Can"))]], &mut state)
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!(state.element_descriptions().is_empty());
    }
}
