//! Pipeline container and the resolution algorithm.
//!
//! [`Pipeline::generate`] walks the element tree depth-first, post-order:
//!
//! 1. resolve every source of an element, in declared order;
//! 2. fill optional inputs that have no source with their declared default;
//! 3. call the element's `resolve` with those outputs and the shared state;
//! 4. stop at the first failure, reporting which element raised it.
//!
//! Source wiring is checked once for the whole tree before step 1 runs
//! anywhere, and each element's output is checked against its declared
//! output kinds after step 3.
//!
//! The root's output becomes the [`Playlist`]. Nothing is materialized when
//! any element fails.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info};

use crate::element::{check_source_kinds, Element, PipelineState};
use crate::error::{ElementError, PipelineError};
use crate::models::{Entity, EntityKind};
use crate::progress::{ProgressMode, ResolveEvent, ResolveReporter};

/// The final artifact of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Playlist {
    pub name: String,
    /// What each element contributed, in resolution order.
    pub element_descriptions: Vec<String>,
    pub entities: Vec<Entity>,
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    fn new(entities: Vec<Entity>, element_descriptions: Vec<String>) -> Self {
        let name = if element_descriptions.is_empty() {
            "Playlist".to_string()
        } else {
            format!("Playlist: {}", element_descriptions.join(", "))
        };
        Self {
            name,
            element_descriptions,
            entities,
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Holds the root element of a tree and runs it once.
#[derive(Default)]
pub struct Pipeline {
    root: Option<Box<dyn Element>>,
    reporter: Option<Box<dyn ResolveReporter>>,
    playlist: Option<Playlist>,
}

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Entity>, PipelineError>> + Send + 'a>>;

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this reporter instead of the one picked from the `debug` flag.
    pub fn with_reporter(mut self, reporter: Box<dyn ResolveReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Store the root of the tree to execute.
    pub fn set_source(&mut self, root: Box<dyn Element>) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<&dyn Element> {
        self.root.as_deref()
    }

    /// Resolve the whole tree and keep the result as this pipeline's playlist.
    ///
    /// `debug` only turns on progress output.
    pub async fn generate(&mut self, debug: bool) -> Result<(), PipelineError> {
        self.playlist = None;
        let root = self.root.as_deref().ok_or(PipelineError::NoRoot)?;
        validate_tree(root)?;

        let fallback;
        let reporter: &dyn ResolveReporter = match &self.reporter {
            Some(reporter) => reporter.as_ref(),
            None => {
                fallback = ProgressMode::from_debug(debug).reporter();
                fallback.as_ref()
            }
        };

        info!(root = root.name(), "generating playlist");
        let mut state = PipelineState::new();
        let entities = resolve_element(root, 0, &mut state, reporter).await?;
        info!(count = entities.len(), "playlist generated");

        self.playlist = Some(Playlist::new(entities, state.into_descriptions()));
        Ok(())
    }

    /// Entities of the generated playlist; empty before a successful run.
    pub fn entities(&self) -> &[Entity] {
        self.playlist
            .as_ref()
            .map(|p| p.entities.as_slice())
            .unwrap_or(&[])
    }

    pub fn playlist(&self) -> Option<&Playlist> {
        self.playlist.as_ref()
    }

    pub fn into_playlist(self) -> Option<Playlist> {
        self.playlist
    }
}

/// Check every element's declared wiring before anything runs, so a
/// misconfigured tree never reaches an external fetch.
fn validate_tree(element: &dyn Element) -> Result<(), PipelineError> {
    let kinds: Vec<Vec<EntityKind>> = element.sources().iter().map(|s| s.outputs()).collect();
    check_source_kinds(&element.inputs(), &kinds)
        .map_err(|e| PipelineError::element(element.name(), e))?;
    for source in element.sources() {
        validate_tree(source.as_ref())?;
    }
    Ok(())
}

fn resolve_element<'a>(
    element: &'a dyn Element,
    depth: usize,
    state: &'a mut PipelineState,
    reporter: &'a dyn ResolveReporter,
) -> ResolveFuture<'a> {
    Box::pin(async move {
        reporter.report(ResolveEvent::Resolving {
            element: element.name().to_string(),
            depth,
        });

        let mut inputs = Vec::with_capacity(element.sources().len());
        for source in element.sources() {
            let output = resolve_element(source.as_ref(), depth + 1, &mut *state, reporter).await?;
            inputs.push(output);
        }

        // Wiring was checked by `validate_tree`; only unfed optionals remain.
        for spec in element.inputs().into_iter().skip(inputs.len()) {
            inputs.push(spec.default);
        }

        debug!(element = element.name(), depth, "resolving element");
        let output = element
            .resolve(&inputs, state)
            .await
            .map_err(|e| PipelineError::element(element.name(), e))?;

        let allowed = element.outputs();
        if let Some(stray) = output.iter().find(|e| !allowed.contains(&e.kind())) {
            return Err(PipelineError::element(
                element.name(),
                ElementError::Configuration(format!(
                    "produced {} which is not a declared output",
                    stray.kind()
                )),
            ));
        }

        reporter.report(ResolveEvent::Resolved {
            element: element.name().to_string(),
            depth,
            count: output.len(),
        });
        Ok(output)
    })
}
