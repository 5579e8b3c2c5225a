//! The element abstraction.
//!
//! An [`Element`] is one typed stage of a playlist pipeline. It declares
//! which entity kinds it expects from each of its sources (positionally) and
//! which kinds it produces, owns its source elements, and turns the resolved
//! outputs of those sources into its own output sequence.
//!
//! ```text
//!   ArtistCreditLimiter        ← root, output becomes the playlist
//!          ▲
//!          │ [Recording]
//!   CountryRecordings          ← data origin, fetches from a RecordingSource
//! ```
//!
//! Elements never see each other's private data. The only channel besides
//! the data flow is [`PipelineState`], passed by reference to every
//! `resolve` call.

use async_trait::async_trait;

use crate::error::{ElementError, PipelineError};
use crate::models::{Entity, EntityKind};

/// One declared input of an element.
///
/// Inputs are matched positionally against the element's sources. An
/// optional input with no source resolves to its `default`, which is empty
/// unless built with [`InputSpec::optional_with_default`].
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub name: &'static str,
    pub kind: EntityKind,
    pub optional: bool,
    pub default: Vec<Entity>,
}

impl InputSpec {
    pub fn required(name: &'static str, kind: EntityKind) -> Self {
        Self {
            name,
            kind,
            optional: false,
            default: Vec::new(),
        }
    }

    pub fn optional(name: &'static str, kind: EntityKind) -> Self {
        Self::optional_with_default(name, kind, Vec::new())
    }

    /// Optional input that resolves to `default` when no source feeds it.
    pub fn optional_with_default(name: &'static str, kind: EntityKind, default: Vec<Entity>) -> Self {
        Self {
            name,
            kind,
            optional: true,
            default,
        }
    }
}

/// State shared by all elements during one pipeline run.
///
/// A fresh value is created for every `generate` call. Writes happen in
/// depth-first resolution order.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    element_descriptions: Vec<String>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a human-readable note about what an element contributed.
    pub fn describe(&mut self, description: impl Into<String>) {
        self.element_descriptions.push(description.into());
    }

    pub fn element_descriptions(&self) -> &[String] {
        &self.element_descriptions
    }

    pub(crate) fn into_descriptions(self) -> Vec<String> {
        self.element_descriptions
    }
}

/// A typed transform stage.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use setlist::element::{Element, InputSpec, PipelineState};
/// use setlist::error::ElementError;
/// use setlist::models::{Entity, EntityKind};
///
/// struct Reverse {
///     sources: Vec<Box<dyn Element>>,
/// }
///
/// #[async_trait]
/// impl Element for Reverse {
///     fn name(&self) -> &str { "reverse" }
///     fn inputs(&self) -> Vec<InputSpec> {
///         vec![InputSpec::required("recordings", EntityKind::Recording)]
///     }
///     fn outputs(&self) -> Vec<EntityKind> { vec![EntityKind::Recording] }
///     fn sources(&self) -> &[Box<dyn Element>] { &self.sources }
///     fn sources_mut(&mut self) -> &mut Vec<Box<dyn Element>> { &mut self.sources }
///
///     async fn resolve(
///         &self,
///         inputs: &[Vec<Entity>],
///         _state: &mut PipelineState,
///     ) -> Result<Vec<Entity>, ElementError> {
///         Ok(inputs[0].iter().rev().cloned().collect())
///     }
/// }
/// ```
#[async_trait]
pub trait Element: Send + Sync {
    /// Identity used in progress output and error reports.
    fn name(&self) -> &str;

    /// Expected inputs, one per source position.
    fn inputs(&self) -> Vec<InputSpec>;

    /// Entity kinds this element may produce.
    fn outputs(&self) -> Vec<EntityKind>;

    /// Source elements in declared order.
    fn sources(&self) -> &[Box<dyn Element>];

    fn sources_mut(&mut self) -> &mut Vec<Box<dyn Element>>;

    /// Wire the given sources, rejecting any that cannot feed the
    /// corresponding input.
    fn set_sources(&mut self, sources: Vec<Box<dyn Element>>) -> Result<(), PipelineError> {
        let kinds: Vec<Vec<EntityKind>> = sources.iter().map(|s| s.outputs()).collect();
        check_source_kinds(&self.inputs(), &kinds)
            .map_err(|e| PipelineError::element(self.name(), e))?;
        *self.sources_mut() = sources;
        Ok(())
    }

    /// Transform the resolved source outputs into this element's output.
    ///
    /// `inputs` holds one sequence per declared input, in order. Data-origin
    /// elements (no inputs) perform their own fetch here.
    async fn resolve(
        &self,
        inputs: &[Vec<Entity>],
        state: &mut PipelineState,
    ) -> Result<Vec<Entity>, ElementError>;
}

/// Positional compatibility check between declared inputs and the output
/// kinds of the sources feeding them.
pub fn check_source_kinds(
    inputs: &[InputSpec],
    source_outputs: &[Vec<EntityKind>],
) -> Result<(), ElementError> {
    if source_outputs.len() > inputs.len() {
        return Err(ElementError::Configuration(format!(
            "{} sources given but only {} inputs declared",
            source_outputs.len(),
            inputs.len()
        )));
    }

    for (i, input) in inputs.iter().enumerate() {
        match source_outputs.get(i) {
            Some(kinds) if !kinds.contains(&input.kind) => {
                let produced: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                return Err(ElementError::Configuration(format!(
                    "input '{}' expects {} but source {} produces [{}]",
                    input.name,
                    input.kind,
                    i,
                    produced.join(", ")
                )));
            }
            Some(_) => {}
            None if input.optional => {}
            None => {
                return Err(ElementError::Configuration(format!(
                    "required input '{}' ({}) has no source",
                    input.name, input.kind
                )));
            }
        }
    }

    Ok(())
}
