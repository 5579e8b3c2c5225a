//! Patches: named factories for element trees.
//!
//! A [`Patch`] declares its typed inputs and builds one wired element tree
//! from already-validated argument values. [`validate_args`] turns the raw
//! command-line strings into those values, reporting problems per argument.
//! Patches are registered once at startup in a [`PatchRegistry`] and looked
//! up by slug.

use anyhow::Result;
use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::element::Element;
use crate::error::PipelineError;
use crate::source::RecordingSource;

/// How a raw argument string is coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    Str,
    Int,
    /// One of a fixed set of lowercase words.
    Choice(&'static [&'static str]),
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKind::Str => f.write_str("string"),
            ArgKind::Int => f.write_str("integer"),
            ArgKind::Choice(options) => write!(f, "one of {}", options.join("|")),
        }
    }
}

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Choice(String),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) | ArgValue::Choice(s) => Some(s),
            ArgValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) | ArgValue::Choice(s) => f.write_str(s),
            ArgValue::Int(n) => write!(f, "{}", n),
        }
    }
}

/// One declared patch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchInput {
    pub name: &'static str,
    pub kind: ArgKind,
    pub optional: bool,
    pub default: Option<ArgValue>,
}

impl PatchInput {
    pub fn required(name: &'static str, kind: ArgKind) -> Self {
        Self {
            name,
            kind,
            optional: false,
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: ArgKind, default: ArgValue) -> Self {
        Self {
            name,
            kind,
            optional: true,
            default: Some(default),
        }
    }

    /// Coerce a raw string according to this input's kind.
    pub fn coerce(&self, raw: &str) -> std::result::Result<ArgValue, String> {
        match &self.kind {
            ArgKind::Str => {
                if raw.trim().is_empty() {
                    Err("must not be empty".to_string())
                } else {
                    Ok(ArgValue::Str(raw.to_string()))
                }
            }
            ArgKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(ArgValue::Int)
                .map_err(|e| format!("is not an integer: {}", e)),
            ArgKind::Choice(options) => {
                let value = raw.trim().to_lowercase();
                if options.contains(&value.as_str()) {
                    Ok(ArgValue::Choice(value))
                } else {
                    Err(format!("must be one of {}", options.join(", ")))
                }
            }
        }
    }
}

/// A named, parameterized factory for one element tree.
pub trait Patch: Send + Sync {
    /// Unique identifier used on the command line.
    fn slug(&self) -> &str;

    fn description(&self) -> &str;

    /// Declared inputs, in positional order.
    fn inputs(&self) -> Vec<PatchInput>;

    /// Build the root element from validated arguments.
    ///
    /// Missing trailing optional arguments take their declared default.
    /// Must not perform I/O.
    fn create(&self, args: &[ArgValue]) -> std::result::Result<Box<dyn Element>, PipelineError>;
}

/// Validate and coerce raw arguments against a patch's declared inputs.
pub fn validate_args(
    patch: &dyn Patch,
    raw: &[String],
) -> std::result::Result<Vec<ArgValue>, PipelineError> {
    let inputs = patch.inputs();
    let invalid = |argument: &str, reason: String| PipelineError::Validation {
        patch: patch.slug().to_string(),
        argument: argument.to_string(),
        reason,
    };

    if raw.len() > inputs.len() {
        return Err(invalid(
            raw[inputs.len()].as_str(),
            format!("is unexpected; {} takes {} arguments", patch.slug(), inputs.len()),
        ));
    }

    let mut values = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        match raw.get(i) {
            Some(text) => {
                let value = input
                    .coerce(text)
                    .map_err(|reason| invalid(input.name, format!("({}) {}", input.kind, reason)))?;
                values.push(value);
            }
            None if !input.optional => {
                return Err(invalid(input.name, "is required".to_string()));
            }
            None => {
                if let Some(default) = &input.default {
                    values.push(default.clone());
                }
            }
        }
    }

    Ok(values)
}

/// Positional argument lookup for `Patch::create`, falling back to the
/// input's default.
pub fn arg_or_default(
    patch: &dyn Patch,
    args: &[ArgValue],
    index: usize,
) -> std::result::Result<ArgValue, PipelineError> {
    let inputs = patch.inputs();
    let input = inputs.get(index).ok_or_else(|| PipelineError::Validation {
        patch: patch.slug().to_string(),
        argument: format!("#{}", index),
        reason: "is not a declared input".to_string(),
    })?;

    args.get(index)
        .cloned()
        .or_else(|| input.default.clone())
        .ok_or_else(|| PipelineError::Validation {
            patch: patch.slug().to_string(),
            argument: input.name.to_string(),
            reason: "is required".to_string(),
        })
}

/// Read-only lookup table of patches, built once at startup.
pub struct PatchRegistry {
    patches: Vec<Box<dyn Patch>>,
}

impl PatchRegistry {
    pub fn new() -> Self {
        Self {
            patches: Vec::new(),
        }
    }

    /// Registry with every built-in patch, wired to the given data source.
    pub fn with_builtins(config: &Config, source: Arc<dyn RecordingSource>) -> Result<Self> {
        use crate::patches::country::TopCountryPatch;

        let mut registry = Self::new();
        registry.register(Box::new(TopCountryPatch::new(
            source,
            config.playlist.target_size,
            config.playlist.max_recordings_per_artist,
        )))?;
        Ok(registry)
    }

    /// Register a patch. Slugs must be unique.
    pub fn register(&mut self, patch: Box<dyn Patch>) -> Result<()> {
        if self.find(patch.slug()).is_some() {
            anyhow::bail!("Patch '{}' is already registered", patch.slug());
        }
        self.patches.push(patch);
        Ok(())
    }

    /// Exact-slug lookup.
    pub fn find(&self, slug: &str) -> Option<&dyn Patch> {
        self.patches
            .iter()
            .find(|p| p.slug() == slug)
            .map(|p| p.as_ref())
    }

    pub fn patches(&self) -> &[Box<dyn Patch>] {
        &self.patches
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }
}

impl Default for PatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{InputSpec, PipelineState};
    use crate::error::ElementError;
    use crate::models::{Entity, EntityKind};
    use async_trait::async_trait;

    struct Empty {
        sources: Vec<Box<dyn Element>>,
    }

    #[async_trait]
    impl Element for Empty {
        fn name(&self) -> &str {
            "empty"
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
            _state: &mut PipelineState,
        ) -> std::result::Result<Vec<Entity>, ElementError> {
            Ok(vec![])
        }
    }

    struct Demo(&'static str);

    impl Patch for Demo {
        fn slug(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "demo patch"
        }
        fn inputs(&self) -> Vec<PatchInput> {
            vec![
                PatchInput::required("name", ArgKind::Str),
                PatchInput::optional("count", ArgKind::Int, ArgValue::Int(10)),
                PatchInput::optional(
                    "mode",
                    ArgKind::Choice(&["easy", "hard"]),
                    ArgValue::Choice("easy".to_string()),
                ),
            ]
        }
        fn create(
            &self,
            _args: &[ArgValue],
        ) -> std::result::Result<Box<dyn Element>, PipelineError> {
            Ok(Box::new(Empty { sources: vec![] }))
        }
    }

    fn raw(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fills_defaults_for_missing_optionals() {
        let values = validate_args(&Demo("demo"), &raw(&["Germany"])).unwrap();
        assert_eq!(
            values,
            vec![
                ArgValue::Str("Germany".to_string()),
                ArgValue::Int(10),
                ArgValue::Choice("easy".to_string()),
            ]
        );
    }

    #[test]
    fn coerces_types() {
        let values = validate_args(&Demo("demo"), &raw(&["x", "3", "HARD"])).unwrap();
        assert_eq!(values[1].as_int(), Some(3));
        assert_eq!(values[2].as_str(), Some("hard"));
    }

    #[test]
    fn reports_the_offending_argument() {
        let err = validate_args(&Demo("demo"), &raw(&[])).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "demo: argument 'name' is required");

        let err = validate_args(&Demo("demo"), &raw(&["x", "many"])).unwrap_err();
        assert!(err.to_string().contains("argument 'count'"));

        let err = validate_args(&Demo("demo"), &raw(&["x", "1", "medium"])).unwrap_err();
        assert!(err.to_string().contains("must be one of easy, hard"));

        let err = validate_args(&Demo("demo"), &raw(&["x", "1", "easy", "extra"])).unwrap_err();
        assert!(err.to_string().contains("'extra' is unexpected"));
    }

    #[test]
    fn arg_or_default_falls_back() {
        let patch = Demo("demo");
        let args = vec![ArgValue::Str("x".to_string())];
        assert_eq!(arg_or_default(&patch, &args, 1).unwrap(), ArgValue::Int(10));
        assert!(arg_or_default(&patch, &[], 0).is_err());
        assert!(arg_or_default(&patch, &args, 7).is_err());
    }

    #[test]
    fn registry_rejects_duplicate_slugs() {
        let mut registry = PatchRegistry::new();
        registry.register(Box::new(Demo("one"))).unwrap();
        registry.register(Box::new(Demo("two"))).unwrap();
        assert!(registry.register(Box::new(Demo("one"))).is_err());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("two").map(|p| p.slug()), Some("two"));
        assert!(registry.find("tw").is_none());
        assert!(registry.find("two").unwrap().create(&[]).is_ok());
    }
}
