//! Error types for pipeline construction and resolution.

use thiserror::Error;

/// Failure raised by a single element while wiring or resolving.
#[derive(Error, Debug)]
pub enum ElementError {
    /// Type or arity mismatch between an element and its sources.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Non-success response from an external service.
    #[error("data source error: HTTP {status} ({detail})")]
    DataSource { status: u16, detail: String },

    /// The service answered but returned nothing usable.
    #[error("data source returned no result: {0}")]
    EmptyResponse(String),

    /// Response body could not be decoded.
    #[error("cannot decode response: {0}")]
    Decode(String),

    /// Network-level failure talking to a service.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ElementError {
    /// HTTP 503: the only status retried by lookup calls.
    pub fn is_temporarily_unavailable(&self) -> bool {
        matches!(self, ElementError::DataSource { status: 503, .. })
    }
}

/// Top-level failure surfaced by patch creation or `Pipeline::generate`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("element '{element}' failed: {source}")]
    Element {
        element: String,
        #[source]
        source: ElementError,
    },

    #[error("{patch}: argument '{argument}' {reason}")]
    Validation {
        patch: String,
        argument: String,
        reason: String,
    },

    #[error("configuration error: no root element set")]
    NoRoot,
}

impl PipelineError {
    pub fn element(element: impl Into<String>, source: ElementError) -> Self {
        PipelineError::Element {
            element: element.into(),
            source,
        }
    }

    pub fn configuration(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::element(element, ElementError::Configuration(reason.into()))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PipelineError::NoRoot
                | PipelineError::Element {
                    source: ElementError::Configuration(_),
                    ..
                }
        )
    }

    pub fn is_data_source(&self) -> bool {
        matches!(
            self,
            PipelineError::Element {
                source: ElementError::DataSource { .. }
                    | ElementError::EmptyResponse(_)
                    | ElementError::Decode(_)
                    | ElementError::Transport(_),
                ..
            }
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Validation { .. })
    }

    /// Name of the element the failure originated in, if any.
    pub fn element_name(&self) -> Option<&str> {
        match self {
            PipelineError::Element { element, .. } => Some(element),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        let cfg = PipelineError::configuration("limiter", "bad input");
        assert!(cfg.is_configuration());
        assert!(!cfg.is_data_source());
        assert_eq!(cfg.element_name(), Some("limiter"));

        let ds = PipelineError::element(
            "country",
            ElementError::DataSource {
                status: 500,
                detail: "boom".to_string(),
            },
        );
        assert!(ds.is_data_source());
        assert_eq!(
            ds.to_string(),
            "element 'country' failed: data source error: HTTP 500 (boom)"
        );
    }

    #[test]
    fn only_503_is_temporarily_unavailable() {
        let e503 = ElementError::DataSource {
            status: 503,
            detail: String::new(),
        };
        let e502 = ElementError::DataSource {
            status: 502,
            detail: String::new(),
        };
        assert!(e503.is_temporarily_unavailable());
        assert!(!e502.is_temporarily_unavailable());
    }
}
