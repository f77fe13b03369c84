//! Errors that abort a code generation pass.

use story_model::ModelError;
use thiserror::Error;

/// Errors raised while building contexts or resolving fragments.
///
/// Any of these aborts the current pass; no partial output is produced.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A reference was not found anywhere in the scope chain.
    #[error("unresolved reference `{reference}` while resolving {component}")]
    UnresolvedReference { reference: String, component: String },

    /// The story model is inconsistent and no context chain can be built over it.
    #[error("malformed story model: {0}")]
    MalformedModel(String),

    #[error("unknown format `{format}` while resolving {component}")]
    UnknownFormat { format: String, component: String },

    #[error("unknown series data `{data}` while resolving {component}")]
    UnknownSeries { data: String, component: String },

    #[error("unknown scope data `{data}` while resolving {component}")]
    UnknownScope { data: String, component: String },

    #[error("unknown condition `{condition}` while resolving {component}")]
    UnknownCondition { condition: String, component: String },

    /// A variable was read while it had no binding.
    #[error("variable `{variable}` is unbound in {component}")]
    UnboundVariable { variable: String, component: String },

    #[error("format nesting exceeded {0} levels")]
    FormatDepthExceeded(usize),

    #[error("invalid translator definition: {0}")]
    Definition(#[from] toml::de::Error),

    #[error("invalid translator definition: {0}")]
    DefinitionJson(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl CodegenError {
    pub(crate) fn unresolved(reference: impl Into<String>, component: impl Into<String>) -> Self {
        CodegenError::UnresolvedReference {
            reference: reference.into(),
            component: component.into(),
        }
    }
}
