//! Errors raised while validating and composing a configuration.
//!
//! Every error aborts the build; nothing here is recoverable.

use thiserror::Error;

use crate::id::Identifier;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// First violation found while checking raw configuration against descriptors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("[{path}] is a required option")]
    MissingRequiredField { path: String },

    #[error("[{path}] expected {expected}")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("unknown value '{value}' for [{path}], valid options are: {}", .allowed.join(", "))]
    UnknownEnumValue {
        path: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("[{path}] is an invalid option")]
    UnknownField { path: String },

    #[error("[{path}] value {value} is outside of {min}..={max}")]
    OutOfRange {
        path: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ValidationError {
    pub fn path(&self) -> &str {
        match self {
            ValidationError::MissingRequiredField { path }
            | ValidationError::TypeMismatch { path, .. }
            | ValidationError::UnknownEnumValue { path, .. }
            | ValidationError::UnknownField { path }
            | ValidationError::OutOfRange { path, .. } => path,
        }
    }
}

/// Failure while linking validated devices and entities into graphs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("ID '{id}' redefined")]
    DuplicateIdentifier { id: Identifier },

    #[error("couldn't find {kind} with ID '{id}'")]
    UnresolvedReference { kind: String, id: Identifier },

    #[error(
        "several {kind} candidates ({}), set an explicit {kind}_id",
        .candidates.iter().map(Identifier::as_str).collect::<Vec<_>>().join(", ")
    )]
    AmbiguousReference {
        kind: String,
        candidates: Vec<Identifier>,
    },

    #[error("slot '{slot}' of '{device}' is bound more than once")]
    SlotAlreadyBound { device: Identifier, slot: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
