use thiserror::Error;

use crate::component::ComponentId;
use crate::layer::LayerId;
use crate::qgeometry::TableKind;

/// Errors raised while resolving options or building component geometry.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Missing option '{key}'")]
    MissingOption { key: String },

    #[error("Invalid value '{value}' for option '{key}': {reason}")]
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown design variable '{0}'")]
    UnknownVariable(String),

    #[error("Design variable '{0}' refers to itself through a cycle")]
    CyclicVariable(String),

    #[error("Component '{component}' does not declare the {table} table")]
    UndeclaredTable { component: String, table: TableKind },

    #[error("Geometry '{name}' cannot be stored in the {table} table")]
    KindMismatch { name: String, table: TableKind },

    #[error("Geometry '{name}' subtracts from layer {layer}, which has no ground plane")]
    NoGroundPlane { name: String, layer: LayerId },

    #[error("Pin '{0}' must be placed from a line")]
    PinNotLine(String),

    #[error("Degenerate geometry '{name}': {reason}")]
    DegenerateGeometry { name: String, reason: String },

    #[error("A component named '{0}' already exists")]
    DuplicateComponent(String),

    #[error("Unknown component {0}")]
    UnknownComponent(ComponentId),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn missing_option(key: impl Into<String>) -> Self {
        Self::MissingOption { key: key.into() }
    }

    pub fn invalid_option(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn degenerate(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
