//! Error taxonomy of the adapter
//!
//! Everything up to and including `InvalidBudget` is detected before the
//! native routine runs. `DecodeError` is the only error raised after it.

use crate::ffi::resolver::{Algorithm, Facets};
use crate::ffi::types::ElementType;
use feast_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeastError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Dimension mismatch: {what} has {got} entries, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Type mismatch: {what} holds {got} elements, routine expects {expected}")]
    TypeMismatch {
        what: &'static str,
        expected: ElementType,
        got: ElementType,
    },

    #[error("No native routine for {algorithm} with {facets}")]
    UnsupportedCombination { algorithm: Algorithm, facets: Facets },

    #[error("Symbol '{symbol}' not found in native module '{module}'")]
    SymbolNotFound { module: String, symbol: String },

    #[error("Failed to load native module: {0}")]
    ModuleLoadError(String),

    #[error("Invalid selection budget: k = {k}, must be between 1 and {n_features}")]
    InvalidBudget { k: usize, n_features: usize },

    #[error("Beta-Gamma needs both scalars, {missing} is missing")]
    IncompleteExtraParameters { missing: &'static str },

    #[error("Weight for sample {index} is not finite: {value}")]
    NonFiniteWeight { index: usize, value: f64 },

    #[error("Label column holds a single value, every mutual information term would be zero")]
    ConstantLabels,

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for adapter operations
pub type FeastResult<T> = Result<T, FeastError>;
