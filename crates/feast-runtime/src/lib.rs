//! FEAST runtime - feature selection through the FEAST native library
//!
//! This library provides:
//! - Feature tables, label and weight columns
//! - Dense integer codes for categorical values
//! - Resolution of an algorithm and calling convention to a native entry point
//! - Column projection, invocation and decoding of the native output
//! - Mapping of selected indices back to column names

/// FEAST runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod categorical;
pub mod error;
pub mod ffi;
pub mod names;
pub mod result;
pub mod select;
pub mod table;

pub use categorical::CodeMap;
pub use error::{FeastError, FeastResult};
pub use ffi::{
    resolve, Algorithm, ElementType, ExtraParameters, Facets, FeastLibrary, NativeModule,
    RoutineDescriptor,
};
pub use names::{materialize, materialize_checked, materialize_from};
pub use result::{SelectedFeature, SelectionResult};
pub use select::{select, Feast, SelectionRequest};
pub use table::{FeatureTable, LabelColumn, TableData, WeightColumn};
