//! Foreign Function Interface (FFI) to the FEAST native library
//!
//! Call path:
//! - Resolution: algorithm + facets → entry point descriptor
//! - Projection: feature table → one pointer per column
//! - Invocation: argument list per descriptor shape, one call
//! - Decoding: index and score buffers → selection result
//!
//! # Safety
//!
//! FFI operations involve `unsafe` code and careful memory management.
//! All unsafe code is isolated in this module with safe wrappers.

pub mod caller;
pub mod loader;
pub mod marshal;
pub mod projector;
pub mod resolver;
pub mod safety;
pub mod types;

pub use caller::{Invocation, NativeOutput};
pub use loader::{EntryPoint, FeastLibrary, NativeModule, SharedLibrary};
pub use marshal::ResultDecoder;
pub use projector::ColumnPointerTable;
pub use resolver::{resolve, routines, Algorithm, ArgShape, Facets, RoutineDescriptor};
pub use types::{ElementType, ExtraParameters, IndexBuffer, NativeElement};
