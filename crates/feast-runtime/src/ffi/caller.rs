//! Native routine invocation using direct function pointers
//!
//! Every entry point has one of three statically known prototypes (see
//! `ArgShape`), so the resolved address is cast to the matching `extern "C"`
//! function type instead of going through a dynamic FFI layer.
//!
//! An `Invocation` validates everything it can before the call. Once the
//! routine has run, the only remaining failure is a `DecodeError` raised by
//! the result decoder.

use crate::error::{FeastError, FeastResult};
use crate::ffi::loader::{EntryPoint, NativeModule};
use crate::ffi::projector::ColumnPointerTable;
use crate::ffi::resolver::{ArgShape, RoutineDescriptor};
use crate::ffi::types::{ElementType, ExtraParameters, IndexBuffer, NativeElement};
use crate::table::{FeatureTable, LabelColumn, WeightColumn};
use std::os::raw::{c_double, c_uint};
use tracing::debug;

type PlainFn<T> = unsafe extern "C" fn(
    c_uint,
    c_uint,
    c_uint,
    *mut *mut T,
    *mut T,
    *mut T,
    *mut c_double,
) -> *mut T;

type WeightedFn<T> = unsafe extern "C" fn(
    c_uint,
    c_uint,
    c_uint,
    *mut *mut T,
    *mut T,
    *mut c_double,
    *mut T,
    *mut c_double,
) -> *mut T;

type ExtendedFn<T> = unsafe extern "C" fn(
    c_uint,
    c_uint,
    c_uint,
    *mut *mut T,
    *mut T,
    *mut T,
    *mut c_double,
    c_double,
    c_double,
) -> *mut T;

/// Buffers written by one native call, not yet interpreted
#[derive(Debug)]
pub struct NativeOutput {
    indices: IndexBuffer,
    scores: Vec<f64>,
    returned: *const (),
}

impl NativeOutput {
    pub(crate) fn from_parts(indices: IndexBuffer, scores: Vec<f64>, returned: *const ()) -> Self {
        Self {
            indices,
            scores,
            returned,
        }
    }

    /// Index buffer as written by the routine, `k` entries
    pub fn indices(&self) -> &IndexBuffer {
        &self.indices
    }

    /// The whole `n_features` scores buffer, including the unread tail
    pub fn raw_scores(&self) -> &[f64] {
        &self.scores
    }

    /// Pointer the routine returned
    pub fn returned(&self) -> *const () {
        self.returned
    }

    pub(crate) fn into_parts(self) -> (IndexBuffer, Vec<f64>, *const ()) {
        (self.indices, self.scores, self.returned)
    }
}

/// A fully specified call of one resolved routine
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    descriptor: &'static RoutineDescriptor,
    table: &'a FeatureTable,
    labels: &'a LabelColumn,
    k: usize,
    weights: Option<&'a WeightColumn>,
    extra: Option<ExtraParameters>,
    reject_constant_labels: bool,
}

impl<'a> Invocation<'a> {
    pub fn new(
        descriptor: &'static RoutineDescriptor,
        table: &'a FeatureTable,
        labels: &'a LabelColumn,
        k: usize,
    ) -> Self {
        Self {
            descriptor,
            table,
            labels,
            k,
            weights: None,
            extra: None,
            reject_constant_labels: true,
        }
    }

    pub fn with_weights(mut self, weights: &'a WeightColumn) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_extra(mut self, extra: ExtraParameters) -> Self {
        self.extra = Some(extra);
        self
    }

    pub fn reject_constant_labels(mut self, reject: bool) -> Self {
        self.reject_constant_labels = reject;
        self
    }

    pub fn descriptor(&self) -> &'static RoutineDescriptor {
        self.descriptor
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn n_features(&self) -> usize {
        self.table.n_features()
    }

    /// Check every precondition of the native contract
    pub fn validate(&self) -> FeastResult<()> {
        let n_samples = self.table.n_samples();
        let n_features = self.table.n_features();
        let descriptor = self.descriptor;

        if self.k == 0 || self.k > n_features {
            return Err(FeastError::InvalidBudget {
                k: self.k,
                n_features,
            });
        }

        if self.labels.len() != n_samples {
            return Err(FeastError::DimensionMismatch {
                what: "label column",
                expected: n_samples,
                got: self.labels.len(),
            });
        }

        let weighted = descriptor.shape == ArgShape::Weighted;
        match self.weights {
            Some(weights) if weighted => {
                if weights.len() != n_samples {
                    return Err(FeastError::DimensionMismatch {
                        what: "weight column",
                        expected: n_samples,
                        got: weights.len(),
                    });
                }
            }
            None if !weighted => {}
            _ => {
                return Err(FeastError::UnsupportedCombination {
                    algorithm: descriptor.algorithm,
                    facets: descriptor.facets,
                })
            }
        }

        let extended = descriptor.shape == ArgShape::Extended;
        if self.extra.is_some() != extended {
            return Err(FeastError::UnsupportedCombination {
                algorithm: descriptor.algorithm,
                facets: descriptor.facets,
            });
        }

        if self.labels.element_type() != descriptor.element {
            return Err(FeastError::TypeMismatch {
                what: "label column",
                expected: descriptor.element,
                got: self.labels.element_type(),
            });
        }
        if self.table.element_type() != descriptor.element {
            return Err(FeastError::TypeMismatch {
                what: "feature table",
                expected: descriptor.element,
                got: self.table.element_type(),
            });
        }

        if c_uint::try_from(n_samples).is_err() || c_uint::try_from(n_features).is_err() {
            return Err(FeastError::ShapeMismatch(format!(
                "{}x{} table does not fit the native unsigned int dimensions",
                n_samples, n_features
            )));
        }

        if self.reject_constant_labels && self.labels.is_constant() {
            return Err(FeastError::ConstantLabels);
        }

        Ok(())
    }

    /// Validate, resolve the entry point in `module` and call it once
    pub fn invoke<M: NativeModule + ?Sized>(&self, module: &M) -> FeastResult<NativeOutput> {
        self.validate()?;
        let entry = module.entry_point(self.descriptor.symbol)?;
        debug!(
            module = module.name(),
            symbol = self.descriptor.symbol,
            signature = %self.descriptor.signature(),
            k = self.k,
            "invoking native routine"
        );
        match self.descriptor.element {
            ElementType::IntegerCode => self.call_typed::<u32>(entry),
            ElementType::Real => self.call_typed::<f64>(entry),
        }
    }

    fn call_typed<T: NativeElement>(&self, entry: EntryPoint<'_>) -> FeastResult<NativeOutput> {
        let columns = ColumnPointerTable::<T>::project(self.table)?;
        let labels = T::labels(self.labels).ok_or(FeastError::TypeMismatch {
            what: "label column",
            expected: T::ELEMENT,
            got: self.labels.element_type(),
        })?;

        let n_features = columns.n_features();
        let mut indices = vec![T::ZERO; self.k];
        let mut scores = vec![0.0; n_features];
        debug!(
            indices = indices.len(),
            scores = scores.len(),
            "allocated output buffers"
        );

        // validate() has bounded all three against c_uint
        let k = self.k as c_uint;
        let n_samples = columns.n_samples() as c_uint;
        let n_features = n_features as c_uint;
        let matrix = columns.as_native();
        let labels_ptr = labels.as_ptr() as *mut T;
        let indices_ptr = indices.as_mut_ptr();
        let scores_ptr = scores.as_mut_ptr();
        let raw = entry.as_ptr();

        // Safety: the descriptor fixes the prototype, the projection and the
        // label slice outlive the call, and both output buffers are sized as
        // the routine expects.
        let returned = unsafe {
            match self.descriptor.shape {
                ArgShape::Plain => {
                    let f: PlainFn<T> = std::mem::transmute_copy(&raw);
                    f(k, n_samples, n_features, matrix, labels_ptr, indices_ptr, scores_ptr)
                }
                ArgShape::Weighted => {
                    let weights = self
                        .weights
                        .map(|w| w.as_slice().as_ptr() as *mut c_double)
                        .ok_or(FeastError::UnsupportedCombination {
                            algorithm: self.descriptor.algorithm,
                            facets: self.descriptor.facets,
                        })?;
                    let f: WeightedFn<T> = std::mem::transmute_copy(&raw);
                    f(
                        k,
                        n_samples,
                        n_features,
                        matrix,
                        labels_ptr,
                        weights,
                        indices_ptr,
                        scores_ptr,
                    )
                }
                ArgShape::Extended => {
                    let extra = self.extra.ok_or(FeastError::UnsupportedCombination {
                        algorithm: self.descriptor.algorithm,
                        facets: self.descriptor.facets,
                    })?;
                    let f: ExtendedFn<T> = std::mem::transmute_copy(&raw);
                    f(
                        k,
                        n_samples,
                        n_features,
                        matrix,
                        labels_ptr,
                        indices_ptr,
                        scores_ptr,
                        extra.beta,
                        extra.gamma,
                    )
                }
            }
        };

        Ok(NativeOutput::from_parts(
            T::into_index_buffer(indices),
            scores,
            returned as *const (),
        ))
    }
}
