//! Result decoding - native output buffers → `SelectionResult`
//!
//! Position `i` of the index buffer and position `i` of the scores buffer
//! describe the `i`-th pick. Scores are never looked up by feature index.
//!
//! Sentinels (CondMI routines only):
//! - unsigned layout: `u32::MAX`, the bit pattern of the `-1` the routines write
//! - floating layout: any negative value, documented as `-1.0`

use crate::error::{FeastError, FeastResult};
use crate::ffi::caller::NativeOutput;
use crate::ffi::resolver::RoutineDescriptor;
use crate::ffi::safety::ensure_returns_buffer;
use crate::ffi::types::IndexBuffer;
use crate::result::{SelectedFeature, SelectionResult};
use tracing::{debug, warn};

/// Decoder for the output of one call of `descriptor`
#[derive(Debug, Clone, Copy)]
pub struct ResultDecoder {
    descriptor: &'static RoutineDescriptor,
    k: usize,
    n_features: usize,
}

impl ResultDecoder {
    pub fn new(descriptor: &'static RoutineDescriptor, k: usize, n_features: usize) -> Self {
        Self {
            descriptor,
            k,
            n_features,
        }
    }

    /// Interpret the buffers of a finished call
    pub fn decode(&self, output: NativeOutput) -> FeastResult<SelectionResult> {
        let symbol = self.descriptor.symbol;
        let (indices, scores, returned) = output.into_parts();

        ensure_returns_buffer(returned, indices.as_ptr(), symbol)?;

        if indices.element_type() != self.descriptor.returns() {
            return Err(FeastError::DecodeError(format!(
                "{} declares {} indices, buffer holds {}",
                symbol,
                self.descriptor.returns(),
                indices.element_type()
            )));
        }
        if indices.len() != self.k || scores.len() < self.k {
            return Err(FeastError::DecodeError(format!(
                "{} produced {} indices and {} scores for k = {}",
                symbol,
                indices.len(),
                scores.len(),
                self.k
            )));
        }

        let features = match &indices {
            IndexBuffer::Unsigned(values) => values
                .iter()
                .enumerate()
                .map(|(slot, &v)| self.decode_unsigned(slot, v))
                .collect::<FeastResult<Vec<_>>>()?,
            IndexBuffer::Real(values) => values
                .iter()
                .enumerate()
                .map(|(slot, &v)| self.decode_real(slot, v))
                .collect::<FeastResult<Vec<_>>>()?,
        };

        let tail = &scores[self.k..];
        if !tail.is_empty() {
            debug!(symbol, tail = ?tail, "unread scores buffer tail");
        }

        let result = SelectionResult::new(
            self.descriptor.algorithm,
            features,
            scores[..self.k].to_vec(),
        );
        if result.unselected_count() > 0 {
            warn!(
                symbol,
                unselected = result.unselected_count(),
                k = self.k,
                "routine stopped before filling every slot"
            );
        }
        Ok(result)
    }

    fn decode_unsigned(&self, slot: usize, value: u32) -> FeastResult<SelectedFeature> {
        if value == u32::MAX && self.descriptor.algorithm.has_unselected_sentinel() {
            return Ok(SelectedFeature::Unselected);
        }
        self.in_range(slot, value as usize, || value.to_string())
    }

    fn decode_real(&self, slot: usize, value: f64) -> FeastResult<SelectedFeature> {
        if value < 0.0 && self.descriptor.algorithm.has_unselected_sentinel() {
            return Ok(SelectedFeature::Unselected);
        }
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(self.bad_index(slot, value.to_string()));
        }
        if value >= self.n_features as f64 {
            return Err(self.bad_index(slot, value.to_string()));
        }
        Ok(SelectedFeature::Selected(value as usize))
    }

    fn in_range(
        &self,
        slot: usize,
        index: usize,
        shown: impl FnOnce() -> String,
    ) -> FeastResult<SelectedFeature> {
        if index < self.n_features {
            Ok(SelectedFeature::Selected(index))
        } else {
            Err(self.bad_index(slot, shown()))
        }
    }

    fn bad_index(&self, slot: usize, shown: String) -> FeastError {
        FeastError::DecodeError(format!(
            "{} wrote index {} at position {}, table has {} features",
            self.descriptor.symbol, shown, slot, self.n_features
        ))
    }
}
