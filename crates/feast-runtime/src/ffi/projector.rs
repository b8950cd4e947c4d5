//! Column projection - feature table → one pointer per column
//!
//! The native routines receive the feature matrix as `T**`: an array of
//! `n_features` pointers, pointer `i` addressing the `n_samples` contiguous
//! values of column `i`. This module builds that array as a view over the
//! table.
//!
//! # Memory Safety
//!
//! - A column-major table is borrowed, never copied
//! - Any other memory order is copied once into column-major storage owned
//!   by the view
//! - The view borrows the table, so it cannot outlive it
//! - Pointers are derived from slices; the raw pointer array is only handed
//!   out inside the crate, for the duration of one native call

use crate::error::{FeastError, FeastResult};
use crate::ffi::types::NativeElement;
use crate::table::FeatureTable;
use std::borrow::Cow;
use tracing::debug;

/// Column-pointer view of a feature table, valid for one call
pub struct ColumnPointerTable<'a, T: NativeElement> {
    /// Column-major values, `n_samples * n_features` long
    storage: Cow<'a, [T]>,
    /// Start of each column inside `storage`
    columns: Vec<*const T>,
    n_samples: usize,
    n_features: usize,
}

impl<'a, T: NativeElement> ColumnPointerTable<'a, T> {
    /// Project `table` for a routine expecting elements of type `T`
    ///
    /// Fails with `TypeMismatch` if the table holds the other element family.
    pub fn project(table: &'a FeatureTable) -> FeastResult<Self> {
        let array = table.array::<T>().ok_or(FeastError::TypeMismatch {
            what: "feature table",
            expected: T::ELEMENT,
            got: table.element_type(),
        })?;
        let (n_samples, n_features) = array.dim();

        // A transposed view in standard layout means the columns are
        // already contiguous and consecutive in memory.
        let borrowed = if array.t().is_standard_layout() {
            array.as_slice_memory_order()
        } else {
            None
        };

        let storage = match borrowed {
            Some(slice) => Cow::Borrowed(slice),
            None => {
                debug!(
                    n_samples,
                    n_features, "copying feature table into column-major storage"
                );
                Cow::Owned(array.t().iter().copied().collect::<Vec<T>>())
            }
        };

        if storage.len() != n_samples * n_features {
            return Err(FeastError::ShapeMismatch(format!(
                "table storage holds {} values, expected {}x{}",
                storage.len(),
                n_samples,
                n_features
            )));
        }

        let columns = storage
            .chunks_exact(n_samples)
            .map(<[T]>::as_ptr)
            .collect();

        Ok(Self {
            storage,
            columns,
            n_samples,
            n_features,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Whether the view points straight into the table's own storage
    pub fn is_borrowed(&self) -> bool {
        matches!(self.storage, Cow::Borrowed(_))
    }

    /// Values of column `col`, `None` if out of range
    pub fn column(&self, col: usize) -> Option<&[T]> {
        if col >= self.n_features {
            return None;
        }
        let start = col * self.n_samples;
        self.storage.get(start..start + self.n_samples)
    }

    /// Value at `(row, col)`, `None` if out of range
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.n_samples {
            return None;
        }
        self.column(col).map(|values| values[row])
    }

    /// Pointer array in the `T**` shape the native routines take
    ///
    /// The pointers are valid while `self` is alive. Routines only read
    /// through them, the mutable type merely matches the C prototypes.
    pub(crate) fn as_native(&self) -> *mut *mut T {
        self.columns.as_ptr() as *mut *mut T
    }

    #[cfg(test)]
    pub(crate) fn pointers(&self) -> &[*const T] {
        &self.columns
    }
}
