//! Feature tables, label and weight columns
//!
//! A `FeatureTable` is a dense `n_samples x n_features` matrix of either
//! integer codes or real values, optionally carrying one name per column.
//! Construction is the only place shape is checked: once built, every column
//! has exactly `n_samples` elements.

use crate::error::{FeastError, FeastResult};
use crate::ffi::types::{ElementType, NativeElement};
use crate::result::SelectionResult;
use ndarray::{Array2, Axis, ShapeBuilder};

/// Typed storage behind a `FeatureTable`
#[derive(Debug, Clone, PartialEq)]
pub enum TableData {
    IntegerCode(Array2<u32>),
    Real(Array2<f64>),
}

/// Samples x features matrix handed to a selection routine
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    data: TableData,
    names: Option<Vec<String>>,
}

impl FeatureTable {
    /// Build a table from sample rows
    ///
    /// Rejects an empty table, empty rows and ragged rows.
    pub fn from_rows<T: NativeElement>(rows: &[Vec<T>]) -> FeastResult<Self> {
        let n_samples = rows.len();
        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        check_extent(n_samples, n_features)?;

        let mut flat = Vec::with_capacity(n_samples * n_features);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_features {
                return Err(FeastError::ShapeMismatch(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    n_features
                )));
            }
            flat.extend_from_slice(row);
        }

        let array = Array2::from_shape_vec((n_samples, n_features), flat)
            .map_err(|e| FeastError::ShapeMismatch(e.to_string()))?;
        Ok(Self::wrap(array))
    }

    /// Build a table from feature columns, stored column-major
    pub fn from_columns<T: NativeElement>(columns: &[Vec<T>]) -> FeastResult<Self> {
        let n_features = columns.len();
        let n_samples = columns.first().map(Vec::len).unwrap_or(0);
        check_extent(n_samples, n_features)?;

        let mut flat = Vec::with_capacity(n_samples * n_features);
        for (j, column) in columns.iter().enumerate() {
            if column.len() != n_samples {
                return Err(FeastError::ShapeMismatch(format!(
                    "column {} has {} values, expected {}",
                    j,
                    column.len(),
                    n_samples
                )));
            }
            flat.extend_from_slice(column);
        }

        let array = Array2::from_shape_vec((n_samples, n_features).f(), flat)
            .map_err(|e| FeastError::ShapeMismatch(e.to_string()))?;
        Ok(Self::wrap(array))
    }

    /// Wrap an existing array, in any memory order
    pub fn from_array<T: NativeElement>(array: Array2<T>) -> FeastResult<Self> {
        check_extent(array.nrows(), array.ncols())?;
        Ok(Self::wrap(array))
    }

    fn wrap<T: NativeElement>(array: Array2<T>) -> Self {
        Self {
            data: T::wrap_table(array),
            names: None,
        }
    }

    /// Attach one name per feature column
    pub fn with_names<S: Into<String>>(mut self, names: Vec<S>) -> FeastResult<Self> {
        if names.len() != self.n_features() {
            return Err(FeastError::ShapeMismatch(format!(
                "{} column names for {} features",
                names.len(),
                self.n_features()
            )));
        }
        self.names = Some(names.into_iter().map(Into::into).collect());
        Ok(self)
    }

    pub fn n_samples(&self) -> usize {
        match &self.data {
            TableData::IntegerCode(a) => a.nrows(),
            TableData::Real(a) => a.nrows(),
        }
    }

    pub fn n_features(&self) -> usize {
        match &self.data {
            TableData::IntegerCode(a) => a.ncols(),
            TableData::Real(a) => a.ncols(),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match &self.data {
            TableData::IntegerCode(_) => ElementType::IntegerCode,
            TableData::Real(_) => ElementType::Real,
        }
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    /// Borrow the backing array as element type `T`
    pub fn array<T: NativeElement>(&self) -> Option<&Array2<T>> {
        T::table(&self.data)
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// Widen integer codes to reals; real tables are cloned as is
    ///
    /// Codes up to 2^32 are exactly representable, so the conversion loses
    /// nothing. Names are kept.
    pub fn to_real(&self) -> FeatureTable {
        let data = match &self.data {
            TableData::IntegerCode(a) => TableData::Real(a.mapv(f64::from)),
            TableData::Real(a) => TableData::Real(a.clone()),
        };
        FeatureTable {
            data,
            names: self.names.clone(),
        }
    }

    /// Reduced table of the selected columns, in selection order
    ///
    /// `Unselected` slots are skipped. Fails with `ShapeMismatch` when nothing
    /// was selected or an index is outside this table.
    pub fn select_columns(&self, result: &SelectionResult) -> FeastResult<FeatureTable> {
        let indices = result.selected_indices();
        if indices.is_empty() {
            return Err(FeastError::ShapeMismatch(
                "selection holds no features".to_string(),
            ));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_features()) {
            return Err(FeastError::ShapeMismatch(format!(
                "feature {} is outside a table of {} features",
                bad,
                self.n_features()
            )));
        }

        let data = match &self.data {
            TableData::IntegerCode(a) => TableData::IntegerCode(a.select(Axis(1), &indices)),
            TableData::Real(a) => TableData::Real(a.select(Axis(1), &indices)),
        };
        let names = self
            .names
            .as_ref()
            .map(|names| indices.iter().map(|&i| names[i].clone()).collect());

        Ok(FeatureTable { data, names })
    }
}

fn check_extent(n_samples: usize, n_features: usize) -> FeastResult<()> {
    if n_samples == 0 || n_features == 0 {
        return Err(FeastError::ShapeMismatch(format!(
            "table must have at least one sample and one feature, got {}x{}",
            n_samples, n_features
        )));
    }
    Ok(())
}

/// Target value per sample
#[derive(Debug, Clone, PartialEq)]
pub enum LabelColumn {
    IntegerCode(Vec<u32>),
    Real(Vec<f64>),
}

impl LabelColumn {
    pub fn len(&self) -> usize {
        match self {
            LabelColumn::IntegerCode(v) => v.len(),
            LabelColumn::Real(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            LabelColumn::IntegerCode(_) => ElementType::IntegerCode,
            LabelColumn::Real(_) => ElementType::Real,
        }
    }

    /// True when every sample carries the same label
    pub fn is_constant(&self) -> bool {
        match self {
            LabelColumn::IntegerCode(v) => v.windows(2).all(|w| w[0] == w[1]),
            LabelColumn::Real(v) => v.windows(2).all(|w| w[0] == w[1]),
        }
    }

    /// Widen integer codes to reals
    pub fn to_real(&self) -> LabelColumn {
        match self {
            LabelColumn::IntegerCode(v) => {
                LabelColumn::Real(v.iter().copied().map(f64::from).collect())
            }
            LabelColumn::Real(v) => LabelColumn::Real(v.clone()),
        }
    }
}

impl From<Vec<u32>> for LabelColumn {
    fn from(values: Vec<u32>) -> Self {
        u32::wrap_labels(values)
    }
}

impl From<Vec<f64>> for LabelColumn {
    fn from(values: Vec<f64>) -> Self {
        f64::wrap_labels(values)
    }
}

/// Per-sample weights for the weighted routines
#[derive(Debug, Clone, PartialEq)]
pub struct WeightColumn(Vec<f64>);

impl WeightColumn {
    /// Wrap weights, rejecting NaN and infinities
    pub fn new(weights: Vec<f64>) -> FeastResult<Self> {
        if let Some((index, &value)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(FeastError::NonFiniteWeight { index, value });
        }
        Ok(Self(weights))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}
