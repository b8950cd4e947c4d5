//! Categorical values to dense integer codes
//!
//! Each distinct value gets the next free code in the order it is first
//! seen, starting at 0. Feature columns are encoded independently, so the
//! same value may carry different codes in different columns.

use crate::error::{FeastError, FeastResult};
use crate::table::{FeatureTable, LabelColumn};
use std::collections::HashMap;
use std::hash::Hash;

/// Codes assigned to the distinct values of one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMap<T: Hash + Eq> {
    values: Vec<T>,
    codes: HashMap<T, u32>,
}

impl<T: Hash + Eq + Clone> CodeMap<T> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            codes: HashMap::new(),
        }
    }

    /// Code for `value`, assigning the next one if it is new
    pub fn encode(&mut self, value: &T) -> FeastResult<u32> {
        if let Some(&code) = self.codes.get(value) {
            return Ok(code);
        }
        let code = u32::try_from(self.values.len()).map_err(|_| {
            FeastError::ShapeMismatch("column holds more than 2^32 distinct values".to_string())
        })?;
        self.values.push(value.clone());
        self.codes.insert(value.clone(), code);
        Ok(code)
    }

    /// Encode a whole column in order
    pub fn encode_all(&mut self, values: &[T]) -> FeastResult<Vec<u32>> {
        values.iter().map(|v| self.encode(v)).collect()
    }

    pub fn code(&self, value: &T) -> Option<u32> {
        self.codes.get(value).copied()
    }

    /// Value that was given `code`
    pub fn value(&self, code: u32) -> Option<&T> {
        self.values.get(code as usize)
    }

    /// Distinct values in code order
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Hash + Eq + Clone> Default for CodeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureTable {
    /// Encode categorical feature columns, one code map per column
    pub fn from_categorical_columns<T: Hash + Eq + Clone>(
        columns: &[Vec<T>],
    ) -> FeastResult<(FeatureTable, Vec<CodeMap<T>>)> {
        let mut maps = Vec::with_capacity(columns.len());
        let mut encoded = Vec::with_capacity(columns.len());
        for column in columns {
            let mut map = CodeMap::new();
            encoded.push(map.encode_all(column)?);
            maps.push(map);
        }
        let table = FeatureTable::from_columns(&encoded)?;
        Ok((table, maps))
    }

    /// Encode categorical sample rows, one code map per column
    ///
    /// Rejects an empty table and ragged rows, like `from_rows`.
    pub fn from_categorical_rows<T: Hash + Eq + Clone>(
        rows: &[Vec<T>],
    ) -> FeastResult<(FeatureTable, Vec<CodeMap<T>>)> {
        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(FeastError::ShapeMismatch(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                n_features
            )));
        }

        let mut maps: Vec<CodeMap<T>> = (0..n_features).map(|_| CodeMap::new()).collect();
        let mut encoded = vec![Vec::with_capacity(rows.len()); n_features];
        for row in rows {
            for ((value, map), column) in row.iter().zip(&mut maps).zip(&mut encoded) {
                column.push(map.encode(value)?);
            }
        }
        let table = FeatureTable::from_columns(&encoded)?;
        Ok((table, maps))
    }
}

impl LabelColumn {
    /// Encode categorical labels in first-seen order
    pub fn from_categorical<T: Hash + Eq + Clone>(
        values: &[T],
    ) -> FeastResult<(LabelColumn, CodeMap<T>)> {
        let mut map = CodeMap::new();
        let codes = map.encode_all(values)?;
        Ok((LabelColumn::from(codes), map))
    }
}
