//! Selected indices → caller column names

use crate::error::{FeastError, FeastResult};
use crate::result::{SelectedFeature, SelectionResult};
use crate::table::FeatureTable;

/// Map every slot of `result` to the name of its column
///
/// `Unselected` slots become `None`. Fails with `ShapeMismatch` if a selected
/// index has no name.
pub fn materialize<'n, S: AsRef<str>>(
    result: &SelectionResult,
    names: &'n [S],
) -> FeastResult<Vec<Option<&'n str>>> {
    result
        .features()
        .iter()
        .map(|feature| match feature {
            SelectedFeature::Selected(i) => names
                .get(*i)
                .map(|name| Some(name.as_ref()))
                .ok_or_else(|| {
                    FeastError::ShapeMismatch(format!(
                        "feature {} selected but only {} names given",
                        i,
                        names.len()
                    ))
                }),
            SelectedFeature::Unselected => Ok(None),
        })
        .collect()
}

/// Names for `result` taken from the table the selection ran on
///
/// Explicit names must number exactly `table.n_features()`.
pub fn materialize_from<'n>(
    result: &SelectionResult,
    table: &'n FeatureTable,
) -> FeastResult<Vec<Option<&'n str>>> {
    let names = table.names().ok_or_else(|| {
        FeastError::ShapeMismatch("feature table carries no column names".to_string())
    })?;
    materialize(result, names)
}

/// Like `materialize`, checking the name list against the table width first
pub fn materialize_checked<'n, S: AsRef<str>>(
    result: &SelectionResult,
    names: &'n [S],
    n_features: usize,
) -> FeastResult<Vec<Option<&'n str>>> {
    if names.len() != n_features {
        return Err(FeastError::ShapeMismatch(format!(
            "{} names for {} features",
            names.len(),
            n_features
        )));
    }
    materialize(result, names)
}
