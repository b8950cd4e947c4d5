//! Decoded selection output

use crate::ffi::resolver::Algorithm;

/// One slot of the native index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectedFeature {
    /// Column index into the feature table
    Selected(usize),
    /// The routine found no feature meeting its information threshold here
    Unselected,
}

impl SelectedFeature {
    pub fn index(&self) -> Option<usize> {
        match self {
            SelectedFeature::Selected(i) => Some(*i),
            SelectedFeature::Unselected => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, SelectedFeature::Selected(_))
    }
}

/// Features in the order the routine picked them, with parallel scores
///
/// Slot `i` of `features` and slot `i` of `scores` were written together by
/// the native routine. The order is never changed after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    algorithm: Algorithm,
    features: Vec<SelectedFeature>,
    scores: Vec<f64>,
}

impl SelectionResult {
    /// Pair features with scores
    ///
    /// Only the decoder builds results, and it sizes both sequences from `k`.
    ///
    /// # Panics
    ///
    /// Panics if the two sequences differ in length.
    pub(crate) fn new(
        algorithm: Algorithm,
        features: Vec<SelectedFeature>,
        scores: Vec<f64>,
    ) -> Self {
        assert_eq!(
            features.len(),
            scores.len(),
            "features and scores must be parallel"
        );
        Self {
            algorithm,
            features,
            scores,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Number of slots, always the requested `k`
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[SelectedFeature] {
        &self.features
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Valid feature indices in selection order, `Unselected` slots dropped
    pub fn selected_indices(&self) -> Vec<usize> {
        self.features.iter().filter_map(SelectedFeature::index).collect()
    }

    pub fn unselected_count(&self) -> usize {
        self.features.iter().filter(|f| !f.is_selected()).count()
    }

    /// Iterate `(feature, score)` pairs in selection order
    pub fn iter(&self) -> impl Iterator<Item = (SelectedFeature, f64)> + '_ {
        self.features
            .iter()
            .copied()
            .zip(self.scores.iter().copied())
    }

    pub fn into_parts(self) -> (Vec<SelectedFeature>, Vec<f64>) {
        (self.features, self.scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SelectionResult {
        SelectionResult::new(
            Algorithm::CondMi,
            vec![
                SelectedFeature::Selected(4),
                SelectedFeature::Selected(0),
                SelectedFeature::Unselected,
            ],
            vec![0.9, 0.1, 0.0],
        )
    }

    #[test]
    fn test_selected_indices_keep_order() {
        assert_eq!(sample().selected_indices(), vec![4, 0]);
        assert_eq!(sample().unselected_count(), 1);
        assert_eq!(sample().len(), 3);
    }

    #[test]
    fn test_iter_pairs_by_position() {
        let pairs: Vec<_> = sample().iter().collect();
        assert_eq!(pairs[0], (SelectedFeature::Selected(4), 0.9));
        assert_eq!(pairs[2], (SelectedFeature::Unselected, 0.0));
    }

    #[test]
    #[should_panic(expected = "parallel")]
    fn test_mismatched_lengths_panic() {
        SelectionResult::new(Algorithm::Mim, vec![SelectedFeature::Selected(0)], vec![]);
    }
}
