//! Label encoding for arbitrary class labels.

use ndarray::Array1;

/// Maps arbitrary ordered labels to contiguous class codes `0..n_classes`.
///
/// Codes follow the sorted order of the distinct labels, so code `0` is the
/// smallest label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder<L> {
    classes: Vec<L>,
}

impl<L: Ord + Clone> LabelEncoder<L> {
    /// Learn the distinct labels.
    pub fn fit(labels: &[L]) -> Self {
        let mut classes = labels.to_vec();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Learn the distinct labels and encode `labels` in one pass.
    pub fn fit_transform(labels: &[L]) -> (Self, Array1<u32>) {
        let encoder = Self::fit(labels);
        let codes = labels
            .iter()
            .map(|label| encoder.code(label).unwrap_or_default())
            .collect();
        (encoder, codes)
    }

    /// Sorted distinct labels; index `i` is the label of code `i`.
    #[inline]
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    #[inline]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Code of a single label, `None` if it was not seen during fitting.
    pub fn code(&self, label: &L) -> Option<u32> {
        self.classes.binary_search(label).ok().map(|i| i as u32)
    }

    /// Encode labels. `None` if any label was not seen during fitting.
    pub fn transform(&self, labels: &[L]) -> Option<Array1<u32>> {
        labels.iter().map(|label| self.code(label)).collect::<Option<Vec<_>>>().map(Array1::from)
    }

    /// Label of a single code, `None` if out of range.
    #[inline]
    pub fn label(&self, code: usize) -> Option<&L> {
        self.classes.get(code)
    }

    /// Decode class codes back to labels. `None` if any code is out of range.
    pub fn inverse_transform(&self, codes: &[u32]) -> Option<Vec<L>> {
        codes.iter().map(|&c| self.label(c as usize).cloned()).collect()
    }
}
