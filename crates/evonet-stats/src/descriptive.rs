use serde::{Deserialize, Serialize};

/// Descriptive statistics of a sample of `f64` values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of values in the sample.
    pub count: usize,
    pub min: f64,
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Middle value (upper middle for even counts).
    pub median: f64,
    /// Population variance.
    pub variance: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes statistics from unsorted values.
    ///
    /// Values are sorted with [`f64::total_cmp`], so NaN sorts last instead of
    /// poisoning the comparison.
    ///
    /// # Returns
    ///
    /// `None` if `values` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use evonet_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([10.0, 0.0, 0.0, 0.0]).unwrap();
    /// assert_eq!(stats.count, 4);
    /// assert_eq!(stats.max, 10.0);
    /// assert_eq!(stats.mean, 2.5);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes statistics from values already sorted in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a.total_cmp(b).is_le()),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = sorted_values[count / 2];
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}
