//! Histogram binning
//!
//! Computes bin counts for a column of numeric values. Binning follows the conventions of
//! common plotting libraries so charts stay comparable with earlier reports:
//!
//! - every bin is half-open `[low, high)`, except the last which is closed `[low, high]`
//! - values outside the outermost edges fall into no bin and are counted as excluded
//! - a bin count over a single repeated value spans `[value - 0.5, value + 0.5]`

use thiserror::Error;

/// How bins are chosen for a column
#[derive(Debug, Clone, PartialEq)]
pub enum BinSpec {
    /// Explicit, strictly increasing bin edges
    Edges(Vec<f64>),
    /// Number of equal-width bins spanning the observed min/max
    Count(usize),
}

/// Errors that can occur while binning values
#[derive(Error, Debug, PartialEq)]
pub enum HistogramError {
    #[error("Bin count must be at least 1")]
    ZeroBinCount,

    #[error("At least two bin edges are required, got {0}")]
    TooFewEdges(usize),

    #[error("Bin edges must be finite, got {0}")]
    NonFiniteEdge(f64),

    #[error("Bin edges must be strictly increasing ({previous} followed by {next})")]
    UnsortedEdges { previous: f64, next: f64 },
}

type Result<T> = core::result::Result<T, HistogramError>;

/// Bin edges and per-bin counts for one column
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges; always one longer than `counts`
    pub edges: Vec<f64>,
    /// Number of values in each bin
    pub counts: Vec<usize>,
    /// Number of values that fell outside every bin
    pub excluded: usize,
}

impl BinSpec {
    /// Checks that the spec can produce at least one bin
    pub fn validate(&self) -> Result<()> {
        match self {
            BinSpec::Count(0) => Err(HistogramError::ZeroBinCount),
            BinSpec::Count(_) => Ok(()),
            BinSpec::Edges(edges) => validate_edges(edges),
        }
    }
}

fn validate_edges(edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(HistogramError::TooFewEdges(edges.len()));
    }

    if let Some(edge) = edges.iter().find(|edge| !edge.is_finite()) {
        return Err(HistogramError::NonFiniteEdge(*edge));
    }

    for pair in edges.windows(2) {
        if pair[1] <= pair[0] {
            return Err(HistogramError::UnsortedEdges {
                previous: pair[0],
                next: pair[1],
            });
        }
    }

    Ok(())
}

/// Evenly spaced edges from `first` to `last` inclusive
fn linear_edges(first: f64, last: f64, bins: usize) -> Vec<f64> {
    let width = last - first;
    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| first + width * i as f64 / bins as f64)
        .collect();
    // Guard against rounding drift on the closing edge.
    edges[bins] = last;
    edges
}

/// Observed range of the values, widened when it collapses to a single point
fn value_range(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

impl Histogram {
    /// Bins `values` according to `spec`.
    ///
    /// Non-finite values are never binned and count as excluded.
    pub fn compute(values: &[f64], spec: &BinSpec) -> Result<Self> {
        spec.validate()?;

        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let non_finite = values.len() - finite.len();

        let (edges, uniform) = match spec {
            BinSpec::Edges(edges) => (edges.clone(), false),
            BinSpec::Count(bins) => {
                let (first, last) = value_range(&finite);
                (linear_edges(first, last, *bins), true)
            }
        };

        let bins = edges.len() - 1;
        let first = edges[0];
        let last = edges[bins];
        let mut counts = vec![0usize; bins];
        let mut excluded = non_finite;

        for value in finite {
            if value < first || value > last {
                excluded += 1;
                continue;
            }

            let index = if uniform {
                uniform_bin_index(&edges, value)
            } else {
                edge_bin_index(&edges, value)
            };
            counts[index] += 1;
        }

        Ok(Self {
            edges,
            counts,
            excluded,
        })
    }

    /// Iterates over `(low, high, count)` for every bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(pair, count)| (pair[0], pair[1], *count))
    }

    /// Number of values that landed in a bin
    pub fn binned(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Number of values offered to the histogram, binned or not
    pub fn total(&self) -> usize {
        self.binned() + self.excluded
    }

    /// Largest bin count, or 0 when there are no bins with values
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Bin lookup for arbitrary sorted edges. `value` must lie within the outer edges.
fn edge_bin_index(edges: &[f64], value: f64) -> usize {
    let bins = edges.len() - 1;
    // Number of edges <= value; the bin to the left of that edge holds the value.
    let upper = edges.partition_point(|edge| *edge <= value);
    upper.saturating_sub(1).min(bins - 1)
}

/// Bin lookup for evenly spaced edges. `value` must lie within the outer edges.
fn uniform_bin_index(edges: &[f64], value: f64) -> usize {
    let bins = edges.len() - 1;
    let first = edges[0];
    let last = edges[bins];

    let scaled = (value - first) * bins as f64 / (last - first);
    let mut index = (scaled as usize).min(bins - 1);

    // The arithmetic estimate can be off by one near an edge; settle against the real edges.
    if value < edges[index] && index > 0 {
        index -= 1;
    } else if index + 1 < bins && value >= edges[index + 1] {
        index += 1;
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn price_edges() -> BinSpec {
        BinSpec::Edges((0..=10).map(|i| i as f64 * 50.0).collect())
    }

    #[test]
    fn test_price_edges_exclude_values_above_last_edge() {
        let histogram = Histogram::compute(&[25.0, 75.0, 520.0], &price_edges()).unwrap();

        assert_eq!(histogram.counts.len(), 10);
        assert_eq!(histogram.counts[0], 1);
        assert_eq!(histogram.counts[1], 1);
        assert_eq!(histogram.binned(), 2);
        assert_eq!(histogram.excluded, 1);
        assert_eq!(histogram.total(), 3);
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(49.99, 0)]
    #[case(50.0, 1)]
    #[case(449.0, 8)]
    #[case(450.0, 9)]
    #[case(500.0, 9)]
    fn test_price_edge_assignment(#[case] value: f64, #[case] expected_bin: usize) {
        let histogram = Histogram::compute(&[value], &price_edges()).unwrap();
        assert_eq!(histogram.counts[expected_bin], 1);
        assert_eq!(histogram.excluded, 0);
    }

    #[test]
    fn test_negative_value_is_excluded() {
        let histogram = Histogram::compute(&[-1.0], &price_edges()).unwrap();
        assert_eq!(histogram.binned(), 0);
        assert_eq!(histogram.excluded, 1);
    }

    #[test]
    fn test_uniform_bins_span_min_max() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        let histogram = Histogram::compute(&values, &BinSpec::Count(20)).unwrap();

        assert_eq!(histogram.edges.len(), 21);
        assert_eq!(histogram.edges[0], 0.0);
        assert_eq!(histogram.edges[20], 100.0);
        assert_eq!(histogram.binned(), 101);
        assert_eq!(histogram.excluded, 0);
        // [0, 5) holds 0..=4, the closed last bin [95, 100] holds 95..=100
        assert_eq!(histogram.counts[0], 5);
        assert_eq!(histogram.counts[19], 6);
    }

    #[test]
    fn test_uniform_bins_single_value() {
        let histogram = Histogram::compute(&[3.0, 3.0], &BinSpec::Count(20)).unwrap();

        assert_eq!(histogram.edges[0], 2.5);
        assert_eq!(histogram.edges[20], 3.5);
        assert_eq!(histogram.binned(), 2);
        assert_eq!(histogram.counts[10], 2);
    }

    #[test]
    fn test_uniform_bins_empty_values() {
        let histogram = Histogram::compute(&[], &BinSpec::Count(4)).unwrap();
        assert_eq!(histogram.edges, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(histogram.total(), 0);
        assert_eq!(histogram.max_count(), 0);
    }

    #[test]
    fn test_non_finite_values_are_excluded() {
        let histogram =
            Histogram::compute(&[1.0, f64::NAN, f64::INFINITY, 2.0], &BinSpec::Count(2)).unwrap();
        assert_eq!(histogram.binned(), 2);
        assert_eq!(histogram.excluded, 2);
    }

    #[rstest]
    #[case(BinSpec::Count(0), HistogramError::ZeroBinCount)]
    #[case(BinSpec::Edges(vec![1.0]), HistogramError::TooFewEdges(1))]
    #[case(
        BinSpec::Edges(vec![0.0, 10.0, 10.0]),
        HistogramError::UnsortedEdges { previous: 10.0, next: 10.0 }
    )]
    fn test_invalid_specs(#[case] spec: BinSpec, #[case] expected: HistogramError) {
        assert_eq!(Histogram::compute(&[1.0], &spec), Err(expected));
    }

    #[test]
    fn test_bins_iterator() {
        let histogram =
            Histogram::compute(&[1.0, 2.0, 2.5], &BinSpec::Edges(vec![0.0, 2.0, 4.0])).unwrap();
        let bins: Vec<_> = histogram.bins().collect();
        assert_eq!(bins, vec![(0.0, 2.0, 1), (2.0, 4.0, 2)]);
        assert_eq!(histogram.max_count(), 2);
    }
}
