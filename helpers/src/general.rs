use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

/// InputValueError is used if some simulation constant or option does not fulfill the posed
/// requirements, e.g., a lower bound exceeding its upper bound.
#[derive(Debug, Clone)]
pub struct InputValueError(pub String);

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value: {}", self.0)
    }
}

impl Error for InputValueError {}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array. The sort is stable, incomparable values
/// (NaN) are treated as equal.
pub fn argsort<T: PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => {
            indices.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal))
        }
        SortOrder::Descending => {
            indices.sort_by(|&a, &b| x[b].partial_cmp(&x[a]).unwrap_or(Ordering::Equal))
        }
    }
    indices
}

/// lin_interp returns the linearly interpolated value at x for given discrete data points xp, fp.
/// xp must be increasing. Values outside of xp are clamped to the boundary values of fp.
/// Inspired by numpy.interp.
pub fn lin_interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if xp.len() != fp.len() || xp.is_empty() {
        panic!("Number of items in xp and fp must be equal and non-zero!")
    }

    if x <= xp[0] {
        return fp[0];
    }

    for i in 1..xp.len() {
        if x <= xp[i] {
            return fp[i - 1] + (x - xp[i - 1]) * (fp[i] - fp[i - 1]) / (xp[i] - xp[i - 1]);
        }
    }

    fp[fp.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argsort_orders_both_ways() {
        let x = [3.0, 1.0, 2.0];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![1, 2, 0]);
        assert_eq!(argsort(&x, SortOrder::Descending), vec![0, 2, 1]);
    }

    #[test]
    fn argsort_is_stable_for_ties() {
        let x = [1.0, 0.5, 1.0, 0.5];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![1, 3, 0, 2]);
    }

    #[test]
    fn lin_interp_clamps_and_interpolates() {
        let xp = [0.0, 380.0];
        let fp = [0.70, 1.05];
        assert_eq!(lin_interp(-10.0, &xp, &fp), 0.70);
        assert_eq!(lin_interp(1000.0, &xp, &fp), 1.05);
        assert!((lin_interp(190.0, &xp, &fp) - 0.875).abs() < 1e-12);
    }
}
