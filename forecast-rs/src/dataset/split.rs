//! Train/test partitioning

use crate::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row positions assigned to each partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn check_fraction(name: &str, fraction: f64) -> Result<()> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "{name} must be in (0, 1), got {fraction}"
        )));
    }
    Ok(())
}

/// Index of the first row after the leading `fraction` of `n` rows, `floor(fraction * n)`
pub fn boundary(n: usize, fraction: f64) -> usize {
    ((n as f64) * fraction).floor() as usize
}

/// Keep the leading `train_fraction` of rows for training, in order
pub fn chronological_split<T: Clone>(rows: &[T], train_fraction: f64) -> Result<(Vec<T>, Vec<T>)> {
    check_fraction("train fraction", train_fraction)?;
    let at = boundary(rows.len(), train_fraction);
    Ok((rows[..at].to_vec(), rows[at..].to_vec()))
}

/// Partition sizes for a `test_size` share: the test side is rounded up
pub fn train_test_sizes(n: usize, test_size: f64) -> Result<(usize, usize)> {
    check_fraction("test size", test_size)?;
    let n_test = ((n as f64) * test_size).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_train == 0 || n_test == 0 {
        return Err(ForecastError::insufficient("train/test split", 2, n));
    }
    Ok((n_train, n_test))
}

/// Ordered split where the trailing `test_size` share is held out
pub fn ordered_split(n: usize, test_size: f64) -> Result<SplitIndices> {
    let (n_train, _) = train_test_sizes(n, test_size)?;
    Ok(SplitIndices {
        train: (0..n_train).collect(),
        test: (n_train..n).collect(),
    })
}

/// Random split; a fixed `seed` makes it reproducible
pub fn shuffled_split(n: usize, test_size: f64, seed: Option<u64>) -> Result<SplitIndices> {
    let (_, n_test) = train_test_sizes(n, test_size)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);
    let train = order.split_off(n_test);
    Ok(SplitIndices { train, test: order })
}

/// Gather rows by position
pub fn take<T: Clone>(rows: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| rows[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chronological_split_preserves_order() {
        let rows: Vec<usize> = (0..25).collect();
        let (train, test) = chronological_split(&rows, 0.7).unwrap();
        assert_eq!(train.len(), 17);
        assert_eq!(test.len(), 8);
        assert_eq!(train, (0..17).collect::<Vec<_>>());
        assert_eq!(test[0], 17);
    }

    #[test]
    fn test_boundary_floors() {
        assert_eq!(boundary(105, 0.1), 10);
        assert_eq!(boundary(9, 0.1), 0);
        assert_eq!(boundary(1000, 0.7), 700);
    }

    #[test]
    fn test_ordered_split_rounds_test_up() {
        let split = ordered_split(11, 0.4).unwrap();
        assert_eq!(split.test.len(), 5);
        assert_eq!(split.train, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffled_split_is_a_partition() {
        let split = shuffled_split(50, 0.2, Some(7)).unwrap();
        assert_eq!(split.test.len(), 10);
        assert_eq!(split.train.len(), 40);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());

        let again = shuffled_split(50, 0.2, Some(7)).unwrap();
        assert_eq!(split, again);
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(chronological_split(&[1, 2, 3], 1.5).is_err());
        assert!(shuffled_split(1, 0.2, None).is_err());
    }
}
