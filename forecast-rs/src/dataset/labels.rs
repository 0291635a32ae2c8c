//! Supervised labels derived from a price column

/// Shift a column `shift` rows into the past: entry `i` holds `values[i + shift]`.
/// The output keeps the input length; the final `shift` entries are `None`.
pub fn shift_future(values: &[f64], shift: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| values.get(i + shift).copied())
        .collect()
}

/// Feature/label pairs for "predict the value `shift` rows ahead".
/// Both vectors have length `values.len() - shift` (empty when there are too few rows).
pub fn future_pairs(values: &[f64], shift: usize) -> (Vec<f64>, Vec<f64>) {
    let labelled = values.len().saturating_sub(shift);
    let features = values[..labelled].to_vec();
    let labels = shift_future(values, shift)
        .into_iter()
        .take(labelled)
        .flatten()
        .collect();
    (features, labels)
}

/// Up/down label per row: `Some(1)` when the next close is strictly higher,
/// `Some(0)` otherwise, `None` for the final row which has no successor.
pub fn direction_labels(closes: &[f64]) -> Vec<Option<u8>> {
    (0..closes.len())
        .map(|i| {
            closes
                .get(i + 1)
                .map(|next| u8::from(*next > closes[i]))
        })
        .collect()
}

/// Percentage change from the previous row; the first entry is `None`
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i == 0 {
                None
            } else {
                Some(values[i] / values[i - 1] - 1.0)
            }
        })
        .collect()
}

/// Running sum that skips missing entries, leaving them missing
pub fn cumsum(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut total = 0.0;
    values
        .iter()
        .map(|v| {
            v.map(|x| {
                total += x;
                total
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_future_keeps_length() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let shifted = shift_future(&values, 3);
        assert_eq!(shifted.len(), 10);
        assert_eq!(shifted[0], Some(3.0));
        assert_eq!(shifted[6], Some(9.0));
        assert!(shifted[7..].iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_future_pairs_lengths() {
        let values: Vec<f64> = (0..250).map(|i| i as f64 * 2.0).collect();
        let (x, y) = future_pairs(&values, 100);
        assert_eq!(x.len(), 150);
        assert_eq!(y.len(), 150);
        assert_eq!(x[0], 0.0);
        assert_eq!(y[0], 200.0);
        assert_eq!(y[149], values[249]);
    }

    #[test]
    fn test_future_pairs_too_short() {
        let (x, y) = future_pairs(&[1.0, 2.0], 5);
        assert!(x.is_empty());
        assert!(y.is_empty());
    }

    #[test]
    fn test_direction_labels() {
        let closes = [10.0, 11.0, 11.0, 9.0, 12.0];
        let labels = direction_labels(&closes);
        assert_eq!(labels, vec![Some(1), Some(0), Some(0), Some(1), None]);
    }

    #[test]
    fn test_pct_change_and_cumsum() {
        let changes = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(changes[0], None);
        assert!((changes[1].unwrap() - 0.1).abs() < 1e-12);
        assert!((changes[2].unwrap() + 0.1).abs() < 1e-12);

        let total = cumsum(&changes);
        assert_eq!(total[0], None);
        assert!(total[2].unwrap().abs() < 1e-12);
    }
}
