pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean, `None` for an empty window.
    pub fn mean(samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }

    pub fn mean_abs(samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().map(|v| v.abs()).sum::<f64>() / samples.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_has_no_mean() {
        assert_eq!(StatsHelper::mean(&[]), None);
        assert_eq!(StatsHelper::mean_abs(&[]), None);
    }

    #[test]
    fn mean_abs_folds_sign() {
        assert_eq!(StatsHelper::mean(&[-4.0, 2.0]), Some(-1.0));
        assert_eq!(StatsHelper::mean_abs(&[-4.0, 2.0]), Some(3.0));
    }
}
