#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("No completed runs to aggregate")]
    NoRuns,
    #[error("Need at least {needed} samples but only {found} were recorded")]
    InsufficientSamples { needed: usize, found: usize },
}

/// Sum of all values, saturating rather than wrapping.
pub(crate) fn total(values: &[u64]) -> u64 {
    values.iter().fold(0u64, |acc, value| acc.saturating_add(*value))
}

pub(crate) fn mean(values: &[f64]) -> Result<f64, AggregationError> {
    if values.is_empty() {
        return Err(AggregationError::NoRuns);
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation, with Bessel's correction (N - 1 denominator).
pub fn sample_std_dev(values: &[f64]) -> Result<f64, AggregationError> {
    if values.len() < 2 {
        return Err(AggregationError::InsufficientSamples {
            needed: 2,
            found: values.len(),
        });
    }

    let mean = mean(values)?;
    let sum_sq = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>();

    Ok((sum_sq / (values.len() - 1) as f64).sqrt())
}
