//! Robust location and scale estimators.
//!
//! The Qn estimator follows Croux & Rousseeuw (1992): the k-th order
//! statistic of the pairwise absolute differences, with k = C(h, 2) and
//! h = n/2 + 1, scaled by the normal-consistency constant and a
//! finite-sample correction. It stays consistent under up to ~50% outlier
//! contamination, unlike the standard deviation.

use std::cmp::Ordering;

/// Normal-consistency constant for the Qn estimator.
const QN_CONSISTENCY: f64 = 2.2219;

/// Median of a sample. Returns NaN for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Finite-sample correction factors from Croux & Rousseeuw (1992).
fn qn_correction(n: usize) -> f64 {
    match n {
        2 => 0.399,
        3 => 0.994,
        4 => 0.512,
        5 => 0.844,
        6 => 0.611,
        7 => 0.857,
        8 => 0.669,
        9 => 0.872,
        _ => {
            if n % 2 == 1 {
                n as f64 / (n as f64 + 1.4)
            } else {
                n as f64 / (n as f64 + 3.8)
            }
        }
    }
}

/// Qn robust scale estimate. Zero for fewer than 2 observations and for a
/// constant sample.
pub fn qn_scale(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let h = n / 2 + 1;
    let k = h * (h - 1) / 2;

    let mut diffs = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            diffs.push((values[i] - values[j]).abs());
        }
    }

    let (_, kth, _) =
        diffs.select_nth_unstable_by(k - 1, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    QN_CONSISTENCY * qn_correction(n) * *kth
}

/// Modified z-scores: (x - median) / qn_scale.
///
/// Returns `None` when the scale is undefined (fewer than 2 observations)
/// or degenerate (zero, i.e. a constant sample); callers treat that as
/// "no reading deviates".
pub fn modified_z_scores(values: &[f64]) -> Option<Vec<f64>> {
    if values.len() < 2 {
        return None;
    }

    let scale = qn_scale(values);
    if scale == 0.0 {
        return None;
    }

    let center = median(values);
    Some(values.iter().map(|x| (x - center) / scale).collect())
}
