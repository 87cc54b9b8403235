//! Summary statistics behind the histogram and violin charts.

use super::spec::{BoxStats, DensityPoint, HistogramBin};

/// Number of density samples drawn for a violin outline.
const DENSITY_SAMPLES: usize = 64;

/// Quantile `q` ∈ [0, 1] of an ascending slice, linearly interpolated
/// between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Equal-width histogram over the range of `values`, heights in percent of
/// the finite values. A zero-width range gives a single bin holding 100 %.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let sorted = sorted_finite(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    let n = sorted.len() as f64;

    let width = (max - min) / bins.max(1) as f64;
    if width <= 0.0 {
        return vec![HistogramBin {
            start: min,
            end: max,
            percent: 100.0,
        }];
    }

    let mut counts = vec![0usize; bins];
    for &v in &sorted {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            percent: c as f64 / n * 100.0,
        })
        .collect()
}

/// Box statistics with whiskers at the most extreme values within
/// 1.5 × IQR of the quartiles.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let sorted = sorted_finite(values);
    let q1 = quantile(&sorted, 0.25)?;
    let median = quantile(&sorted, 0.5)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|&v| v >= lo_fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= hi_fence)
        .unwrap_or(q3);

    Some(BoxStats {
        min: sorted[0],
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        max: sorted[sorted.len() - 1],
    })
}

/// Silverman's rule-of-thumb bandwidth for a Gaussian kernel.
pub fn silverman_bandwidth(sorted: &[f64]) -> f64 {
    let n = sorted.len() as f64;
    if n < 2.0 {
        return 1.0;
    }
    let mean = sorted.iter().sum::<f64>() / n;
    let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    let iqr = quantile(sorted, 0.75).unwrap_or(0.0) - quantile(sorted, 0.25).unwrap_or(0.0);
    let spread = if iqr > 0.0 { std.min(iqr / 1.34) } else { std };
    let h = 0.9 * spread * n.powf(-0.2);
    if h > 0.0 {
        h
    } else {
        1.0
    }
}

/// Gaussian kernel density over the data range padded by two bandwidths,
/// normalized so the highest sample is 1.
pub fn kernel_density(values: &[f64]) -> Vec<DensityPoint> {
    let sorted = sorted_finite(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };

    let h = silverman_bandwidth(&sorted);
    let (lo, hi) = (min - 2.0 * h, max + 2.0 * h);
    let step = (hi - lo) / (DENSITY_SAMPLES - 1) as f64;

    let raw: Vec<(f64, f64)> = (0..DENSITY_SAMPLES)
        .map(|i| {
            let x = lo + step * i as f64;
            let d: f64 = sorted
                .iter()
                .map(|v| {
                    let u = (x - v) / h;
                    (-0.5 * u * u).exp()
                })
                .sum();
            (x, d)
        })
        .collect();

    let peak = raw.iter().map(|&(_, d)| d).fold(0.0, f64::max);
    raw.into_iter()
        .map(|(value, d)| DensityPoint {
            value,
            density: if peak > 0.0 { d / peak } else { 0.0 },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert_eq!(quantile(&v, 0.25), Some(1.75));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn histogram_percentages_sum_to_one_hundred() {
        let values: Vec<f64> = (0..37).map(|i| (i * i) as f64).collect();
        let bins = histogram(&values, 20);
        assert_eq!(bins.len(), 20);
        let total: f64 = bins.iter().map(|b| b.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(bins[0].start, 0.0);
        assert!((bins[19].end - 1296.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_max_value_lands_in_last_bin() {
        let bins = histogram(&[0.0, 10.0], 5);
        assert_eq!(bins[0].percent, 50.0);
        assert_eq!(bins[4].percent, 50.0);
    }

    #[test]
    fn histogram_of_constant_values_is_one_bin() {
        let bins = histogram(&[7.0, 7.0, 7.0], 20);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].percent, 100.0);
        assert!(histogram(&[], 20).is_empty());
    }

    #[test]
    fn box_whiskers_stop_at_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let stats = box_stats(&values).unwrap();
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.q1, 2.25);
        assert_eq!(stats.q3, 4.75);
        assert_eq!(stats.upper_whisker, 5.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.max, 100.0);
    }

    #[test]
    fn density_peaks_at_one_near_the_mode() {
        let values = [10.0, 10.5, 11.0, 10.2, 30.0];
        let density = kernel_density(&values);
        assert_eq!(density.len(), DENSITY_SAMPLES);
        let peak = density
            .iter()
            .max_by(|a, b| a.density.total_cmp(&b.density))
            .unwrap();
        assert!((peak.density - 1.0).abs() < 1e-12);
        assert!(peak.value > 8.0 && peak.value < 13.0);
    }

    #[test]
    fn single_value_density_is_finite() {
        let density = kernel_density(&[42.0]);
        assert!(density.iter().all(|p| p.density.is_finite()));
    }
}
