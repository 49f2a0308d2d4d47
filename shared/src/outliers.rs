//! # Outlier rejection for offset measurements
//!
//! Two filters are provided:
//!
//! * [`remove_outliers`] – the half-split filter. The sorted offsets are cut
//!   into a lower & upper half, a "median" is picked from each half and their
//!   difference is used as the interquartile range. Values further than
//!   `1.5 × IQR` from the **mean** are dropped, and the pass is repeated until
//!   nothing more is removed or only 3 values remain. This is an
//!   approximation of true quartiles (the per-half index is nudged up by one
//!   for odd lengths) and is kept as-is so offsets match existing hosts.
//! * [`remove_outliers_quartile`] – Tukey fences around true quartiles
//!   (linear interpolation, found by quickselect). A single large spike
//!   cannot drag the centre of this filter, unlike the mean used above.

/// Which outlier filter the sync engine runs over a session's offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlierFilter {
    /// Half-split IQR around the mean, repeated until stable
    #[default]
    HalfSplit,
    /// Tukey fences `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]`, single pass
    Quartile,
    /// Keep every sample
    Disabled,
}

impl OutlierFilter {
    pub fn apply(&self, offsets: &[f64]) -> Vec<f64> {
        match self {
            OutlierFilter::HalfSplit => remove_outliers(offsets),
            OutlierFilter::Quartile => remove_outliers_quartile(offsets),
            OutlierFilter::Disabled => offsets.to_vec(),
        }
    }
}

const FENCE_FACTOR: f64 = 1.5;

// recursion stops once this many values (or fewer) remain
const MIN_RETAINED: usize = 3;

/// Half-split IQR trimming, repeated while it keeps removing values and more
/// than 3 values are left. The result is sorted ascending.
///
/// Inputs with fewer than 2 values are returned unchanged. Note that the
/// filter is centred on the mean, so a single huge spike can push every
/// value outside the fence and produce an empty result.
pub fn remove_outliers(offsets: &[f64]) -> Vec<f64> {
    let mut current = offsets.to_vec();
    loop {
        if current.len() < 2 {
            return current;
        }
        current.sort_by(f64::total_cmp);

        let filtered = half_split_pass(&current);
        if filtered.len() < current.len() && filtered.len() > MIN_RETAINED {
            current = filtered;
        } else {
            return filtered;
        }
    }
}

fn half_split_pass(sorted: &[f64]) -> Vec<f64> {
    // summing identical values can round the mean away from them
    if sorted.first() == sorted.last() {
        return sorted.to_vec();
    }

    let count = sorted.len();
    let half = count / 2;
    let odd_offset = count % 2;

    let lower = &sorted[..half];
    let upper = &sorted[half + odd_offset..half + odd_offset + half];

    let iqr = half_median(upper) - half_median(lower);
    let limit = FENCE_FACTOR * iqr;
    let center = mean(sorted).unwrap_or(0.0);

    sorted
        .iter()
        .copied()
        .filter(|value| {
            let deviation = (center - value).abs();
            // with zero spread only exact matches to the mean survive
            deviation < limit || deviation == 0.0
        })
        .collect()
}

// `half` is never empty here: callers only split inputs of length >= 2
fn half_median(half: &[f64]) -> f64 {
    let len = half.len();
    let index = len / 2 + if len % 2 == 0 { 0 } else { 1 };
    half[index.min(len - 1)]
}

/// Tukey-fence trimming around interpolated quartiles, single pass. Values
/// keep their input order. Inputs with fewer than 4 values are returned
/// unchanged.
pub fn remove_outliers_quartile(offsets: &[f64]) -> Vec<f64> {
    if offsets.len() <= MIN_RETAINED {
        return offsets.to_vec();
    }

    let mut scratch = offsets.to_vec();
    let q1 = quantile(&mut scratch, 0.25);
    let q3 = quantile(&mut scratch, 0.75);
    let iqr = q3 - q1;
    let low = q1 - FENCE_FACTOR * iqr;
    let high = q3 + FENCE_FACTOR * iqr;

    offsets
        .iter()
        .copied()
        .filter(|value| *value >= low && *value <= high)
        .collect()
}

fn quantile(values: &mut [f64], q: f64) -> f64 {
    let position = q * (values.len() - 1) as f64;
    let lo = position.floor() as usize;
    let fraction = position - position.floor();

    let (_, lo_value, right) = values.select_nth_unstable_by(lo, f64::total_cmp);
    let lo_value = *lo_value;
    if fraction == 0.0 {
        return lo_value;
    }

    let hi_value = right
        .iter()
        .copied()
        .min_by(f64::total_cmp)
        .unwrap_or(lo_value);
    lo_value + (hi_value - lo_value) * fraction
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (average of the two middle values for even lengths), `None` for an
/// empty slice
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
