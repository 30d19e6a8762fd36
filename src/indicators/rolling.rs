// =============================================================================
// Rolling-window statistics over partially defined series
// =============================================================================
//
// A window produces a value only when every element inside it is defined, so
// the warm-up of the input series carries through to the output plus
// `window - 1` more positions.

/// Apply `f` to every complete window; positions before the first complete
/// window (or windows containing a gap) are `None`.
fn rolling<F>(series: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut result = vec![None; series.len()];
    if window == 0 || series.len() < window {
        return result;
    }

    let mut buf = Vec::with_capacity(window);
    for end in window..=series.len() {
        buf.clear();
        buf.extend(series[end - window..end].iter().map_while(|v| *v));
        if buf.len() == window {
            result[end - 1] = f(&buf);
        }
    }
    result
}

pub fn rolling_sum(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(series, window, |w| Some(w.iter().sum()))
}

pub fn rolling_mean(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(series, window, |w| Some(mean(w)))
}

/// Sample standard deviation (n - 1 denominator) of each complete window.
pub fn rolling_std(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(series, window, |w| {
        if w.len() < 2 {
            return None;
        }
        let m = mean(w);
        let variance = w.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (w.len() - 1) as f64;
        Some(variance.sqrt())
    })
}

/// `series[i] - series[i - lag]` wherever both ends are defined.
pub fn diff(series: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    series
        .iter()
        .enumerate()
        .map(|(i, current)| {
            let previous = i.checked_sub(lag).and_then(|j| series[j])?;
            Some((*current)? - previous)
        })
        .collect()
}

/// `(value - mean) / std`, undefined when `std` is zero or any input is
/// undefined.
pub fn z_score(value: Option<f64>, mean: Option<f64>, std: Option<f64>) -> Option<f64> {
    let (value, mean, std) = (value?, mean?, std?);
    if std == 0.0 {
        return None;
    }
    let z = (value - mean) / std;
    z.is_finite().then_some(z)
}

fn mean(w: &[f64]) -> f64 {
    w.iter().sum::<f64>() / w.len() as f64
}
