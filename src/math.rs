//! Small numeric helpers shared by the analysis modules.

/// Round half away from zero to `places` decimals.
pub fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Local hours 22:00 through 05:59 count as night.
pub fn is_night_hour(hour: u32) -> bool {
    hour >= 22 || hour < 6
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bessel-corrected sample standard deviation; 0 when fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let squared: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    (squared / (values.len() - 1) as f64).sqrt()
}
