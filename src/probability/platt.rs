/// Platt scaling (§4.4): `point = sigma(a*score + b)`; `(a, b)` and the
/// standard error are supplied externally (this crate never fits them from
/// a trade-history table — see Non-goals). CI is the documented analytic
/// approximation `point +/- 1.96*se`.
pub fn platt(score: f64, a: f64, b: f64, se: f64) -> (f64, f64, f64, f64) {
    let point = sigmoid(a * score + b);
    let lower = point - 1.96 * se;
    let upper = point + 1.96 * se;
    let confidence = (1.0 - 2.0 * se).clamp(0.0, 0.95);
    (point, lower, upper, confidence)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_at_zero_is_half() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn platt_interval_widens_with_se() {
        let (_, lower_tight, upper_tight, _) = platt(1.0, 1.0, 0.0, 0.02);
        let (_, lower_wide, upper_wide, _) = platt(1.0, 1.0, 0.0, 0.10);
        assert!(upper_wide - lower_wide > upper_tight - lower_tight);
    }

    #[test]
    fn higher_score_gives_higher_point_for_positive_slope() {
        let (p_low, ..) = platt(0.5, 1.0, 0.0, 0.05);
        let (p_high, ..) = platt(2.0, 1.0, 0.0, 0.05);
        assert!(p_high > p_low);
    }
}
