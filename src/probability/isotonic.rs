/// Isotonic calibration (§4.4): a piecewise-linear `(score, point)` table
/// produced offline by an isotonic fit; interpolated linearly between
/// anchors, clamped at the endpoints. The CI band width and confidence are
/// not specified by the calibration table itself, so a fixed +/-0.05 band
/// and moderate confidence are used, matching the LLM fallback's band.
pub fn isotonic(score: f64, table: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    debug_assert!(!table.is_empty(), "isotonic table must not be empty");

    let point = if score <= table[0].0 {
        table[0].1
    } else if score >= table[table.len() - 1].0 {
        table[table.len() - 1].1
    } else {
        let mut point = table[table.len() - 1].1;
        for window in table.windows(2) {
            let (x0, y0) = window[0];
            let (x1, y1) = window[1];
            if score >= x0 && score <= x1 {
                let t = (score - x0) / (x1 - x0);
                point = y0 + (y1 - y0) * t;
                break;
            }
        }
        point
    };

    let lower = (point - 0.05).max(0.01);
    let upper = (point + 0.05).min(0.99);
    (point, lower, upper, 0.7)
}
