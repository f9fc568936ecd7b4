/// Piecewise-linear cold-start prior (§4.4, default method).
///
/// Anchors: `1.0 -> [0.55, 0.60]`, `1.5 -> [0.60, 0.65]`, `2.0 -> [0.65, 0.70]`.
/// Below `1.0` extrapolates linearly toward `(score=0, point=0.50)`; negative
/// scores clamp to that same floor point rather than crossing `lower`/`upper`.
/// Above `2.0` adds `min(0.05, (score-2)*0.02)` and caps `upper` at `0.85`.
pub fn cold_start(score: f64) -> (f64, f64, f64, f64) {
    let confidence = (0.5 + 0.15 * score).clamp(0.0, 0.9);

    let effective = score.max(0.0);
    let (lower, upper) = if effective <= 1.0 {
        lerp_pair((0.0, 0.50, 0.50), (1.0, 0.55, 0.60), effective)
    } else if effective <= 1.5 {
        lerp_pair((1.0, 0.55, 0.60), (1.5, 0.60, 0.65), effective)
    } else if effective <= 2.0 {
        lerp_pair((1.5, 0.60, 0.65), (2.0, 0.65, 0.70), effective)
    } else {
        let bump = (0.05_f64).min((effective - 2.0) * 0.02);
        (0.65, (0.70 + bump).min(0.85))
    };

    let point = (lower + upper) / 2.0;
    (point, lower, upper, confidence)
}

fn lerp_pair(a: (f64, f64, f64), b: (f64, f64, f64), x: f64) -> (f64, f64) {
    let t = (x - a.0) / (b.0 - a.0);
    (a.1 + (b.1 - a.1) * t, a.2 + (b.2 - a.2) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_at_1_0() {
        let (point, lower, upper, _) = cold_start(1.0);
        assert!((lower - 0.55).abs() < 1e-9);
        assert!((upper - 0.60).abs() < 1e-9);
        assert!((point - 0.575).abs() < 1e-9);
    }

    #[test]
    fn anchor_at_2_0() {
        let (_, lower, upper, _) = cold_start(2.0);
        assert!((lower - 0.65).abs() < 1e-9);
        assert!((upper - 0.70).abs() < 1e-9);
    }

    #[test]
    fn negative_score_floors_at_half() {
        let (point, lower, upper, _) = cold_start(-2.0);
        assert_eq!(point, 0.50);
        assert_eq!(lower, 0.50);
        assert_eq!(upper, 0.50);
    }

    #[test]
    fn above_2_0_adds_bump_and_caps_upper_at_0_85() {
        let (_, _, upper, _) = cold_start(10.0);
        assert!(upper <= 0.85);
    }

    #[test]
    fn monotone_point_within_and_across_pieces() {
        let scores = [0.0, 0.5, 1.0, 1.25, 1.5, 1.75, 2.0, 2.5, 3.0];
        let mut last = f64::MIN;
        for s in scores {
            let (point, ..) = cold_start(s);
            assert!(point >= last, "point regressed at score {s}");
            last = point;
        }
    }

    #[test]
    fn lower_always_le_point_le_upper() {
        for tenth in -10..=50 {
            let score = f64::from(tenth) / 10.0;
            let (point, lower, upper, _) = cold_start(score);
            assert!(lower <= point + 1e-9, "score={score} lower={lower} point={point}");
            assert!(point <= upper + 1e-9, "score={score} point={point} upper={upper}");
        }
    }
}
