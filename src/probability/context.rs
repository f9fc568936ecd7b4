use crate::features::RegimeState;
use crate::schema::LiquidityFlag;

pub struct AdjustmentContext {
    pub is_event_week: bool,
    pub regime_state: RegimeState,
    pub trigger_distance_pct: f64,
    pub liquidity_flag: LiquidityFlag,
}

/// Applies §4.4's context-adjustment table additively to `(point, lower,
/// upper)`, then re-clamps into `(0.01, 0.99)`. Returns the adjusted triple
/// plus whether any adjustment fired (caller scales confidence by 0.95 when
/// so).
pub fn apply(
    point: f64,
    lower: f64,
    upper: f64,
    is_long_side: bool,
    ctx: &AdjustmentContext,
) -> (f64, f64, f64, bool) {
    let mut delta = 0.0;
    let mut applied = false;

    if ctx.is_event_week {
        delta += if is_long_side { 0.02 } else { -0.01 };
        applied = true;
    }
    let trigger_bonus = (2.0 * ctx.trigger_distance_pct.abs()).min(0.03);
    match ctx.regime_state {
        RegimeState::NegativeGamma if is_long_side => {
            delta += trigger_bonus;
            applied = true;
        }
        RegimeState::PositiveGamma if !is_long_side => {
            delta += trigger_bonus;
            applied = true;
        }
        _ => {}
    }
    if matches!(ctx.liquidity_flag, LiquidityFlag::Poor) {
        delta -= 0.03;
        applied = true;
    }

    let clamp = |v: f64| v.clamp(0.01, 0.99);
    (
        clamp(point + delta),
        clamp(lower + delta),
        clamp(upper + delta),
        applied,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(event: bool, regime: RegimeState, dist: f64, liq: LiquidityFlag) -> AdjustmentContext {
        AdjustmentContext {
            is_event_week: event,
            regime_state: regime,
            trigger_distance_pct: dist,
            liquidity_flag: liq,
        }
    }

    #[test]
    fn event_week_boosts_long_and_dents_short() {
        let (long_point, ..) = apply(
            0.60,
            0.55,
            0.65,
            true,
            &ctx(true, RegimeState::Neutral, 0.0, LiquidityFlag::Good),
        );
        let (short_point, ..) = apply(
            0.60,
            0.55,
            0.65,
            false,
            &ctx(true, RegimeState::Neutral, 0.0, LiquidityFlag::Good),
        );
        assert!((long_point - 0.62).abs() < 1e-9);
        assert!((short_point - 0.59).abs() < 1e-9);
    }

    #[test]
    fn poor_liquidity_dents_both_sides() {
        let (long_point, _, _, applied) = apply(
            0.60,
            0.55,
            0.65,
            true,
            &ctx(false, RegimeState::Neutral, 0.0, LiquidityFlag::Poor),
        );
        assert!(applied);
        assert!((long_point - 0.57).abs() < 1e-9);
    }

    #[test]
    fn result_stays_within_bounds() {
        let (point, lower, upper, _) = apply(
            0.98,
            0.97,
            0.99,
            true,
            &ctx(true, RegimeState::NegativeGamma, 0.5, LiquidityFlag::Good),
        );
        assert!(point <= 0.99 && lower >= 0.01 && upper <= 0.99);
    }

    #[test]
    fn no_adjustment_when_nothing_applies() {
        let (point, _, _, applied) = apply(
            0.60,
            0.55,
            0.65,
            true,
            &ctx(false, RegimeState::Neutral, 0.0, LiquidityFlag::Good),
        );
        assert_eq!(point, 0.60);
        assert!(!applied);
    }
}
