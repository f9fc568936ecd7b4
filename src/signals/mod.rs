//! Signal scorer (§4.3): maps features to normalized per-signal scores and
//! two composite scores (long-vol `L`, short-vol `S`).

mod normalize;

pub use normalize::zscore;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::features::{Features, RegimeState};
use crate::schema::InputSnapshot;

const INDEX_SYMBOLS: [&str; 4] = ["SPX", "NDX", "RUT", "DJX"];

/// Positive ⇒ favors long-vol (§3.2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalScores {
    pub s_vrp: f64,
    pub s_gex: f64,
    pub s_vex: f64,
    pub s_carry: f64,
    pub s_skew: f64,
    pub s_vanna: f64,
    pub s_rv: f64,
    pub s_liq: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompositeScores {
    pub long_vol_score: f64,
    pub short_vol_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBreakdownEntry {
    pub name: String,
    pub raw_score: f64,
    pub weight_long: f64,
    pub weight_short: f64,
    pub contribution_long: f64,
    pub contribution_short: f64,
}

pub fn is_index_symbol(symbol: &str) -> bool {
    INDEX_SYMBOLS.contains(&symbol)
}

/// Computes per-signal scores and the two composite scores, in a fixed
/// evaluation order so floating-point sums are deterministic run to run.
pub fn score(
    snapshot: &InputSnapshot,
    features: &Features,
    config: &Config,
) -> (SignalScores, CompositeScores, Vec<SignalBreakdownEntry>) {
    let norm = &config.normalization;

    let s_vrp = -zscore(features.vrp.selected, norm.vrp.0, norm.vrp.1, 3.0);
    let s_carry = -zscore(features.term.slope, norm.term_slope.0, norm.term_slope.1, 3.0)
        - 0.5 * zscore(features.term.curvature, norm.term_curvature.0, norm.term_curvature.1, 3.0);
    let s_skew = zscore(
        features.skew.asymmetry,
        norm.skew_asymmetry.0,
        norm.skew_asymmetry.1,
        3.0,
    );

    let gex_direction = match features.regime.state {
        RegimeState::NegativeGamma => 1.0,
        RegimeState::PositiveGamma => -1.0,
        RegimeState::Neutral => 0.0,
    };
    let gex_scale = (features.regime.trigger_distance_pct.abs() / 0.02).min(1.0);
    let gex_level = gex_direction * gex_scale;
    let pin_penalty = if matches!(features.regime.state, RegimeState::PositiveGamma)
        && features.regime.is_pin_risk
    {
        -1.0
    } else {
        0.0
    };
    let s_gex = gex_level + pin_penalty;

    let s_vex = zscore(-features.vex_net_5_60, norm.vex_net.0, norm.vex_net.1, 3.0);
    let s_vanna = -zscore(features.vanna_atm_abs, norm.vanna.0, norm.vanna.1, 3.0);
    let s_rv = zscore(
        features.rv_momentum,
        norm.rv_momentum.0,
        norm.rv_momentum.1,
        3.0,
    );
    let s_liq = -(features.liquidity.spread_z.max(0.0)
        + 0.5 * features.liquidity.ivask_premium_z.max(0.0));

    let scores = SignalScores {
        s_vrp,
        s_gex,
        s_vex,
        s_carry,
        s_skew,
        s_vanna,
        s_rv,
        s_liq,
    };

    let is_single_stock = !is_index_symbol(&snapshot.symbol);

    // Fixed order: vrp, gex, vex, carry, skew, vanna, rv, liq.
    let wl = &config.weights_long;
    let ws = &config.weights_short;
    let mut breakdown = Vec::with_capacity(8);

    let mut push = |name: &str, raw: f64, weight_long: f64, weight_short: f64| {
        breakdown.push(SignalBreakdownEntry {
            name: name.to_string(),
            raw_score: raw,
            weight_long,
            weight_short,
            contribution_long: raw * weight_long,
            contribution_short: -raw * weight_short,
        });
    };
    push("vrp", s_vrp, wl.vrp, ws.vrp);
    push("gex", s_gex, wl.gex, ws.gex);
    push("vex", s_vex, wl.vex, ws.vex);
    push("carry", s_carry, wl.carry, ws.carry);
    push("skew", s_skew, wl.skew, ws.skew);
    push("vanna", s_vanna, wl.vanna, 0.0);
    push("rv", s_rv, wl.rv, ws.rv);
    // s_liq keeps its sign on both sides (negative contribution on both).
    breakdown.push(SignalBreakdownEntry {
        name: "liq".to_string(),
        raw_score: s_liq,
        weight_long: wl.liq,
        weight_short: ws.liq,
        contribution_long: s_liq * wl.liq,
        contribution_short: s_liq * ws.liq,
    });

    let mut long_vol_score: f64 = breakdown.iter().map(|e| e.contribution_long).sum();
    let mut short_vol_score: f64 = breakdown.iter().map(|e| e.contribution_short).sum();

    if is_single_stock {
        let boost = wl.single_stock_boost * (s_gex + s_vex + s_skew);
        long_vol_score += boost;
    } else {
        // Index-only additions (corr_idx, flow_putcrowd) have no raw input
        // field in this schema; their weighted contribution is a documented
        // no-op until a data source supplies them.
        short_vol_score += 0.0 * (ws.corr_idx + ws.flow_putcrowd);
    }

    let composite = CompositeScores {
        long_vol_score,
        short_vol_score,
    };

    (scores, composite, breakdown)
}
