//! Applicability filtering, deterministic scoring, and parameter
//! customization over the static catalogue (§4.6.2).

use crate::features::{RegimeState, SkewRegime, TermRegime};
use crate::schema::LiquidityFlag;

use super::types::{Direction, LegRole, StrategyCandidate, Tier};

pub struct SelectionContext {
    pub regime_state: RegimeState,
    pub rim: Option<f64>,
    pub liquidity_flag: LiquidityFlag,
    pub is_event_week: bool,
    pub is_preferred: bool,
    pub conservative_mode: bool,
    pub term_regime: TermRegime,
    pub skew_regime: SkewRegime,
}

pub fn is_applicable(candidate: &StrategyCandidate, ctx: &SelectionContext) -> bool {
    if candidate.direction == Direction::LongVol
        && candidate.tier == Tier::Aggressive
        && ctx.regime_state == RegimeState::PositiveGamma
    {
        return false;
    }
    if candidate.direction == Direction::ShortVol && ctx.regime_state == RegimeState::NegativeGamma
    {
        return false;
    }
    if let Some(rim) = ctx.rim {
        if rim < 0.40 && candidate.direction == Direction::LongVol && candidate.tier == Tier::Aggressive {
            return false;
        }
        if rim > 0.60 && candidate.direction == Direction::ShortVol {
            return false;
        }
    }
    if matches!(ctx.liquidity_flag, LiquidityFlag::Poor) && candidate.tier == Tier::Aggressive {
        return false;
    }
    if ctx.is_event_week && matches!(candidate.name, "iron_condor" | "short_strangle") {
        return false;
    }
    true
}

fn preferred_tier(ctx: &SelectionContext) -> Tier {
    if ctx.is_preferred {
        Tier::Aggressive
    } else if ctx.conservative_mode {
        Tier::Conservative
    } else {
        Tier::Balanced
    }
}

fn has_put_wing(candidate: &StrategyCandidate) -> bool {
    candidate
        .strike_anchors
        .iter()
        .any(|leg| leg.role == LegRole::Put && leg.anchor != "atm")
}

pub fn score(candidate: &StrategyCandidate, ctx: &SelectionContext) -> f64 {
    let mut total = 0.0;
    if candidate.tier == preferred_tier(ctx) {
        total += 2.0;
    }
    let regime_aligned = (candidate.direction == Direction::LongVol
        && ctx.regime_state == RegimeState::NegativeGamma)
        || (candidate.direction == Direction::ShortVol
            && ctx.regime_state == RegimeState::PositiveGamma);
    if regime_aligned {
        total += 1.0;
    }
    if ctx.term_regime == TermRegime::Backwardation && candidate.name == "calendar_spread" {
        total += 0.5;
    }
    // Suppressed during event weeks: the ATM straddle's symmetric convexity
    // is preferred over a skew-tilted wing when the move's direction is the
    // uncertain part.
    if ctx.skew_regime == SkewRegime::SteepPut && has_put_wing(candidate) && !ctx.is_event_week {
        total += 0.5;
    }
    total
}

/// Scores every applicable candidate for `direction` and returns the
/// highest scorer, ties broken by catalogue order.
pub fn select_best(
    candidates: &[StrategyCandidate],
    ctx: &SelectionContext,
) -> Option<StrategyCandidate> {
    let mut best: Option<(&StrategyCandidate, f64)> = None;
    for candidate in candidates.iter().filter(|c| is_applicable(c, ctx)) {
        let candidate_score = score(candidate, ctx);
        match best {
            Some((_, best_score)) if candidate_score > best_score => {
                best = Some((candidate, candidate_score));
            }
            None => best = Some((candidate, candidate_score)),
            _ => {}
        }
    }
    best.map(|(candidate, _)| candidate.clone())
}

#[derive(Debug, Clone)]
pub struct ReferenceLevels {
    pub gamma_wall_call: f64,
    pub gamma_wall_put: f64,
    pub vol_trigger: f64,
    pub spot: f64,
}

#[derive(Debug, Clone)]
pub struct CustomizedCandidate {
    pub candidate: StrategyCandidate,
    pub dte: i64,
    pub reference_levels: ReferenceLevels,
}

/// Tightens the DTE window to `(5, 20)` under an event week and fixes a
/// concrete `dte` at the (possibly tightened) range's midpoint, then
/// attaches reference price levels for downstream strike calculation.
pub fn customize_parameters(
    mut candidate: StrategyCandidate,
    ctx: &SelectionContext,
    spot: f64,
    gamma_wall_call: f64,
    gamma_wall_put: f64,
    vol_trigger: f64,
) -> CustomizedCandidate {
    if ctx.is_event_week {
        candidate.dte_range = (5, 20);
    }
    let (min, max) = candidate.dte_range;
    let dte = (min + max) / 2;

    CustomizedCandidate {
        candidate,
        dte,
        reference_levels: ReferenceLevels {
            gamma_wall_call,
            gamma_wall_put,
            vol_trigger,
            spot,
        },
    }
}
