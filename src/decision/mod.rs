//! Decision classifier (§4.5): turns the two composite scores and their
//! calibrated probabilities into a single `LONG_VOL` / `SHORT_VOL` /
//! `STAND_ASIDE` call.

use serde::{Deserialize, Serialize};

use crate::config::{Config, DecisionConfig};
use crate::probability::ProbabilityEstimate;
use crate::schema::LiquidityFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    LongVol,
    ShortVol,
    StandAside,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision: Decision,
    pub confidence: f64,
    pub is_preferred: bool,
    pub reasons: Vec<String>,
}

struct SideOutcome {
    passes: bool,
    is_preferred: bool,
    reasons: Vec<String>,
}

#[allow(clippy::too_many_arguments)]
fn evaluate_side(
    label: &str,
    score: f64,
    opposing_score: f64,
    prob: &ProbabilityEstimate,
    score_min: f64,
    opposing_max: f64,
    prob_min: f64,
    score_preferred: f64,
    prob_preferred: f64,
    liquidity_flag: LiquidityFlag,
    conservative_mode: bool,
    conservative_prob_min: f64,
) -> SideOutcome {
    let mut reasons = Vec::new();

    let score_ok = score >= score_min;
    if !score_ok {
        reasons.push(format!(
            "{label}: score {score:.3} below minimum {score_min:.3}"
        ));
    }
    let opposing_ok = opposing_score <= opposing_max;
    if !opposing_ok {
        reasons.push(format!(
            "{label}: opposing score {opposing_score:.3} exceeds maximum {opposing_max:.3}"
        ));
    }
    let prob_ok = prob.point >= prob_min;
    if !prob_ok {
        reasons.push(format!(
            "{label}: probability {:.3} below minimum {prob_min:.3}",
            prob.point
        ));
    }
    let liquidity_ok = !matches!(liquidity_flag, LiquidityFlag::Poor);
    if !liquidity_ok {
        reasons.push(format!("{label}: liquidity flag is poor"));
    }
    let conservative_ok = !conservative_mode || prob.point >= conservative_prob_min;
    if !conservative_ok {
        reasons.push(format!(
            "{label}: conservative mode requires probability >= {conservative_prob_min:.3}"
        ));
    }

    let passes = score_ok && opposing_ok && prob_ok && liquidity_ok && conservative_ok;
    let is_preferred = passes && score >= score_preferred && prob.point >= prob_preferred;

    SideOutcome {
        passes,
        is_preferred,
        reasons,
    }
}

fn confidence_for(
    prob: &ProbabilityEstimate,
    score: f64,
    score_min: f64,
    is_preferred: bool,
) -> f64 {
    let score_margin = score - score_min;
    let preferred_mult = if is_preferred { 1.1 } else { 1.0 };
    let margin_mult = if score_margin < 0.5 { 0.9 } else { 1.0 };
    (prob.confidence * prob.point * preferred_mult * margin_mult).min(1.0)
}

/// Classifies the trade direction from the composite scores, their
/// calibrated probabilities, and the side-invalidating context flags.
pub fn classify(
    long_vol_score: f64,
    short_vol_score: f64,
    p_long: &ProbabilityEstimate,
    p_short: &ProbabilityEstimate,
    liquidity_flag: LiquidityFlag,
    conservative_mode: bool,
    config: &Config,
) -> DecisionResult {
    let d: &DecisionConfig = &config.decision;

    let long = evaluate_side(
        "long_vol",
        long_vol_score,
        short_vol_score,
        p_long,
        d.long_score_min,
        d.long_opposing_max,
        d.long_prob_min,
        d.long_score_preferred,
        d.long_prob_preferred,
        liquidity_flag,
        conservative_mode,
        d.conservative_prob_min,
    );
    let short = evaluate_side(
        "short_vol",
        short_vol_score,
        long_vol_score,
        p_short,
        d.short_score_min,
        d.short_opposing_max,
        d.short_prob_min,
        d.short_score_preferred,
        d.short_prob_preferred,
        liquidity_flag,
        conservative_mode,
        d.conservative_prob_min,
    );

    match (long.passes, short.passes) {
        (true, false) => DecisionResult {
            decision: Decision::LongVol,
            confidence: confidence_for(p_long, long_vol_score, d.long_score_min, long.is_preferred),
            is_preferred: long.is_preferred,
            reasons: Vec::new(),
        },
        (false, true) => DecisionResult {
            decision: Decision::ShortVol,
            confidence: confidence_for(
                p_short,
                short_vol_score,
                d.short_score_min,
                short.is_preferred,
            ),
            is_preferred: short.is_preferred,
            reasons: Vec::new(),
        },
        (true, true) => {
            if long_vol_score >= short_vol_score {
                let confidence =
                    confidence_for(p_long, long_vol_score, d.long_score_min, long.is_preferred)
                        * 0.8;
                DecisionResult {
                    decision: Decision::LongVol,
                    confidence,
                    is_preferred: long.is_preferred,
                    reasons: Vec::new(),
                }
            } else {
                let confidence = confidence_for(
                    p_short,
                    short_vol_score,
                    d.short_score_min,
                    short.is_preferred,
                ) * 0.8;
                DecisionResult {
                    decision: Decision::ShortVol,
                    confidence,
                    is_preferred: short.is_preferred,
                    reasons: Vec::new(),
                }
            }
        }
        (false, false) => {
            let mut reasons = long.reasons;
            reasons.extend(short.reasons);
            DecisionResult {
                decision: Decision::StandAside,
                confidence: 0.0,
                is_preferred: false,
                reasons,
            }
        }
    }
}
