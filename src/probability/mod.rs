//! Probability calibrator (§4.4): maps `(L, S, context, signal_breakdown)`
//! to two calibrated [`ProbabilityEstimate`]s.

mod cold_start;
mod context;
mod isotonic;
mod platt;

use serde::{Deserialize, Serialize};

use crate::config::{CalibrationConfig, Config};
use crate::features::RegimeState;
use crate::oracle::Oracle;
use crate::schema::LiquidityFlag;
use crate::signals::SignalBreakdownEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    ColdStart,
    Platt,
    Isotonic,
    Llm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityEstimate {
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
    pub method: Method,
    pub confidence: f64,
}

pub struct ProbabilityContext {
    pub is_event_week: bool,
    pub regime_state: RegimeState,
    pub trigger_distance_pct: f64,
    pub liquidity_flag: LiquidityFlag,
    pub conservative_mode: bool,
}

fn base_estimate(score: f64, config: &Config, is_long: bool) -> ProbabilityEstimate {
    let (point, lower, upper, confidence, method) = match &config.calibration {
        CalibrationConfig::ColdStart => {
            let (p, l, u, c) = cold_start::cold_start(score);
            (p, l, u, c, Method::ColdStart)
        }
        CalibrationConfig::Platt {
            a_long,
            b_long,
            se_long,
            a_short,
            b_short,
            se_short,
        } => {
            let (a, b, se) = if is_long {
                (*a_long, *b_long, *se_long)
            } else {
                (*a_short, *b_short, *se_short)
            };
            let (p, l, u, c) = platt::platt(score, a, b, se);
            (p, l, u, c, Method::Platt)
        }
        CalibrationConfig::Isotonic {
            table_long,
            table_short,
        } => {
            let table = if is_long { table_long } else { table_short };
            let (p, l, u, c) = isotonic::isotonic(score, table);
            (p, l, u, c, Method::Isotonic)
        }
    };
    ProbabilityEstimate {
        point,
        lower,
        upper,
        method,
        confidence,
    }
}

#[derive(Deserialize)]
struct LlmProbabilityResponse {
    p_long: f64,
    p_short: f64,
    #[serde(default = "default_llm_confidence")]
    confidence: f64,
}

fn default_llm_confidence() -> f64 {
    0.6
}

fn llm_estimate(point: f64, confidence: f64) -> ProbabilityEstimate {
    let point = point.clamp(0.40, 0.75);
    ProbabilityEstimate {
        point,
        lower: (point - 0.05).max(0.01),
        upper: (point + 0.05).min(0.99),
        method: Method::Llm,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

async fn try_llm(
    oracle: &dyn Oracle,
    long_vol_score: f64,
    short_vol_score: f64,
    context: &ProbabilityContext,
    signal_breakdown: &[SignalBreakdownEntry],
) -> Option<(ProbabilityEstimate, ProbabilityEstimate)> {
    let prompt = build_prompt(long_vol_score, short_vol_score, context, signal_breakdown);
    let response = oracle
        .chat(
            &prompt,
            "You are a volatility-probability calibration assistant. \
             Respond with a JSON object: {\"p_long\": number, \"p_short\": number, \"confidence\": number}.",
            Some("json_object"),
        )
        .await
        .ok()?;
    let parsed: LlmProbabilityResponse = serde_json::from_str(&response.content).ok()?;
    Some((
        llm_estimate(parsed.p_long, parsed.confidence),
        llm_estimate(parsed.p_short, parsed.confidence),
    ))
}

fn build_prompt(
    long_vol_score: f64,
    short_vol_score: f64,
    context: &ProbabilityContext,
    signal_breakdown: &[SignalBreakdownEntry],
) -> String {
    let breakdown: Vec<String> = signal_breakdown
        .iter()
        .map(|e| format!("{}={:.3}", e.name, e.raw_score))
        .collect();
    format!(
        "L={long_vol_score:.4} S={short_vol_score:.4} event_week={} regime={:?} signals=[{}]",
        context.is_event_week,
        context.regime_state,
        breakdown.join(", ")
    )
}

/// Calibrates `(p_long, p_short)` from the composite scores and context.
///
/// Tries the oracle first when enabled; any oracle failure or malformed
/// response falls back silently to the configured non-LLM method.
pub async fn calibrate(
    long_vol_score: f64,
    short_vol_score: f64,
    context: &ProbabilityContext,
    signal_breakdown: &[SignalBreakdownEntry],
    oracle: Option<&dyn Oracle>,
    config: &Config,
) -> (ProbabilityEstimate, ProbabilityEstimate) {
    let (mut p_long, mut p_short) = if config.oracle.enabled {
        let llm_result = match oracle {
            Some(oracle) => {
                try_llm(oracle, long_vol_score, short_vol_score, context, signal_breakdown).await
            }
            None => None,
        };
        llm_result.unwrap_or_else(|| {
            (
                base_estimate(long_vol_score, config, true),
                base_estimate(short_vol_score, config, false),
            )
        })
    } else {
        (
            base_estimate(long_vol_score, config, true),
            base_estimate(short_vol_score, config, false),
        )
    };

    let adj_ctx = context::AdjustmentContext {
        is_event_week: context.is_event_week,
        regime_state: context.regime_state,
        trigger_distance_pct: context.trigger_distance_pct,
        liquidity_flag: context.liquidity_flag,
    };

    let (point, lower, upper, applied) =
        context::apply(p_long.point, p_long.lower, p_long.upper, true, &adj_ctx);
    p_long.point = point;
    p_long.lower = lower;
    p_long.upper = upper;
    if applied {
        p_long.confidence *= 0.95;
    }

    let (point, lower, upper, applied) =
        context::apply(p_short.point, p_short.lower, p_short.upper, false, &adj_ctx);
    p_short.point = point;
    p_short.lower = lower;
    p_short.upper = upper;
    if applied {
        p_short.confidence *= 0.95;
    }

    (p_long, p_short)
}
