//! The tagged-enum-of-stages design note (§9) realized as a single
//! `Stage` trait and one struct per pipeline step, dispatched through a
//! `Vec<Box<dyn Stage>>` rather than a string-keyed factory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::decision::{self, DecisionResult};
use crate::ev::{self, EvEstimate, EvInputs};
use crate::features::{Features, RegimeState};
use crate::gate::{self, GateInput, GateResult};
use crate::oracle::Oracle;
use crate::probability::{self, ProbabilityContext, ProbabilityEstimate};
use crate::schema::InputSnapshot;
use crate::signals::{self, CompositeScores, SignalBreakdownEntry, SignalScores};
use crate::strategies::{self, templates, CustomizedCandidate, Direction, SelectionContext};
use crate::strike::{self, StrikeContext};

use super::external::ExternalContext;

use crate::error::Result;

/// Mutable state threaded through the full-analysis pipeline. Each stage
/// reads what earlier stages populated and fills in its own slot; a stage
/// whose prerequisites are absent (e.g. a `STAND_ASIDE` decision) leaves
/// its slot `None` rather than failing.
pub struct Ctx {
    pub snapshot: InputSnapshot,
    pub config: Config,
    pub oracle: Option<Arc<dyn Oracle>>,
    pub external: ExternalContext,
    pub session_in_rth: bool,

    pub features: Option<Features>,
    pub signal_scores: Option<SignalScores>,
    pub composite: Option<CompositeScores>,
    pub signal_breakdown: Vec<SignalBreakdownEntry>,
    pub p_long: Option<ProbabilityEstimate>,
    pub p_short: Option<ProbabilityEstimate>,
    pub decision: Option<DecisionResult>,
    pub candidate: Option<CustomizedCandidate>,
    pub strikes: HashMap<&'static str, f64>,
    pub ev: Option<EvEstimate>,
    pub gate: Option<GateResult>,
}

impl Ctx {
    pub fn new(
        snapshot: InputSnapshot,
        config: Config,
        oracle: Option<Arc<dyn Oracle>>,
        external: ExternalContext,
        session_in_rth: bool,
    ) -> Self {
        Self {
            snapshot,
            config,
            oracle,
            external,
            session_in_rth,
            features: None,
            signal_scores: None,
            composite: None,
            signal_breakdown: Vec::new(),
            p_long: None,
            p_short: None,
            decision: None,
            candidate: None,
            strikes: HashMap::new(),
            ev: None,
            gate: None,
        }
    }
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct FeatureStage;

#[async_trait]
impl Stage for FeatureStage {
    fn name(&self) -> &'static str {
        "features"
    }

    async fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.features = Some(Features::calculate(&ctx.snapshot, &ctx.config));
        Ok(())
    }
}

pub struct SignalStage;

#[async_trait]
impl Stage for SignalStage {
    fn name(&self) -> &'static str {
        "signals"
    }

    async fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let features = ctx.features.as_ref().expect("features stage runs first");
        let (scores, composite, breakdown) = signals::score(&ctx.snapshot, features, &ctx.config);
        ctx.signal_scores = Some(scores);
        ctx.composite = Some(composite);
        ctx.signal_breakdown = breakdown;
        Ok(())
    }
}

pub struct ProbabilityStage;

#[async_trait]
impl Stage for ProbabilityStage {
    fn name(&self) -> &'static str {
        "probability"
    }

    async fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let features = ctx.features.as_ref().expect("features stage runs first");
        let composite = ctx.composite.expect("signal stage runs first");
        let prob_ctx = ProbabilityContext {
            is_event_week: ctx.snapshot.is_event_week(),
            regime_state: features.regime.state,
            trigger_distance_pct: features.regime.trigger_distance_pct,
            liquidity_flag: ctx.snapshot.liquidity_flag,
            conservative_mode: ctx.external.conservative_mode,
        };
        let oracle: Option<&dyn Oracle> = ctx.oracle.as_deref();
        let (p_long, p_short) = probability::calibrate(
            composite.long_vol_score,
            composite.short_vol_score,
            &prob_ctx,
            &ctx.signal_breakdown,
            oracle,
            &ctx.config,
        )
        .await;
        ctx.p_long = Some(p_long);
        ctx.p_short = Some(p_short);
        Ok(())
    }
}

pub struct DecisionStage;

#[async_trait]
impl Stage for DecisionStage {
    fn name(&self) -> &'static str {
        "decision"
    }

    async fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let composite = ctx.composite.expect("signal stage runs first");
        let p_long = ctx.p_long.clone().expect("probability stage runs first");
        let p_short = ctx.p_short.clone().expect("probability stage runs first");
        ctx.decision = Some(decision::classify(
            composite.long_vol_score,
            composite.short_vol_score,
            &p_long,
            &p_short,
            ctx.snapshot.liquidity_flag,
            ctx.external.conservative_mode,
            &ctx.config,
        ));
        Ok(())
    }
}

pub struct StrategyStage;

#[async_trait]
impl Stage for StrategyStage {
    fn name(&self) -> &'static str {
        "strategy"
    }

    async fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let decision = ctx.decision.as_ref().expect("decision stage runs first");
        let features = ctx.features.as_ref().expect("features stage runs first");
        let direction = match decision.decision {
            decision::Decision::LongVol => Direction::LongVol,
            decision::Decision::ShortVol => Direction::ShortVol,
            decision::Decision::StandAside => return Ok(()),
        };
        let candidates = match direction {
            Direction::LongVol => templates::long_vol(),
            Direction::ShortVol => templates::short_vol(),
        };
        let selection_ctx = SelectionContext {
            regime_state: features.regime.state,
            rim: ctx.external.rim,
            liquidity_flag: ctx.snapshot.liquidity_flag,
            is_event_week: ctx.snapshot.is_event_week(),
            is_preferred: decision.is_preferred,
            conservative_mode: ctx.external.conservative_mode,
            term_regime: features.term.regime,
            skew_regime: features.skew.regime,
        };
        let Some(best) = strategies::select_best(&candidates, &selection_ctx) else {
            return Ok(());
        };
        ctx.candidate = Some(strategies::customize_parameters(
            best,
            &selection_ctx,
            ctx.snapshot.spot,
            ctx.snapshot.gamma_wall_call,
            ctx.snapshot.gamma_wall_put,
            ctx.snapshot.vol_trigger,
        ));
        Ok(())
    }
}

pub struct StrikeStage;

#[async_trait]
impl Stage for StrikeStage {
    fn name(&self) -> &'static str {
        "strike"
    }

    async fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(candidate) = ctx.candidate.as_ref() else {
            return Ok(());
        };
        let iv_atm = event_adjusted_iv(ctx);
        let strike_ctx = StrikeContext {
            spot: candidate.reference_levels.spot,
            iv_atm,
            dte: candidate.dte,
            gamma_wall_call: candidate.reference_levels.gamma_wall_call,
            gamma_wall_put: candidate.reference_levels.gamma_wall_put,
            hv20: ctx.snapshot.hv20,
        };
        for leg in &candidate.candidate.strike_anchors {
            let strike = strike::strike_for_leg(leg, &strike_ctx);
            ctx.strikes.insert(leg.name, strike);
        }
        Ok(())
    }
}

pub struct EvStage;

#[async_trait]
impl Stage for EvStage {
    fn name(&self) -> &'static str {
        "ev"
    }

    async fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(candidate) = ctx.candidate.as_ref() else {
            return Ok(());
        };
        let decision = ctx.decision.as_ref().expect("decision stage runs first");
        let win_rate = match decision.decision {
            decision::Decision::LongVol => ctx.p_long.as_ref().map(|p| p.point),
            decision::Decision::ShortVol => ctx.p_short.as_ref().map(|p| p.point),
            decision::Decision::StandAside => None,
        }
        .unwrap_or(0.0);
        let iv_atm = event_adjusted_iv(ctx);
        let inputs = EvInputs {
            spot: ctx.snapshot.spot,
            iv_atm,
            hv20: ctx.snapshot.hv20,
            dte: candidate.dte,
            spread_atm: ctx.snapshot.spread_atm,
            win_rate,
            target_rr_min: ctx.config.edge.rr_target,
            strikes: &ctx.strikes,
        };
        ctx.ev = Some(ev::estimate(
            candidate.candidate.name,
            &inputs,
            &ctx.config.costs,
        ));
        Ok(())
    }
}

pub struct GateStage;

#[async_trait]
impl Stage for GateStage {
    fn name(&self) -> &'static str {
        "gate"
    }

    async fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(candidate) = ctx.candidate.as_ref() else {
            return Ok(());
        };
        let features = ctx.features.as_ref().expect("features stage runs first");
        let ev_estimate = ctx.ev.as_ref().expect("ev stage runs before gate");
        let input = GateInput {
            net_ev: ev_estimate.net_ev,
            rr_ratio: ev_estimate.rr_ratio,
            spread_z: features.liquidity.spread_z,
            ivask_z: features.liquidity.ivask_premium_z,
            liquidity_flag: ctx.snapshot.liquidity_flag,
            tier: candidate.candidate.tier,
            direction: candidate.candidate.direction,
            win_rate: ev_estimate.win_rate,
            dte: candidate.dte,
            template_min_dte: candidate.candidate.dte_range.0,
            negative_gamma: features.regime.state == RegimeState::NegativeGamma,
            is_event_week: ctx.snapshot.is_event_week(),
            conservative_mode: ctx.external.conservative_mode,
            session_in_rth: ctx.session_in_rth,
            exclude_0dte: ctx.config.session.exclude_0dte,
        };
        ctx.gate = Some(gate::evaluate_with_config(&input, &ctx.config));
        Ok(())
    }
}

fn event_adjusted_iv(ctx: &Ctx) -> f64 {
    let is_event = ctx
        .features
        .as_ref()
        .map(|f| f.vrp.is_event_context)
        .unwrap_or_else(|| ctx.snapshot.is_event_week());
    if is_event {
        ctx.snapshot.iv_event_atm.unwrap_or(ctx.snapshot.iv_m1_atm)
    } else {
        ctx.snapshot.iv_m1_atm
    }
}

/// The ordered full-analysis pipeline; `task` runs every stage in sequence,
/// each logging a span per §7.
pub fn full_pipeline() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(FeatureStage),
        Box::new(SignalStage),
        Box::new(ProbabilityStage),
        Box::new(DecisionStage),
        Box::new(StrategyStage),
        Box::new(StrikeStage),
        Box::new(EvStage),
        Box::new(GateStage),
    ]
}
