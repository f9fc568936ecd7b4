//! Top-level entry points behind the three CLI subcommands (§6.1): `cmd`
//! initializes the session's input/output files, `updated` runs the light
//! update path, `task` runs the full analysis pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::Instrument;

use crate::config::Config;
use crate::error::Result;
use crate::features::{regime_change, RegimeState, VrpFeatures};
use crate::oracle::{HttpOracle, NullOracle, Oracle};
use crate::schema::{
    self, FullAnalysisRecord, InputSnapshot, OutputFile, UpdateKeyMetrics, UpdateRecord,
};

use super::ctx::{full_pipeline, Ctx};
use super::external::ExternalContext;

fn regime_state_str(state: RegimeState) -> &'static str {
    match state {
        RegimeState::PositiveGamma => "positive_gamma",
        RegimeState::NegativeGamma => "negative_gamma",
        RegimeState::Neutral => "neutral",
    }
}

fn parse_regime_state(raw: &str) -> Option<RegimeState> {
    match raw {
        "positive_gamma" => Some(RegimeState::PositiveGamma),
        "negative_gamma" => Some(RegimeState::NegativeGamma),
        "neutral" => Some(RegimeState::Neutral),
        _ => None,
    }
}

fn flip_risk_str(risk: crate::features::FlipRisk) -> &'static str {
    use crate::features::FlipRisk;
    match risk {
        FlipRisk::Low => "low",
        FlipRisk::Moderate => "moderate",
        FlipRisk::High => "high",
    }
}

/// Renders `templates` with `{symbol}`/`{date}` substitution; used for the
/// output file's recorded (never executed) `gexbot_commands`.
pub fn render_commands(templates: &[String], symbol: &str, date: &str) -> Vec<String> {
    templates
        .iter()
        .map(|t| t.replace("{symbol}", symbol).replace("{date}", date))
        .collect()
}

/// True when `datetime`'s time-of-day falls within `[rth_start, rth_end]`.
/// Derived from the snapshot's own timestamp, not wall-clock time, so a
/// fixed input always produces the same output (§5 ordering guarantees).
pub fn session_in_rth(datetime: &str, rth_start: &str, rth_end: &str) -> bool {
    let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M:%S") else {
        return false;
    };
    let time = parsed.time();
    let Ok(start) = chrono::NaiveTime::parse_from_str(rth_start, "%H:%M") else {
        return false;
    };
    let Ok(end) = chrono::NaiveTime::parse_from_str(rth_end, "%H:%M") else {
        return false;
    };
    time >= start && time <= end
}

/// `cmd -s SYMBOL -d DATE`: ensures the input file exists (template if
/// missing, validated if present) and (re)initializes the output skeleton.
pub fn cmd_init(
    symbol: &str,
    date: &str,
    config: &Config,
) -> Result<(PathBuf, PathBuf)> {
    let input_path = Path::new(&config.runtime.inputs_dir).join(format!("{symbol}_i_{date}.json"));
    let output_path = Path::new(&config.runtime.outputs_dir).join(format!("{symbol}_o_{date}.json"));

    if input_path.exists() {
        schema::load_input(&input_path)?;
    } else {
        let iso_dt = format!("{date}T00:00:00");
        let template = schema::empty_template(symbol, &iso_dt);
        schema::persist_json(&input_path, &template)?;
    }

    let commands = render_commands(&config.runtime.gexbot_command_templates, symbol, date);
    let output = OutputFile {
        symbol: symbol.to_string(),
        date: date.to_string(),
        last_update: String::new(),
        updates: Vec::new(),
        full_analysis: None,
        gexbot_commands: commands,
    };
    output.persist(&output_path)?;

    Ok((input_path, output_path))
}

/// `updated -i INPUT -c OUTPUT`: validates, runs the light feature path
/// plus the regime-change detector, appends an update record, persists.
/// Must never touch probability, strategy, or strike components.
pub fn run_update(input_path: &Path, output_path: &Path, config: &Config) -> Result<()> {
    let snapshot = schema::load_input(input_path)?;
    let regime = crate::features::RegimeFeatures::calculate(&snapshot, config);
    let vrp = VrpFeatures::calculate(&snapshot);

    let commands = render_commands(
        &config.runtime.gexbot_command_templates,
        &snapshot.symbol,
        &snapshot.datetime[..10],
    );
    let mut output =
        OutputFile::load_or_init(output_path, &snapshot.symbol, &snapshot.datetime[..10], commands)?;

    let previous_state = output
        .updates
        .last()
        .and_then(|u| parse_regime_state(&u.regime_state));

    let mut alerts = Vec::new();
    let regime_changed = match previous_state {
        Some(previous) => {
            let change = regime_change(previous, regime.state);
            if change.alert {
                alerts.push(format!(
                    "REGIME FLIP: {} -> {}",
                    regime_state_str(previous),
                    regime_state_str(regime.state)
                ));
            }
            change.changed
        }
        None => false,
    };

    let record = UpdateRecord {
        timestamp: snapshot.datetime.clone(),
        regime_state: regime_state_str(regime.state).to_string(),
        regime_changed,
        vol_trigger: snapshot.vol_trigger,
        spot: snapshot.spot,
        gamma_wall_proximity_pct: snapshot.gamma_wall_proximity_pct,
        key_metrics: UpdateKeyMetrics {
            vrp_30d: vrp.vrp_30d,
            trigger_distance_pct: regime.trigger_distance_pct,
            flip_risk: flip_risk_str(regime.flip_risk).to_string(),
            net_gex_sign: snapshot.net_gex_sign,
        },
        alerts,
    };
    output.append_update(record);
    output.persist(output_path)?;
    tracing::info!(symbol = %snapshot.symbol, regime_changed, "update recorded");
    Ok(())
}

fn build_oracle(config: &Config) -> Option<Arc<dyn Oracle>> {
    if !config.oracle.enabled {
        return Some(Arc::new(NullOracle));
    }
    match HttpOracle::from_config(&config.oracle) {
        Ok(oracle) => Some(Arc::new(oracle)),
        Err(e) => {
            tracing::warn!(error = %e, "oracle construction failed, falling back to NullOracle");
            Some(Arc::new(NullOracle))
        }
    }
}

fn analysis_record(snapshot: &InputSnapshot, ctx: &Ctx) -> FullAnalysisRecord {
    let decision = ctx.decision.as_ref();
    let trade_status = match (&ctx.gate, decision) {
        (Some(gate), _) if gate.passed => "TRADE",
        _ => "NO TRADE",
    };

    serde_json::json!({
        "symbol": snapshot.symbol,
        "datetime": snapshot.datetime,
        "decision": decision.map(|d| d.decision),
        "confidence": decision.map(|d| d.confidence),
        "is_preferred": decision.map(|d| d.is_preferred),
        "reasons": decision.map(|d| d.reasons.clone()).unwrap_or_default(),
        "p_long": ctx.p_long,
        "p_short": ctx.p_short,
        "candidate": ctx.candidate.as_ref().map(|c| c.candidate.name),
        "dte": ctx.candidate.as_ref().map(|c| c.dte),
        "strikes": ctx.strikes,
        "ev": ctx.ev.as_ref().map(|e| serde_json::json!({
            "net_ev": e.net_ev,
            "gross_ev": e.gross_ev,
            "rr_ratio": e.rr_ratio,
            "win_rate": e.win_rate,
            "max_profit": e.max_profit,
            "max_loss": e.max_loss,
        })),
        "gate": ctx.gate.as_ref().map(|g| serde_json::json!({
            "passed": g.passed,
            "blocking_codes": g.blocking_codes,
            "warning_codes": g.warning_codes,
            "messages": g.messages,
        })),
        "trade_status": trade_status,
    })
}

/// `task -i INPUT -c OUTPUT [--replay]`: runs the full pipeline and writes
/// `full_analysis`. `--replay` is accepted and reserved for backtest mode;
/// it changes nothing in the core today.
pub async fn run_task(
    input_path: &Path,
    output_path: &Path,
    config: &Config,
    external: ExternalContext,
) -> Result<()> {
    let snapshot = schema::load_input(input_path)?;
    let rth = session_in_rth(&snapshot.datetime, &config.session.rth_start, &config.session.rth_end);
    let oracle = build_oracle(config);

    let mut ctx = Ctx::new(snapshot.clone(), config.clone(), oracle, external, rth);

    for stage in full_pipeline() {
        let span = tracing::info_span!("stage", name = stage.name());
        stage.run(&mut ctx).instrument(span).await?;
    }

    if let Some(gate) = &ctx.gate {
        if !gate.passed {
            tracing::info!(codes = ?gate.blocking_codes, "execution gate blocked the candidate");
        }
    }

    let commands = render_commands(
        &config.runtime.gexbot_command_templates,
        &snapshot.symbol,
        &snapshot.datetime[..10],
    );
    let mut output =
        OutputFile::load_or_init(output_path, &snapshot.symbol, &snapshot.datetime[..10], commands)?;
    output.set_full_analysis(analysis_record(&snapshot, &ctx), &snapshot.datetime);
    output.persist(output_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_in_rth_boundaries() {
        assert!(session_in_rth("2025-01-15T09:30:00", "09:30", "16:00"));
        assert!(session_in_rth("2025-01-15T16:00:00", "09:30", "16:00"));
        assert!(!session_in_rth("2025-01-15T09:00:00", "09:30", "16:00"));
        assert!(!session_in_rth("2025-01-15T16:30:00", "09:30", "16:00"));
    }

    #[test]
    fn render_commands_substitutes_placeholders() {
        let templates = vec!["pull gex for {symbol} on {date}".to_string()];
        let rendered = render_commands(&templates, "AAPL", "2025-01-15");
        assert_eq!(rendered[0], "pull gex for AAPL on 2025-01-15");
    }

    #[test]
    fn cmd_init_creates_template_when_input_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.runtime.inputs_dir = dir.path().join("inputs").to_string_lossy().to_string();
        config.runtime.outputs_dir = dir.path().join("outputs").to_string_lossy().to_string();

        let (input_path, output_path) = cmd_init("AAPL", "2025-01-15", &config).unwrap();
        assert!(input_path.exists());
        assert!(output_path.exists());

        let output: OutputFile =
            serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
        assert!(output.updates.is_empty());
        assert!(!output.gexbot_commands.is_empty());
    }

    #[test]
    fn run_update_never_populates_full_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let input_path = dir.path().join("in.json");
        let output_path = dir.path().join("out.json");

        let mut snapshot = crate::schema::empty_template("AAPL", "2025-01-15T14:00:00");
        let obj = snapshot.as_object_mut().unwrap();
        obj.insert("spot".into(), serde_json::json!(100.0));
        obj.insert("vol_trigger".into(), serde_json::json!(102.0));
        obj.insert("net_gex_sign".into(), serde_json::json!(-1));
        obj.insert("gamma_wall_call".into(), serde_json::json!(105.0));
        obj.insert("gamma_wall_put".into(), serde_json::json!(95.0));
        obj.insert("gamma_wall_proximity_pct".into(), serde_json::json!(0.05));
        obj.insert("iv_m1_atm".into(), serde_json::json!(0.30));
        obj.insert("hv10".into(), serde_json::json!(0.18));
        obj.insert("hv20".into(), serde_json::json!(0.20));
        obj.insert("hv60".into(), serde_json::json!(0.22));
        obj.insert("term_slope".into(), serde_json::json!(-0.06));
        obj.insert("term_curvature".into(), serde_json::json!(0.002));
        obj.insert("skew_asymmetry".into(), serde_json::json!(0.04));
        obj.insert("vex_net_5_60".into(), serde_json::json!(-0.8));
        obj.insert("vanna_atm_abs".into(), serde_json::json!(0.1));
        obj.insert("spread_atm".into(), serde_json::json!(0.02));
        obj.insert("iv_ask_premium_pct".into(), serde_json::json!(0.5));
        obj.insert("liquidity_flag".into(), serde_json::json!("good"));
        std::fs::write(&input_path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

        run_update(&input_path, &output_path, &config).unwrap();
        let output: OutputFile =
            serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(output.updates.len(), 1);
        assert!(output.full_analysis.is_none());
    }
}
