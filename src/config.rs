//! Top-level configuration surface (§6.3).
//!
//! A `Config` is built from hard-coded defaults, optionally layered with a
//! TOML file. Every field has a sensible default so the engine runs with
//! zero configuration present, mirroring the cache layer's own
//! defaults-plus-override pattern.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decision: DecisionConfig,
    pub edge: EdgeConfig,
    pub regime: RegimeConfig,
    pub weights_long: WeightsLong,
    pub weights_short: WeightsShort,
    pub dte_ranges: DteRanges,
    pub delta_targets: DeltaTargets,
    pub session: SessionConfig,
    pub runtime: RuntimeConfig,
    pub oracle: OracleConfig,
    pub normalization: NormalizationConfig,
    pub calibration: CalibrationConfig,
    pub costs: CostConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decision: DecisionConfig::default(),
            edge: EdgeConfig::default(),
            regime: RegimeConfig::default(),
            weights_long: WeightsLong::default(),
            weights_short: WeightsShort::default(),
            dte_ranges: DteRanges::default(),
            delta_targets: DeltaTargets::default(),
            session: SessionConfig::default(),
            runtime: RuntimeConfig::default(),
            oracle: OracleConfig::default(),
            normalization: NormalizationConfig::default(),
            calibration: CalibrationConfig::default(),
            costs: CostConfig::default(),
        }
    }
}

impl Config {
    /// Loads defaults, then overlays a TOML file at `path` if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();
        if let Some(path) = path {
            if path.exists() {
                let raw = std::fs::read_to_string(path)?;
                config = toml::from_str(&raw)?;
            }
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub long_score_min: f64,
    pub long_prob_min: f64,
    pub long_opposing_max: f64,
    pub short_score_min: f64,
    pub short_prob_min: f64,
    pub short_opposing_max: f64,
    pub conservative_prob_min: f64,
    pub long_score_preferred: f64,
    pub long_prob_preferred: f64,
    pub short_score_preferred: f64,
    pub short_prob_preferred: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            long_score_min: 1.00,
            long_prob_min: 0.55,
            long_opposing_max: 0.30,
            short_score_min: 1.00,
            short_prob_min: 0.55,
            short_opposing_max: 0.30,
            conservative_prob_min: 0.70,
            long_score_preferred: 1.50,
            long_prob_preferred: 0.60,
            short_score_preferred: 1.50,
            short_prob_preferred: 0.60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub ev_min: f64,
    pub rr_min: f64,
    pub rr_target: f64,
    pub spread_max_pctl: f64,
    pub ivask_max_pctl: f64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            ev_min: 0.0,
            rr_min: 1.5,
            rr_target: 2.0,
            spread_max_pctl: 80.0,
            ivask_max_pctl: 80.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    pub vol_trigger_neutral_pct: f64,
    pub gamma_wall_pin_pct: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            vol_trigger_neutral_pct: 0.002,
            gamma_wall_pin_pct: 0.005,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsLong {
    pub vrp: f64,
    pub gex: f64,
    pub vex: f64,
    pub carry: f64,
    pub skew: f64,
    pub vanna: f64,
    pub rv: f64,
    pub liq: f64,
    pub vov: f64,
    pub vix_ts: f64,
    pub rim: f64,
    pub compress: f64,
    pub eir: f64,
    pub single_stock_boost: f64,
}

impl Default for WeightsLong {
    fn default() -> Self {
        Self {
            vrp: 1.0,
            gex: 1.0,
            vex: 0.7,
            carry: 0.8,
            skew: 0.6,
            vanna: 0.5,
            rv: 0.8,
            liq: 0.5,
            vov: 0.4,
            vix_ts: 0.4,
            rim: 0.3,
            compress: 0.3,
            eir: 0.2,
            single_stock_boost: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsShort {
    pub vrp: f64,
    pub gex: f64,
    pub vex: f64,
    pub carry: f64,
    pub skew: f64,
    pub rv: f64,
    pub liq: f64,
    pub vov: f64,
    pub vix_ts: f64,
    pub rim: f64,
    pub compress: f64,
    pub eir: f64,
    pub corr_idx: f64,
    pub flow_putcrowd: f64,
}

impl Default for WeightsShort {
    fn default() -> Self {
        Self {
            vrp: 1.0,
            gex: 1.0,
            vex: 0.7,
            carry: 0.8,
            skew: 0.6,
            rv: 0.8,
            liq: 0.5,
            vov: 0.4,
            vix_ts: 0.4,
            rim: 0.3,
            compress: 0.3,
            eir: 0.2,
            corr_idx: 0.3,
            flow_putcrowd: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DteRanges {
    pub long_vol_event_min: i64,
    pub long_vol_event_max: i64,
    pub long_vol_non_event_min: i64,
    pub long_vol_non_event_max: i64,
    pub short_vol_min: i64,
    pub short_vol_max: i64,
}

impl Default for DteRanges {
    fn default() -> Self {
        Self {
            long_vol_event_min: 5,
            long_vol_event_max: 20,
            long_vol_non_event_min: 30,
            long_vol_non_event_max: 45,
            short_vol_min: 14,
            short_vol_max: 45,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaTargets {
    pub table: HashMap<String, f64>,
}

impl Default for DeltaTargets {
    fn default() -> Self {
        let mut table = HashMap::new();
        table.insert("straddle".to_string(), 0.50);
        table.insert("strangle_wing".to_string(), 0.32);
        table.insert("condor_short".to_string(), 0.15);
        table.insert("condor_wing".to_string(), 0.04);
        Self { table }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub rth_start: String,
    pub rth_end: String,
    pub exclude_0dte: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rth_start: "09:30".to_string(),
            rth_end: "16:00".to_string(),
            exclude_0dte: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub runtime_dir: String,
    pub inputs_dir: String,
    pub outputs_dir: String,
    pub logs_dir: String,
    /// `{symbol}`/`{date}`-templated data-collection command strings copied
    /// verbatim into each output file's `gexbot_commands`; never executed.
    pub gexbot_command_templates: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            runtime_dir: "runtime".to_string(),
            inputs_dir: "runtime/inputs".to_string(),
            outputs_dir: "runtime/outputs".to_string(),
            logs_dir: "runtime/logs".to_string(),
            gexbot_command_templates: vec![
                "gexbot pull gex --symbol {symbol} --date {date}".to_string(),
                "gexbot pull vol-trigger --symbol {symbol} --date {date}".to_string(),
                "gexbot pull skew --symbol {symbol} --date {date}".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key_env: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "VOLQUANT_ORACLE_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_ms: 8_000,
            max_retries: 2,
        }
    }
}

/// `(mu, sigma)` pairs for each `zscore`-normalized signal (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub vrp: (f64, f64),
    pub term_slope: (f64, f64),
    pub term_curvature: (f64, f64),
    pub skew_asymmetry: (f64, f64),
    pub vex_net: (f64, f64),
    pub vanna: (f64, f64),
    pub rv_momentum: (f64, f64),
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            vrp: (0.02, 0.05),
            term_slope: (0.01, 0.02),
            term_curvature: (0.0, 0.01),
            skew_asymmetry: (0.02, 0.03),
            vex_net: (0.0, 1.0),
            vanna: (0.0, 1.0),
            rv_momentum: (0.0, 0.3),
        }
    }
}

/// Selects which probability-calibration method runs when the oracle is
/// disabled or falls back (§4.4). Defaults to cold-start; Platt/isotonic
/// are only meaningful once a deployment supplies fit parameters, which
/// this crate never derives from a trade-history table (see Non-goals).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CalibrationConfig {
    ColdStart,
    Platt {
        a_long: f64,
        b_long: f64,
        se_long: f64,
        a_short: f64,
        b_short: f64,
        se_short: f64,
    },
    Isotonic {
        table_long: Vec<(f64, f64)>,
        table_short: Vec<(f64, f64)>,
    },
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig::ColdStart
    }
}

/// Per-contract friction assumptions used by the EV closed forms (§4.6.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub slippage_pct: f64,
    pub cost_per_contract: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            slippage_pct: 0.01,
            cost_per_contract: 0.65,
        }
    }
}
