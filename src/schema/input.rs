use garde::Validate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityFlag {
    Good,
    Fair,
    Poor,
}

/// The 22-field validated market snapshot for one `(symbol, date)`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct InputSnapshot {
    #[garde(length(min = 1, max = 10), pattern(r"^[A-Z]+$"))]
    pub symbol: String,

    #[garde(custom(validate_iso8601))]
    pub datetime: String,

    #[garde(custom(validate_positive))]
    pub spot: f64,

    #[garde(custom(validate_positive))]
    pub vol_trigger: f64,

    #[garde(custom(validate_gex_sign))]
    pub net_gex_sign: i32,

    #[garde(skip)]
    pub gamma_wall_call: f64,

    #[garde(skip)]
    pub gamma_wall_put: f64,

    #[garde(range(min = 0.0))]
    pub gamma_wall_proximity_pct: f64,

    #[garde(skip)]
    pub iv_event_atm: Option<f64>,

    #[garde(range(min = 0.0))]
    pub iv_m1_atm: f64,

    #[garde(skip)]
    pub iv_m2_atm: Option<f64>,

    #[garde(range(min = 0.0))]
    pub hv10: f64,

    #[garde(range(min = 0.0))]
    pub hv20: f64,

    #[garde(range(min = 0.0))]
    pub hv60: f64,

    #[garde(skip)]
    pub term_slope: f64,

    #[garde(skip)]
    pub term_curvature: f64,

    #[garde(skip)]
    pub skew_asymmetry: f64,

    #[garde(skip)]
    pub vex_net_5_60: f64,

    #[garde(skip)]
    pub vanna_atm_abs: f64,

    #[garde(range(min = 0.0))]
    pub spread_atm: f64,

    #[garde(skip)]
    pub iv_ask_premium_pct: f64,

    #[garde(skip)]
    pub liquidity_flag: LiquidityFlag,
}

fn validate_positive(value: &f64, _ctx: &()) -> garde::Result {
    if *value > 0.0 {
        Ok(())
    } else {
        Err(garde::Error::new(format!("{value} must be strictly positive")))
    }
}

fn validate_gex_sign(value: &i32, _ctx: &()) -> garde::Result {
    if matches!(value, -1 | 0 | 1) {
        Ok(())
    } else {
        Err(garde::Error::new(format!("{value} must be one of -1, 0, 1")))
    }
}

fn validate_iso8601(value: &str, _ctx: &()) -> garde::Result {
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map(|_| ())
        .map_err(|e| garde::Error::new(format!("invalid ISO8601 datetime: {e}")))
}

impl InputSnapshot {
    pub fn is_event_week(&self) -> bool {
        self.iv_event_atm.is_some()
    }
}
