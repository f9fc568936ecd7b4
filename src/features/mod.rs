//! Feature calculator (§4.2): pure functions from a validated
//! [`InputSnapshot`] to derived VRP, term, skew, regime, RV-momentum, and
//! liquidity features.

mod liquidity;
mod regime;
mod rv;
mod skew;
mod term;
mod vrp;

pub use liquidity::LiquidityFeatures;
pub use regime::{regime_change, RegimeChange, RegimeFeatures, RegimeState, Significance};
pub use skew::{SkewFeatures, SkewRegime, StructurePreference};
pub use term::{TermFeatures, TermRegime};
pub use vrp::{VrpFeatures, VrpRegime};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::schema::InputSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    pub vrp: VrpFeatures,
    pub term: TermFeatures,
    pub skew: SkewFeatures,
    pub regime: RegimeFeatures,
    pub rv_momentum: f64,
    pub liquidity: LiquidityFeatures,
    pub vex_net_5_60: f64,
    pub vanna_atm_abs: f64,
}

impl Features {
    pub fn calculate(snapshot: &InputSnapshot, config: &Config) -> Self {
        Self {
            vrp: VrpFeatures::calculate(snapshot),
            term: TermFeatures::calculate(snapshot),
            skew: SkewFeatures::calculate(snapshot),
            regime: RegimeFeatures::calculate(snapshot, config),
            rv_momentum: rv::rv_momentum(snapshot.hv10, snapshot.hv60),
            liquidity: LiquidityFeatures::calculate(snapshot),
            vex_net_5_60: snapshot.vex_net_5_60,
            vanna_atm_abs: snapshot.vanna_atm_abs,
        }
    }
}
