use serde::{Deserialize, Serialize};

use crate::schema::{InputSnapshot, LiquidityFlag};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityFeatures {
    pub spread_z: f64,
    pub ivask_premium_z: f64,
    pub liquidity_penalty: f64,
    pub flag: LiquidityFlag,
}

impl LiquidityFeatures {
    pub fn calculate(snapshot: &InputSnapshot) -> Self {
        let spread_z = snapshot.spread_atm / 0.05;
        let ivask_premium_z = snapshot.iv_ask_premium_pct / 2.0;

        let base_penalty = spread_z.max(0.0) + 0.5 * ivask_premium_z.max(0.0);
        let multiplier = match snapshot.liquidity_flag {
            LiquidityFlag::Poor => 1.5,
            LiquidityFlag::Fair => 1.2,
            LiquidityFlag::Good => 1.0,
        };

        Self {
            spread_z,
            ivask_premium_z,
            liquidity_penalty: base_penalty * multiplier,
            flag: snapshot.liquidity_flag,
        }
    }
}
