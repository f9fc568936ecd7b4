use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::schema::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeState {
    PositiveGamma,
    NegativeGamma,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipRisk {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearestWall {
    Call,
    Put,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeFeatures {
    pub state: RegimeState,
    pub trigger_distance_pct: f64,
    pub sign_consistent: bool,
    pub is_pin_risk: bool,
    pub nearest_wall: NearestWall,
    pub call_wall_distance_pct: f64,
    pub put_wall_distance_pct: f64,
    pub flip_risk: FlipRisk,
}

impl RegimeFeatures {
    pub fn calculate(snapshot: &InputSnapshot, config: &Config) -> Self {
        let neutral_pct = config.regime.vol_trigger_neutral_pct;
        let pin_pct = config.regime.gamma_wall_pin_pct;

        let d = (snapshot.spot - snapshot.vol_trigger) / snapshot.vol_trigger;
        let abs_d = d.abs();

        let state = if abs_d <= neutral_pct {
            RegimeState::Neutral
        } else if snapshot.spot >= snapshot.vol_trigger {
            RegimeState::PositiveGamma
        } else {
            RegimeState::NegativeGamma
        };

        let expected_sign: i32 = match state {
            RegimeState::Neutral => 0,
            _ => {
                if d > 0.0 {
                    1
                } else {
                    -1
                }
            }
        };
        let sign_consistent = snapshot.net_gex_sign == expected_sign;

        let is_pin_risk =
            matches!(state, RegimeState::PositiveGamma) && snapshot.gamma_wall_proximity_pct <= pin_pct;

        let call_wall_distance_pct =
            (snapshot.spot - snapshot.gamma_wall_call).abs() / snapshot.spot;
        let put_wall_distance_pct =
            (snapshot.spot - snapshot.gamma_wall_put).abs() / snapshot.spot;
        let nearest_wall = if call_wall_distance_pct <= put_wall_distance_pct {
            NearestWall::Call
        } else {
            NearestWall::Put
        };

        let flip_risk = if abs_d <= 0.005 {
            FlipRisk::High
        } else if abs_d <= 0.01 {
            FlipRisk::Moderate
        } else {
            FlipRisk::Low
        };

        Self {
            state,
            trigger_distance_pct: d,
            sign_consistent,
            is_pin_risk,
            nearest_wall,
            call_wall_distance_pct,
            put_wall_distance_pct,
            flip_risk,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Major,
    Minor,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeChange {
    pub changed: bool,
    pub significance: Significance,
    pub alert: bool,
}

/// Update-path regime-change detector (§4.2 last bullet).
pub fn regime_change(previous: RegimeState, current: RegimeState) -> RegimeChange {
    let changed = previous != current;
    let significance = if !changed {
        Significance::None
    } else if matches!(
        (previous, current),
        (RegimeState::PositiveGamma, RegimeState::NegativeGamma)
            | (RegimeState::NegativeGamma, RegimeState::PositiveGamma)
    ) {
        Significance::Major
    } else if matches!(previous, RegimeState::Neutral) || matches!(current, RegimeState::Neutral) {
        Significance::Minor
    } else {
        Significance::None
    };
    let alert = matches!(significance, Significance::Major);

    RegimeChange {
        changed,
        significance,
        alert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LiquidityFlag;

    fn snap(spot: f64, vol_trigger: f64, net_gex_sign: i32) -> InputSnapshot {
        InputSnapshot {
            symbol: "AAPL".into(),
            datetime: "2025-01-15T14:00:00".into(),
            spot,
            vol_trigger,
            net_gex_sign,
            gamma_wall_call: 105.0,
            gamma_wall_put: 95.0,
            gamma_wall_proximity_pct: 0.05,
            iv_event_atm: None,
            iv_m1_atm: 0.30,
            iv_m2_atm: None,
            hv10: 0.18,
            hv20: 0.20,
            hv60: 0.22,
            term_slope: -0.06,
            term_curvature: 0.002,
            skew_asymmetry: 0.04,
            vex_net_5_60: -0.8,
            vanna_atm_abs: 0.1,
            spread_atm: 0.02,
            iv_ask_premium_pct: 0.5,
            liquidity_flag: LiquidityFlag::Good,
        }
    }

    #[test]
    fn equal_spot_and_trigger_is_neutral_tolerates_zero_gex() {
        let f = RegimeFeatures::calculate(&snap(100.0, 100.0, 0), &Config::default());
        assert_eq!(f.state, RegimeState::Neutral);
        assert!(f.sign_consistent);
    }

    #[test]
    fn spot_below_trigger_is_negative_gamma() {
        let f = RegimeFeatures::calculate(&snap(100.0, 102.0, -1), &Config::default());
        assert_eq!(f.state, RegimeState::NegativeGamma);
        assert!(f.sign_consistent);
    }

    #[test]
    fn spot_above_trigger_is_positive_gamma() {
        let f = RegimeFeatures::calculate(&snap(100.0, 98.0, 1), &Config::default());
        assert_eq!(f.state, RegimeState::PositiveGamma);
    }

    #[test]
    fn mismatched_gex_sign_is_exposed_but_does_not_override_state() {
        let f = RegimeFeatures::calculate(&snap(100.0, 98.0, -1), &Config::default());
        assert_eq!(f.state, RegimeState::PositiveGamma);
        assert!(!f.sign_consistent);
    }

    #[test]
    fn flip_risk_bands() {
        assert_eq!(
            RegimeFeatures::calculate(&snap(100.4, 100.0, 1), &Config::default()).flip_risk,
            FlipRisk::High
        );
        assert_eq!(
            RegimeFeatures::calculate(&snap(100.8, 100.0, 1), &Config::default()).flip_risk,
            FlipRisk::Moderate
        );
        assert_eq!(
            RegimeFeatures::calculate(&snap(105.0, 100.0, 1), &Config::default()).flip_risk,
            FlipRisk::Low
        );
    }

    #[test]
    fn pin_risk_requires_positive_gamma_and_tight_proximity() {
        let mut snapshot = snap(100.0, 98.0, 1);
        snapshot.gamma_wall_proximity_pct = 0.003;
        let f = RegimeFeatures::calculate(&snapshot, &Config::default());
        assert!(f.is_pin_risk);
    }

    #[test]
    fn regime_change_major_on_gamma_flip() {
        let change = regime_change(RegimeState::NegativeGamma, RegimeState::PositiveGamma);
        assert!(change.changed);
        assert_eq!(change.significance, Significance::Major);
        assert!(change.alert);
    }

    #[test]
    fn regime_change_minor_through_neutral() {
        let change = regime_change(RegimeState::NegativeGamma, RegimeState::Neutral);
        assert!(change.changed);
        assert_eq!(change.significance, Significance::Minor);
        assert!(!change.alert);
    }

    #[test]
    fn regime_unchanged_is_none() {
        let change = regime_change(RegimeState::PositiveGamma, RegimeState::PositiveGamma);
        assert!(!change.changed);
        assert_eq!(change.significance, Significance::None);
    }
}
