use serde::{Deserialize, Serialize};

use crate::schema::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermRegime {
    Contango,
    Backwardation,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvatureRegime {
    Convex,
    Concave,
    Linear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermFeatures {
    pub slope: f64,
    pub curvature: f64,
    pub regime: TermRegime,
    pub curvature_regime: CurvatureRegime,
    pub calendar_opportunity: bool,
    pub event_spike: bool,
}

impl TermFeatures {
    pub fn calculate(snapshot: &InputSnapshot) -> Self {
        let slope = snapshot.term_slope;
        let curvature = snapshot.term_curvature;

        let regime = if slope > 0.02 {
            TermRegime::Contango
        } else if slope < -0.02 {
            TermRegime::Backwardation
        } else {
            TermRegime::Flat
        };

        let curvature_regime = if curvature > 0.01 {
            CurvatureRegime::Convex
        } else if curvature < -0.01 {
            CurvatureRegime::Concave
        } else {
            CurvatureRegime::Linear
        };

        let calendar_opportunity = slope > 0.03 && curvature > 0.005;
        let event_spike = slope < -0.05;

        Self {
            slope,
            curvature,
            regime,
            curvature_regime,
            calendar_opportunity,
            event_spike,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LiquidityFlag;

    fn snap_with_slope(slope: f64, curvature: f64) -> InputSnapshot {
        InputSnapshot {
            symbol: "AAPL".into(),
            datetime: "2025-01-15T14:00:00".into(),
            spot: 100.0,
            vol_trigger: 102.0,
            net_gex_sign: -1,
            gamma_wall_call: 105.0,
            gamma_wall_put: 95.0,
            gamma_wall_proximity_pct: 0.05,
            iv_event_atm: None,
            iv_m1_atm: 0.30,
            iv_m2_atm: None,
            hv10: 0.18,
            hv20: 0.20,
            hv60: 0.22,
            term_slope: slope,
            term_curvature: curvature,
            skew_asymmetry: 0.04,
            vex_net_5_60: -0.8,
            vanna_atm_abs: 0.1,
            spread_atm: 0.02,
            iv_ask_premium_pct: 0.5,
            liquidity_flag: LiquidityFlag::Good,
        }
    }

    #[test]
    fn backwardation_and_event_spike_below_minus_5pct() {
        let f = TermFeatures::calculate(&snap_with_slope(-0.06, 0.002));
        assert_eq!(f.regime, TermRegime::Backwardation);
        assert!(f.event_spike);
        assert!(!f.calendar_opportunity);
    }

    #[test]
    fn contango_with_convex_curvature_is_calendar_opportunity() {
        let f = TermFeatures::calculate(&snap_with_slope(0.04, 0.006));
        assert_eq!(f.regime, TermRegime::Contango);
        assert_eq!(f.curvature_regime, CurvatureRegime::Convex);
        assert!(f.calendar_opportunity);
    }

    #[test]
    fn flat_regime_within_band() {
        let f = TermFeatures::calculate(&snap_with_slope(0.01, 0.0));
        assert_eq!(f.regime, TermRegime::Flat);
        assert_eq!(f.curvature_regime, CurvatureRegime::Linear);
    }
}
