use serde::{Deserialize, Serialize};

use crate::schema::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VrpRegime {
    HighPremium,
    Discount,
    Fair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VrpFeatures {
    pub vrp_30d: f64,
    pub vrp_60d: Option<f64>,
    pub vrp_event: Option<f64>,
    pub selected: f64,
    pub is_event_context: bool,
    pub normalized: f64,
    pub regime: VrpRegime,
}

impl VrpFeatures {
    pub fn calculate(snapshot: &InputSnapshot) -> Self {
        let vrp_30d = snapshot.iv_m1_atm - snapshot.hv20;
        let vrp_60d = snapshot.iv_m2_atm.map(|iv_m2| iv_m2 - snapshot.hv60);
        let vrp_event = snapshot.iv_event_atm.map(|iv_event| iv_event - snapshot.hv10);

        let is_event_context = snapshot.is_event_week();
        let selected = if is_event_context {
            vrp_event.unwrap_or(vrp_30d)
        } else {
            vrp_30d
        };

        let normalized = if snapshot.hv20 > 0.0 {
            vrp_30d / snapshot.hv20
        } else {
            0.0
        };

        let regime = if selected > 0.05 {
            VrpRegime::HighPremium
        } else if selected < -0.05 {
            VrpRegime::Discount
        } else {
            VrpRegime::Fair
        };

        Self {
            vrp_30d,
            vrp_60d,
            vrp_event,
            selected,
            is_event_context,
            normalized,
            regime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LiquidityFlag;

    fn base() -> InputSnapshot {
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
    fn vrp_30d_is_iv_minus_hv20() {
        let f = VrpFeatures::calculate(&base());
        assert!((f.vrp_30d - 0.10).abs() < 1e-12);
    }

    #[test]
    fn missing_iv_m2_leaves_vrp_60d_null() {
        let f = VrpFeatures::calculate(&base());
        assert!(f.vrp_60d.is_none());
        assert!(!f.is_event_context);
        assert!((f.selected - f.vrp_30d).abs() < 1e-12);
    }

    #[test]
    fn event_week_selects_vrp_event() {
        let mut snap = base();
        snap.iv_event_atm = Some(0.40);
        let f = VrpFeatures::calculate(&snap);
        assert!(f.is_event_context);
        // vrp_event = 0.40 - hv10(0.18) = 0.22
        assert!((f.selected - 0.22).abs() < 1e-12);
        assert_eq!(f.regime, VrpRegime::HighPremium);
    }

    #[test]
    fn doubling_iv_increases_vrp_and_flips_sign_in_signal() {
        let mut snap = base();
        let low = VrpFeatures::calculate(&snap);
        snap.iv_m1_atm *= 2.0;
        let high = VrpFeatures::calculate(&snap);
        assert!(high.vrp_30d > low.vrp_30d);
    }
}
