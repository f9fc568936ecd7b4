//! Strike calculator (§4.6.3): resolves each leg's anchor rule into a
//! concrete, increment-rounded strike price.

use crate::strategies::{LegRole, StrikeLeg};

#[derive(Debug, Clone, Copy)]
pub struct StrikeContext {
    pub spot: f64,
    pub iv_atm: f64,
    pub dte: i64,
    pub gamma_wall_call: f64,
    pub gamma_wall_put: f64,
    /// Historical 20-day vol, used as the ATR proxy for `atr_{k}x` anchors
    /// (this schema carries no raw ATR series).
    pub hv20: f64,
}

/// Rounds to the exchange-style increment for the price level: `<50 -> 0.5;
/// <200 -> 1.0; <500 -> 2.5; >=500 -> 5.0`.
pub fn round_to_increment(price: f64) -> f64 {
    let increment = if price < 50.0 {
        0.5
    } else if price < 200.0 {
        1.0
    } else if price < 500.0 {
        2.5
    } else {
        5.0
    };
    (price / increment).round() * increment
}

/// Abramowitz & Stegun rational approximation (formula 26.2.23) to the
/// standard normal quantile function, clamped to +/-4.
fn inv_norm_cdf(p: f64) -> f64 {
    let p = p.clamp(1e-10, 1.0 - 1e-10);
    let (p_low, sign) = if p < 0.5 { (p, -1.0) } else { (1.0 - p, 1.0) };
    let t = (-2.0 * p_low.ln()).sqrt();
    let c0 = 2.515_517;
    let c1 = 0.802_853;
    let c2 = 0.010_328;
    let d1 = 1.432_788;
    let d2 = 0.189_269;
    let d3 = 0.001_308;
    let numerator = c0 + c1 * t + c2 * t * t;
    let denominator = 1.0 + d1 * t + d2 * t * t + d3 * t * t * t;
    (sign * (t - numerator / denominator)).clamp(-4.0, 4.0)
}

fn parse_leading_number(anchor: &str) -> f64 {
    let digits: String = anchor
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().unwrap_or(0.0)
}

fn delta_to_strike(delta: f64, role: LegRole, spot: f64, sigma: f64, t: f64) -> f64 {
    let z = inv_norm_cdf(delta);
    let drift = 0.5 * sigma * sigma * t;
    let exponent = match role {
        LegRole::Call => -z * sigma * t.sqrt() + drift,
        LegRole::Put => z * sigma * t.sqrt() + drift,
    };
    spot * exponent.exp()
}

/// Resolves one leg's anchor rule to a concrete, increment-rounded strike.
pub fn strike_for_leg(leg: &StrikeLeg, ctx: &StrikeContext) -> f64 {
    let t = (ctx.dte as f64 / 365.0).max(0.01);
    let raw = match leg.anchor {
        "atm" => ctx.spot,
        "gamma_wall" => match leg.role {
            LegRole::Call => ctx.gamma_wall_call,
            LegRole::Put => ctx.gamma_wall_put,
        },
        anchor if anchor.starts_with("atr_") => {
            let m = parse_leading_number(&anchor["atr_".len()..]);
            let atr = ctx.hv20 * ctx.spot / 252.0_f64.sqrt();
            match leg.role {
                LegRole::Call => ctx.spot + m * atr,
                LegRole::Put => ctx.spot - m * atr,
            }
        }
        anchor if anchor.starts_with("implied_move_") => {
            let m = parse_leading_number(&anchor["implied_move_".len()..]);
            let implied_move_pct = ctx.iv_atm * t.sqrt();
            match leg.role {
                LegRole::Call => ctx.spot * (1.0 + m * implied_move_pct),
                LegRole::Put => ctx.spot * (1.0 - m * implied_move_pct),
            }
        }
        anchor => {
            let delta = parse_leading_number(anchor) / 100.0;
            delta_to_strike(delta, leg.role, ctx.spot, ctx.iv_atm, t)
        }
    };
    round_to_increment(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> StrikeContext {
        StrikeContext {
            spot: 100.0,
            iv_atm: 0.25,
            dte: 30,
            gamma_wall_call: 105.0,
            gamma_wall_put: 95.0,
            hv20: 0.20,
        }
    }

    #[test]
    fn atm_anchor_rounds_to_increment() {
        let leg = StrikeLeg {
            name: "call",
            role: LegRole::Call,
            anchor: "atm",
        };
        assert_eq!(strike_for_leg(&leg, &ctx()), 100.0);
    }

    #[test]
    fn gamma_wall_anchor_picks_call_or_put_wall() {
        let call = StrikeLeg {
            name: "call",
            role: LegRole::Call,
            anchor: "gamma_wall",
        };
        let put = StrikeLeg {
            name: "put",
            role: LegRole::Put,
            anchor: "gamma_wall",
        };
        assert_eq!(strike_for_leg(&call, &ctx()), 105.0);
        assert_eq!(strike_for_leg(&put, &ctx()), 95.0);
    }

    #[test]
    fn delta_anchor_call_strikes_above_spot() {
        let leg = StrikeLeg {
            name: "call",
            role: LegRole::Call,
            anchor: "32d",
        };
        let strike = strike_for_leg(&leg, &ctx());
        assert!(strike > 100.0, "expected OTM call strike above spot, got {strike}");
    }

    #[test]
    fn delta_anchor_put_strikes_below_spot() {
        let leg = StrikeLeg {
            name: "put",
            role: LegRole::Put,
            anchor: "32d",
        };
        let strike = strike_for_leg(&leg, &ctx());
        assert!(strike < 100.0, "expected OTM put strike below spot, got {strike}");
    }

    #[test]
    fn tighter_delta_sits_closer_to_spot() {
        let leg_4d = StrikeLeg {
            name: "call",
            role: LegRole::Call,
            anchor: "4d",
        };
        let leg_32d = StrikeLeg {
            name: "call",
            role: LegRole::Call,
            anchor: "32d",
        };
        let strike_4d = strike_for_leg(&leg_4d, &ctx());
        let strike_32d = strike_for_leg(&leg_32d, &ctx());
        assert!(strike_4d > strike_32d);
    }

    #[test]
    fn atr_anchor_is_symmetric_around_spot_by_role() {
        let call = StrikeLeg {
            name: "call",
            role: LegRole::Call,
            anchor: "atr_1.0x",
        };
        let put = StrikeLeg {
            name: "put",
            role: LegRole::Put,
            anchor: "atr_1.0x",
        };
        let call_strike = strike_for_leg(&call, &ctx());
        let put_strike = strike_for_leg(&put, &ctx());
        assert!(call_strike > 100.0);
        assert!(put_strike < 100.0);
    }

    #[test]
    fn implied_move_anchor_scales_with_k() {
        let small = StrikeLeg {
            name: "call",
            role: LegRole::Call,
            anchor: "implied_move_0.5x",
        };
        let large = StrikeLeg {
            name: "call",
            role: LegRole::Call,
            anchor: "implied_move_1.5x",
        };
        assert!(strike_for_leg(&large, &ctx()) > strike_for_leg(&small, &ctx()));
    }

    #[test]
    fn increments_scale_with_price_level() {
        assert_eq!(round_to_increment(24.3), 24.5);
        assert_eq!(round_to_increment(123.2), 123.0);
        assert_eq!(round_to_increment(410.0), 410.0);
        assert_eq!(round_to_increment(612.3), 610.0);
    }

    #[test]
    fn inv_norm_cdf_matches_known_anchor_at_half() {
        assert!(inv_norm_cdf(0.5).abs() < 1e-3);
    }

    #[test]
    fn inv_norm_cdf_clamped_to_plus_minus_4() {
        assert!((inv_norm_cdf(1e-12) + 4.0).abs() < 1e-9);
        assert!((inv_norm_cdf(1.0 - 1e-12) - 4.0).abs() < 1e-9);
    }
}
