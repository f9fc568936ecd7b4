//! Static strategy catalogue (§4.6.1). Each entry is built with the same
//! small-constructor idiom throughout: [`super::helpers::template`] composed
//! with leg builders, aggregated by [`super::all_candidates`].

use super::helpers::{call_leg, put_leg, template};
use super::types::{Direction, StrategyCandidate, Tier};

/// Long-vol candidates in catalogue order `aggressive -> balanced`.
pub fn long_vol() -> Vec<StrategyCandidate> {
    vec![
        template(
            "long_straddle",
            Tier::Aggressive,
            Direction::LongVol,
            (5, 20),
            vec![("call", 0.50), ("put", 0.50)],
            vec![call_leg("call", "atm"), put_leg("put", "atm")],
            (2.0, 3.0),
            vec!["vrp_zscore_confirms_entry", "negative_gamma_confirms"],
            vec!["target_rr_reached", "vrp_normalizes"],
            vec!["negative_gamma", "event_week"],
            vec!["positive_gamma"],
        ),
        template(
            "long_strangle",
            Tier::Aggressive,
            Direction::LongVol,
            (30, 45),
            vec![("call", 0.32), ("put", 0.32)],
            vec![call_leg("call", "32d"), put_leg("put", "32d")],
            (2.0, 3.0),
            vec!["vrp_zscore_confirms_entry"],
            vec!["target_rr_reached", "dte_below_14"],
            vec!["negative_gamma"],
            vec!["positive_gamma", "liquidity_poor"],
        ),
        template(
            "bull_call_spread",
            Tier::Aggressive,
            Direction::LongVol,
            (14, 45),
            vec![("long_call", 0.50), ("short_call", 0.20)],
            vec![call_leg("long_call", "atm"), call_leg("short_call", "20d")],
            (2.0, 3.0),
            vec!["directional_long_vol_confirms_entry"],
            vec!["target_rr_reached"],
            vec!["negative_gamma"],
            vec!["positive_gamma", "liquidity_poor"],
        ),
        template(
            "calendar_spread",
            Tier::Balanced,
            Direction::LongVol,
            (30, 45),
            vec![("near", 0.50), ("far", 0.50)],
            vec![call_leg("near", "atm"), call_leg("far", "atm")],
            (1.2, 1.8),
            vec!["term_backwardation_confirms_entry"],
            vec!["term_flattens", "target_rr_reached"],
            vec!["term_backwardation"],
            vec!["event_week"],
        ),
        template(
            "debit_vertical_call",
            Tier::Balanced,
            Direction::LongVol,
            (14, 45),
            vec![("long_call", 0.50), ("short_call", 0.15)],
            vec![call_leg("long_call", "atm"), call_leg("short_call", "15d")],
            (1.2, 1.8),
            vec!["vrp_zscore_confirms_entry"],
            vec!["target_rr_reached"],
            vec!["negative_gamma"],
            vec!["positive_gamma"],
        ),
        template(
            "debit_vertical_put",
            Tier::Balanced,
            Direction::LongVol,
            (14, 45),
            vec![("long_put", 0.50), ("short_put", 0.15)],
            vec![put_leg("long_put", "atm"), put_leg("short_put", "15d")],
            (1.2, 1.8),
            vec!["vrp_zscore_confirms_entry"],
            vec!["target_rr_reached"],
            vec!["negative_gamma"],
            vec!["positive_gamma"],
        ),
        template(
            "bear_put_spread",
            Tier::Balanced,
            Direction::LongVol,
            (14, 45),
            vec![("long_put", 0.50), ("short_put", 0.15)],
            vec![put_leg("long_put", "atm"), put_leg("short_put", "15d")],
            (1.2, 1.8),
            vec!["directional_long_vol_confirms_entry"],
            vec!["target_rr_reached"],
            vec!["negative_gamma"],
            vec!["positive_gamma"],
        ),
    ]
}

/// Short-vol candidates in catalogue order `conservative -> balanced`; the
/// short-vol direction walks this list already reversed relative to
/// long-vol's aggressive-first order.
pub fn short_vol() -> Vec<StrategyCandidate> {
    vec![
        template(
            "iron_condor",
            Tier::Conservative,
            Direction::ShortVol,
            (14, 45),
            vec![
                ("short_call", 0.15),
                ("long_call", 0.04),
                ("short_put", 0.15),
                ("long_put", 0.04),
            ],
            vec![
                call_leg("short_call", "15d"),
                call_leg("long_call", "4d"),
                put_leg("short_put", "15d"),
                put_leg("long_put", "4d"),
            ],
            (0.8, 1.2),
            vec!["positive_gamma_confirms_entry", "iv_rich_confirms_entry"],
            vec!["target_rr_reached", "tested_short_strike"],
            vec!["positive_gamma"],
            vec!["negative_gamma", "event_week"],
        ),
        template(
            "short_strangle",
            Tier::Conservative,
            Direction::ShortVol,
            (14, 45),
            vec![("call", 0.20), ("put", 0.20)],
            vec![call_leg("call", "20d"), put_leg("put", "20d")],
            (0.8, 1.2),
            vec!["positive_gamma_confirms_entry"],
            vec!["target_rr_reached", "tested_short_strike"],
            vec!["positive_gamma"],
            vec!["negative_gamma", "event_week", "liquidity_poor"],
        ),
        template(
            "credit_spread",
            Tier::Balanced,
            Direction::ShortVol,
            (14, 45),
            vec![("short_call", 0.15), ("long_call", 0.05)],
            vec![call_leg("short_call", "15d"), call_leg("long_call", "5d")],
            (1.2, 1.8),
            vec!["positive_gamma_confirms_entry"],
            vec!["target_rr_reached"],
            vec!["positive_gamma"],
            vec!["negative_gamma"],
        ),
    ]
}

pub fn all_candidates() -> Vec<StrategyCandidate> {
    let mut all = Vec::new();
    all.extend(long_vol());
    all.extend(short_vol());
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_candidates_have_unique_names() {
        let candidates = all_candidates();
        let mut names: Vec<&str> = candidates.iter().map(|c| c.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn long_vol_list_is_aggressive_first() {
        let list = long_vol();
        assert_eq!(list[0].tier, Tier::Aggressive);
        assert!(list.iter().all(|c| c.direction == Direction::LongVol));
    }

    #[test]
    fn short_vol_list_is_conservative_first() {
        let list = short_vol();
        assert_eq!(list[0].tier, Tier::Conservative);
        assert!(list.iter().all(|c| c.direction == Direction::ShortVol));
    }

    #[test]
    fn every_candidate_has_at_least_one_leg() {
        for c in all_candidates() {
            assert!(!c.strike_anchors.is_empty(), "{} has no legs", c.name);
        }
    }
}
