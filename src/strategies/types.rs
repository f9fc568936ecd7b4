//! Strategy candidate types (§4.6.1).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Aggressive,
    Balanced,
    Conservative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LongVol,
    ShortVol,
}

/// Which side of the chain a leg sits on; drives delta-inversion sign and
/// the sign used by wall/ATR/implied-move anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegRole {
    Call,
    Put,
}

/// A single leg's strike-anchor rule: `"atm"`, `"{d}d"` (delta in percent,
/// e.g. `"32d"`), `"gamma_wall"`, `"atr_{k}x"`, or `"implied_move_{k}x"`.
#[derive(Debug, Clone, Copy)]
pub struct StrikeLeg {
    pub name: &'static str,
    pub role: LegRole,
    pub anchor: &'static str,
}

#[derive(Debug, Clone)]
pub struct StrategyCandidate {
    pub name: &'static str,
    pub tier: Tier,
    pub direction: Direction,
    pub dte_range: (i64, i64),
    pub delta_targets: Vec<(&'static str, f64)>,
    pub strike_anchors: Vec<StrikeLeg>,
    pub target_rr: (f64, f64),
    pub entry_triggers: Vec<&'static str>,
    pub exit_triggers: Vec<&'static str>,
    pub applicable_conditions: Vec<&'static str>,
    pub contraindications: Vec<&'static str>,
}
