use super::types::{Direction, LegRole, StrategyCandidate, StrikeLeg, Tier};

pub fn leg(name: &'static str, role: LegRole, anchor: &'static str) -> StrikeLeg {
    StrikeLeg { name, role, anchor }
}

pub fn call_leg(name: &'static str, anchor: &'static str) -> StrikeLeg {
    leg(name, LegRole::Call, anchor)
}

pub fn put_leg(name: &'static str, anchor: &'static str) -> StrikeLeg {
    leg(name, LegRole::Put, anchor)
}

#[allow(clippy::too_many_arguments)]
pub fn template(
    name: &'static str,
    tier: Tier,
    direction: Direction,
    dte_range: (i64, i64),
    delta_targets: Vec<(&'static str, f64)>,
    strike_anchors: Vec<StrikeLeg>,
    target_rr: (f64, f64),
    entry_triggers: Vec<&'static str>,
    exit_triggers: Vec<&'static str>,
    applicable_conditions: Vec<&'static str>,
    contraindications: Vec<&'static str>,
) -> StrategyCandidate {
    StrategyCandidate {
        name,
        tier,
        direction,
        dte_range,
        delta_targets,
        strike_anchors,
        target_rr,
        entry_triggers,
        exit_triggers,
        applicable_conditions,
        contraindications,
    }
}
