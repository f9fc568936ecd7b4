//! Wires the feature/signal/probability/decision/strategy/strike/ev/gate
//! modules into the three CLI-facing operations (§6.1, §9).

mod ctx;
mod external;
mod pipeline;

pub use ctx::{
    full_pipeline, Ctx, DecisionStage, EvStage, FeatureStage, GateStage, ProbabilityStage,
    SignalStage, Stage, StrategyStage, StrikeStage,
};
pub use external::{parse as parse_external_context, ExternalContext};
pub use pipeline::{cmd_init, render_commands, run_task, run_update, session_in_rth};
