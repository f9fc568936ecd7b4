//! Input/output schema and session state-file layout (§4.1).
//!
//! `InputSnapshot` is the validated 22-field snapshot; `OutputFile` is the
//! append-only per-`(symbol, date)` state container. Validation runs once at
//! this edge; everything downstream operates on already-valid values.

mod input;
mod output;

pub use input::{InputSnapshot, LiquidityFlag};
pub use output::{FullAnalysisRecord, OutputFile, UpdateKeyMetrics, UpdateRecord};

use std::path::Path;

use crate::error::{Error, Result};

/// Structural/enum/numeric-bound validation for a raw input JSON payload.
///
/// Returns `(true, [])` on success, `(false, errors)` otherwise. Never
/// coerces; a malformed enum or out-of-range number is always an error.
pub fn validate(raw: &serde_json::Value) -> (bool, Vec<String>) {
    match serde_json::from_value::<InputSnapshot>(raw.clone()) {
        Ok(snapshot) => match garde::Validate::validate(&snapshot) {
            Ok(()) => (true, Vec::new()),
            Err(report) => (
                false,
                report.iter().map(|(path, err)| format!("{path}: {err}")).collect(),
            ),
        },
        Err(e) => (false, vec![e.to_string()]),
    }
}

/// Produces a template input JSON with `null` value holders for every field.
pub fn empty_template(symbol: &str, iso_dt: &str) -> serde_json::Value {
    serde_json::json!({
        "symbol": symbol,
        "datetime": iso_dt,
        "spot": null,
        "vol_trigger": null,
        "net_gex_sign": null,
        "gamma_wall_call": null,
        "gamma_wall_put": null,
        "gamma_wall_proximity_pct": null,
        "iv_event_atm": null,
        "iv_m1_atm": null,
        "iv_m2_atm": null,
        "hv10": null,
        "hv20": null,
        "hv60": null,
        "term_slope": null,
        "term_curvature": null,
        "skew_asymmetry": null,
        "vex_net_5_60": null,
        "vanna_atm_abs": null,
        "spread_atm": null,
        "iv_ask_premium_pct": null,
        "liquidity_flag": null,
    })
}

/// Reads and parses an [`InputSnapshot`] from `path`, validating it.
pub fn load_input(path: &Path) -> Result<InputSnapshot> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let (ok, errors) = validate(&value);
    if !ok {
        return Err(Error::Validation(errors));
    }
    Ok(serde_json::from_value(value)?)
}

/// Writes `value` to `path` via temp-file + rename, guaranteeing atomic
/// replacement: a reader always observes either the pre-write or
/// post-write snapshot, never a partial file.
pub fn persist_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let pretty = serde_json::to_string_pretty(value)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    use std::io::Write as _;
    tmp.write_all(pretty.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
