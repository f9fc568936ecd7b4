use serde::{Deserialize, Serialize};

/// Append-only per-`(symbol, date)` output state container (§3.1, §6.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputFile {
    pub symbol: String,
    pub date: String,
    pub last_update: String,
    pub updates: Vec<UpdateRecord>,
    pub full_analysis: Option<FullAnalysisRecord>,
    pub gexbot_commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateKeyMetrics {
    pub vrp_30d: f64,
    pub trigger_distance_pct: f64,
    pub flip_risk: String,
    pub net_gex_sign: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub timestamp: String,
    pub regime_state: String,
    pub regime_changed: bool,
    pub vol_trigger: f64,
    pub spot: f64,
    pub gamma_wall_proximity_pct: f64,
    pub key_metrics: UpdateKeyMetrics,
    pub alerts: Vec<String>,
}

/// Opaque full-analysis payload; the orchestrator fills this with the
/// serialized decision/strategy/strike/EV/gate results of a `task` run.
pub type FullAnalysisRecord = serde_json::Value;

impl OutputFile {
    /// Returns the existing output file at `path`, or a fresh skeleton.
    pub fn load_or_init(
        path: &std::path::Path,
        symbol: &str,
        date: &str,
        gexbot_commands: Vec<String>,
    ) -> crate::error::Result<Self> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(Self {
                symbol: symbol.to_string(),
                date: date.to_string(),
                last_update: String::new(),
                updates: Vec::new(),
                full_analysis: None,
                gexbot_commands,
            })
        }
    }

    /// Appends `record` to `updates`, preserving insertion order, and bumps
    /// `last_update`.
    pub fn append_update(&mut self, record: UpdateRecord) {
        self.last_update = record.timestamp.clone();
        self.updates.push(record);
    }

    /// Overwrites `full_analysis`; `updates` is untouched.
    pub fn set_full_analysis(&mut self, analysis: FullAnalysisRecord, timestamp: &str) {
        self.full_analysis = Some(analysis);
        self.last_update = timestamp.to_string();
    }

    pub fn persist(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let value = serde_json::to_value(self)?;
        super::persist_json(path, &value)
    }
}
