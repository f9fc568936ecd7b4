use serde::{Deserialize, Serialize};

use crate::schema::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkewRegime {
    SteepPut,
    CallRich,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructurePreference {
    Symmetric,
    PutWing,
    CallWing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkewFeatures {
    pub asymmetry: f64,
    pub regime: SkewRegime,
    pub structure_preference: StructurePreference,
}

impl SkewFeatures {
    pub fn calculate(snapshot: &InputSnapshot) -> Self {
        let asymmetry = snapshot.skew_asymmetry;

        let regime = if asymmetry > 0.03 {
            SkewRegime::SteepPut
        } else if asymmetry < -0.02 {
            SkewRegime::CallRich
        } else {
            SkewRegime::Balanced
        };

        let structure_preference = if asymmetry.abs() < 0.02 {
            StructurePreference::Symmetric
        } else if asymmetry > 0.0 {
            StructurePreference::PutWing
        } else {
            StructurePreference::CallWing
        };

        Self {
            asymmetry,
            regime,
            structure_preference,
        }
    }
}
