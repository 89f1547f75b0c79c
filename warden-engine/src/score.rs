use crate::config::EngineConfig;
use crate::rules::RuleFinding;
use serde::{Deserialize, Serialize};

/// Raw heuristic point sum plus its 0-100 normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub raw: u32,
    pub normalized: u32,
}

impl RiskScore {
    /// Sum all rule points and rescale against the configured maximum,
    /// rounding and clamping to 100.
    pub fn aggregate(findings: &[RuleFinding], config: &EngineConfig) -> Self {
        let raw: u32 = findings.iter().map(|f| f.points).sum();
        let max_raw = config.max_raw();
        let normalized = if max_raw == 0 {
            0
        } else {
            let scaled = (f64::from(raw) / f64::from(max_raw) * 100.0).round() as u32;
            scaled.min(100)
        };
        Self { raw, normalized }
    }
}
