// Verdict combination. A confirmed external detection always wins; local
// heuristics can escalate a verdict but never downgrade one reported by the
// intelligence source.

use crate::config::EngineConfig;
use crate::intel::{IntelStatus, IntelligenceResult};
use crate::rules::RuleFinding;
use crate::score::RiskScore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final three-way classification shown to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Suspicious,
    Dangerous,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Suspicious => "suspicious",
            Verdict::Dangerous => "dangerous",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision table, first match wins:
///
/// 1. intelligence dangerous            -> dangerous
/// 2. intelligence suspicious           -> suspicious
/// 3. safe/unavailable, score < low     -> safe
/// 4. safe/unavailable, low..=high      -> suspicious
/// 5. safe/unavailable, score > high    -> dangerous
pub fn combine(status: IntelStatus, score: RiskScore, config: &EngineConfig) -> Verdict {
    match status {
        IntelStatus::Dangerous => Verdict::Dangerous,
        IntelStatus::Suspicious => Verdict::Suspicious,
        IntelStatus::Safe | IntelStatus::Unavailable => {
            if score.normalized < config.suspicious_band {
                Verdict::Safe
            } else if score.normalized <= config.dangerous_band {
                Verdict::Suspicious
            } else {
                Verdict::Dangerous
            }
        }
    }
}

/// Assemble the explanation list: intelligence reasons first, then every
/// flagged rule reason in rule-table order.
pub fn build_reasons(intel: &IntelligenceResult, findings: &[RuleFinding]) -> Vec<String> {
    let mut reasons = Vec::new();

    match intel.status {
        IntelStatus::Unavailable => reasons.push(
            "Threat intelligence unavailable - using rule-based analysis only".to_string(),
        ),
        IntelStatus::Safe => {
            reasons.push("Threat intelligence reports no known threats".to_string())
        }
        IntelStatus::Suspicious | IntelStatus::Dangerous => {
            if intel.threat_types.is_empty() {
                reasons.push("Threat intelligence flagged this URL".to_string());
            } else {
                reasons.push(format!(
                    "Threat intelligence detected threats: {}",
                    intel.threat_types.join(", ")
                ));
            }
        }
    }

    for finding in findings {
        if finding.flagged {
            reasons.push(finding.reason.clone());
        }
    }

    reasons
}
