use crate::config::EngineConfig;
use crate::error::Result;
use crate::intel::{IntelligenceResult, ThreatIntel};
use crate::rules::{self, RuleFinding};
use crate::score::RiskScore;
use crate::url_parts::{self, UrlComponents};
use crate::verdict::{self, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything known about one scanned URL. Immutable once constructed;
/// this is the unit handed to history, export and display collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub url: String,
    pub components: UrlComponents,
    pub risk: RiskScore,
    pub intelligence: IntelligenceResult,
    /// Only the findings that actually fired.
    pub findings: Vec<RuleFinding>,
    pub verdict: Verdict,
    /// Intelligence reasons first, then rule reasons in table order.
    pub reasons: Vec<String>,
    pub scanned_at: DateTime<Utc>,
}

impl ScanResult {
    pub fn api_available(&self) -> bool {
        self.intelligence.status.is_available()
    }
}

/// Drives the per-URL pipeline: normalize, evaluate rules, consult the
/// intelligence source, aggregate, combine.
pub struct Analyzer<C> {
    config: EngineConfig,
    intel: C,
}

impl<C: ThreatIntel> Analyzer<C> {
    pub fn new(intel: C) -> Self {
        Self {
            config: EngineConfig::default(),
            intel,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scan a single URL. Fails only on malformed input; intelligence
    /// degradation is folded into the result, never an error.
    pub async fn scan(&self, raw_url: &str) -> Result<ScanResult> {
        let components = url_parts::normalize(raw_url)?;
        debug!("analyzing {}", components.raw);

        // The rules and the lookup are independent of each other; the rules
        // are pure and cheap, the lookup owns the only wait.
        let findings = rules::evaluate(&components, &self.config);
        let intelligence = self.intel.lookup(&components.raw).await;

        let risk = RiskScore::aggregate(&findings, &self.config);
        let verdict = verdict::combine(intelligence.status, risk, &self.config);
        let reasons = verdict::build_reasons(&intelligence, &findings);
        let flagged: Vec<RuleFinding> = findings.into_iter().filter(|f| f.flagged).collect();

        Ok(ScanResult {
            url: components.raw.clone(),
            components,
            risk,
            intelligence,
            findings: flagged,
            verdict,
            reasons,
            scanned_at: Utc::now(),
        })
    }
}
