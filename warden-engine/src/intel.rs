// Threat intelligence lookup. The contract is deliberately narrow: one
// operation, and it never fails - any transport, auth or quota problem
// collapses to `IntelStatus::Unavailable` so the engine can always proceed
// to verdict combination on rule evidence alone.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// The external collaborator's classification of a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntelStatus {
    Safe,
    Suspicious,
    Dangerous,
    Unavailable,
}

impl IntelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntelStatus::Safe => "safe",
            IntelStatus::Suspicious => "suspicious",
            IntelStatus::Dangerous => "dangerous",
            IntelStatus::Unavailable => "unavailable",
        }
    }

    /// Unavailable is a degraded state, not a classification.
    pub fn is_available(&self) -> bool {
        !matches!(self, IntelStatus::Unavailable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelligenceResult {
    pub status: IntelStatus,
    /// Threat category labels, deduplicated, response order preserved.
    pub threat_types: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

impl IntelligenceResult {
    pub fn unavailable() -> Self {
        Self {
            status: IntelStatus::Unavailable,
            threat_types: Vec::new(),
            checked_at: Utc::now(),
        }
    }
}

/// The one operation the engine needs from an intelligence source.
pub trait ThreatIntel: Send + Sync {
    /// Classify a URL. Must return within the implementation's own timeout
    /// budget and must never fail; degraded lookups report
    /// [`IntelStatus::Unavailable`].
    fn lookup(&self, url: &str) -> impl Future<Output = IntelligenceResult> + Send;
}

/// Threat types a lookup asks about and their verdict weight.
const REQUESTED_THREAT_TYPES: &[&str] = &[
    "MALWARE",
    "SOCIAL_ENGINEERING",
    "UNWANTED_SOFTWARE",
    "POTENTIALLY_HARMFUL_APPLICATION",
];

const DANGEROUS_THREAT_TYPES: &[&str] = &["MALWARE", "SOCIAL_ENGINEERING", "UNWANTED_SOFTWARE"];

#[derive(Debug, Clone)]
pub struct SafeBrowsingConfig {
    pub endpoint: String,
    /// Without a key every lookup short-circuits to Unavailable.
    pub api_key: Option<String>,
    pub client_id: String,
    pub client_version: String,
    /// Total budget per lookup, owned by this client.
    pub timeout_secs: u64,
}

impl Default for SafeBrowsingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://safebrowsing.googleapis.com/v4/threatMatches:find".to_string(),
            api_key: None,
            client_id: "warden".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            timeout_secs: 10,
        }
    }
}

/// Client for the Safe Browsing v4 `threatMatches:find` endpoint.
pub struct SafeBrowsingClient {
    client: Client,
    config: SafeBrowsingConfig,
}

impl SafeBrowsingClient {
    pub fn new(config: SafeBrowsingConfig) -> Self {
        let client = Client::builder()
            .user_agent(format!("{}/{}", config.client_id, config.client_version))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs((config.timeout_secs / 2).max(1)))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(SafeBrowsingConfig {
            api_key: Some(api_key.into()),
            ..SafeBrowsingConfig::default()
        })
    }

    async fn query(&self, url: &str, api_key: &str) -> Result<LookupResponse, reqwest::Error> {
        let body = LookupRequest {
            client: ClientInfo {
                client_id: self.config.client_id.clone(),
                client_version: self.config.client_version.clone(),
            },
            threat_info: ThreatInfo {
                threat_types: REQUESTED_THREAT_TYPES.iter().map(|t| t.to_string()).collect(),
                platform_types: vec!["ANY_PLATFORM".to_string()],
                threat_entry_types: vec!["URL".to_string()],
                threat_entries: vec![ThreatEntry {
                    url: url.to_string(),
                }],
            },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        response.json::<LookupResponse>().await
    }
}

impl ThreatIntel for SafeBrowsingClient {
    async fn lookup(&self, url: &str) -> IntelligenceResult {
        let Some(api_key) = self.config.api_key.clone() else {
            debug!("no API key configured, skipping intelligence lookup");
            return IntelligenceResult::unavailable();
        };

        match self.query(url, &api_key).await {
            Ok(response) => {
                let result = classify_matches(response.matches);
                debug!(
                    "intelligence lookup for {} -> {}",
                    url,
                    result.status.as_str()
                );
                result
            }
            Err(e) => {
                warn!("intelligence lookup failed for {}: {}", url, e);
                IntelligenceResult::unavailable()
            }
        }
    }
}

/// Map raw matches to a status. No matches means safe; any confirmed
/// dangerous category wins; anything else flagged is suspicious.
fn classify_matches(matches: Vec<ThreatMatch>) -> IntelligenceResult {
    let mut threat_types: Vec<String> = Vec::new();
    for m in matches {
        if !m.threat_type.is_empty() && !threat_types.contains(&m.threat_type) {
            threat_types.push(m.threat_type);
        }
    }

    let status = if threat_types.is_empty() {
        IntelStatus::Safe
    } else if threat_types
        .iter()
        .any(|t| DANGEROUS_THREAT_TYPES.contains(&t.as_str()))
    {
        IntelStatus::Dangerous
    } else {
        IntelStatus::Suspicious
    };

    IntelligenceResult {
        status,
        threat_types,
        checked_at: Utc::now(),
    }
}

// Wire format for the v4 API.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest {
    client: ClientInfo,
    threat_info: ThreatInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientInfo {
    client_id: String,
    client_version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreatInfo {
    threat_types: Vec<String>,
    platform_types: Vec<String>,
    threat_entry_types: Vec<String>,
    threat_entries: Vec<ThreatEntry>,
}

#[derive(Debug, Serialize)]
struct ThreatEntry {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    matches: Vec<ThreatMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreatMatch {
    #[serde(default)]
    threat_type: String,
}
