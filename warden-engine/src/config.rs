/// Default keyword list matched against the path and query of a URL.
const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "secure",
    "verify",
    "update",
    "account",
    "login",
    "signin",
    "bank",
    "paypal",
    "confirm",
    "password",
    "billing",
    "credit",
    "card",
    "security",
    "suspended",
    "authenticate",
    "wallet",
    "tax",
    "refund",
];

/// Default list of TLDs commonly seen in throwaway phishing domains.
const SUSPICIOUS_TLDS: &[&str] = &[
    ".tk", ".ml", ".ga", ".cf", ".gq", ".xyz", ".top", ".work", ".click", ".link", ".country",
    ".stream", ".download", ".win", ".bid", ".racing",
];

/// Tunable knobs for the risk engine.
///
/// Every threshold, weight and word list the heuristic rules and the verdict
/// combiner consult lives here, so tests (and deployments with different risk
/// appetites) can override any of them. The struct is immutable once handed
/// to an `Analyzer`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lowercase substrings matched against path + query.
    pub suspicious_keywords: Vec<String>,
    /// Host suffixes (leading dot included) treated as suspicious.
    pub suspicious_tlds: Vec<String>,

    /// URLs longer than this earn `long_url_points`.
    pub long_url_threshold: usize,
    /// URLs longer than this earn `very_long_url_points` instead.
    pub very_long_url_threshold: usize,
    pub long_url_points: u32,
    pub very_long_url_points: u32,

    /// Points for a literal IPv4/IPv6 host.
    pub ip_literal_points: u32,

    /// Points for 1..many_keywords_at keyword matches.
    pub few_keywords_points: u32,
    /// Points once at least `many_keywords_at` keywords match.
    pub many_keywords_points: u32,
    pub many_keywords_at: usize,

    pub suspicious_tld_points: u32,

    /// Explicit ports that are considered unremarkable.
    pub allowed_ports: Vec<u16>,
    pub uncommon_port_points: u32,

    /// Normalized scores at or above this band are at least suspicious.
    pub suspicious_band: u32,
    /// Normalized scores strictly above this band are dangerous.
    pub dangerous_band: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            suspicious_keywords: SUSPICIOUS_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            suspicious_tlds: SUSPICIOUS_TLDS.iter().map(|t| t.to_string()).collect(),
            long_url_threshold: 200,
            very_long_url_threshold: 500,
            long_url_points: 20,
            very_long_url_points: 40,
            ip_literal_points: 30,
            few_keywords_points: 15,
            many_keywords_points: 30,
            many_keywords_at: 3,
            suspicious_tld_points: 25,
            allowed_ports: vec![80, 443, 8080],
            uncommon_port_points: 20,
            suspicious_band: 30,
            dangerous_band: 60,
        }
    }
}

impl EngineConfig {
    /// Sum of the per-rule maxima; the denominator for score normalization.
    pub fn max_raw(&self) -> u32 {
        self.very_long_url_points
            + self.ip_literal_points
            + self.many_keywords_points
            + self.suspicious_tld_points
            + self.uncommon_port_points
    }
}
