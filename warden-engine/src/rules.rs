// The five offline heuristics. Each rule is a pure function of the parsed
// URL and the engine configuration; none depends on another's outcome.

use crate::config::EngineConfig;
use crate::url_parts::UrlComponents;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    UrlLength,
    IpLiteral,
    SuspiciousKeywords,
    UnusualTld,
    UncommonPort,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::UrlLength => "url_length",
            RuleKind::IpLiteral => "ip_literal",
            RuleKind::SuspiciousKeywords => "suspicious_keywords",
            RuleKind::UnusualTld => "unusual_tld",
            RuleKind::UncommonPort => "uncommon_port",
        }
    }
}

/// Outcome of a single rule for a single URL. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFinding {
    pub rule: RuleKind,
    pub points: u32,
    pub max_points: u32,
    pub reason: String,
    pub flagged: bool,
}

impl RuleFinding {
    fn new(rule: RuleKind, points: u32, max_points: u32, reason: String) -> Self {
        Self {
            rule,
            points,
            max_points,
            reason,
            flagged: points > 0,
        }
    }
}

/// Run every rule in table order.
pub fn evaluate(components: &UrlComponents, config: &EngineConfig) -> Vec<RuleFinding> {
    vec![
        check_url_length(components, config),
        check_ip_literal(components, config),
        check_suspicious_keywords(components, config),
        check_unusual_tld(components, config),
        check_uncommon_port(components, config),
    ]
}

pub fn check_url_length(components: &UrlComponents, config: &EngineConfig) -> RuleFinding {
    let length = components.raw_len;
    let max = config.very_long_url_points;
    if length <= config.long_url_threshold {
        RuleFinding::new(
            RuleKind::UrlLength,
            0,
            max,
            format!("URL length is normal ({length} characters)"),
        )
    } else if length <= config.very_long_url_threshold {
        RuleFinding::new(
            RuleKind::UrlLength,
            config.long_url_points,
            max,
            format!("URL is suspiciously long ({length} characters)"),
        )
    } else {
        RuleFinding::new(
            RuleKind::UrlLength,
            config.very_long_url_points,
            max,
            format!("URL is extremely long ({length} characters)"),
        )
    }
}

pub fn check_ip_literal(components: &UrlComponents, config: &EngineConfig) -> RuleFinding {
    let max = config.ip_literal_points;
    if components.host_kind.is_ip_literal() {
        RuleFinding::new(
            RuleKind::IpLiteral,
            config.ip_literal_points,
            max,
            format!(
                "URL uses IP address ({}) instead of a domain name",
                components.host
            ),
        )
    } else {
        RuleFinding::new(
            RuleKind::IpLiteral,
            0,
            max,
            "URL uses a domain name".to_string(),
        )
    }
}

pub fn check_suspicious_keywords(components: &UrlComponents, config: &EngineConfig) -> RuleFinding {
    let mut haystack = components.path.to_lowercase();
    if let Some(query) = &components.query {
        haystack.push('?');
        haystack.push_str(&query.to_lowercase());
    }

    let matched: Vec<&str> = config
        .suspicious_keywords
        .iter()
        .filter(|keyword| haystack.contains(keyword.as_str()))
        .map(|keyword| keyword.as_str())
        .collect();

    let max = config.many_keywords_points;
    if matched.is_empty() {
        RuleFinding::new(
            RuleKind::SuspiciousKeywords,
            0,
            max,
            "No suspicious keywords detected".to_string(),
        )
    } else if matched.len() < config.many_keywords_at {
        RuleFinding::new(
            RuleKind::SuspiciousKeywords,
            config.few_keywords_points,
            max,
            format!("Contains suspicious keywords: {}", matched.join(", ")),
        )
    } else {
        // Cap the listing so pathological URLs don't produce unreadable reasons.
        let listed = matched[..matched.len().min(5)].join(", ");
        RuleFinding::new(
            RuleKind::SuspiciousKeywords,
            config.many_keywords_points,
            max,
            format!("Contains multiple suspicious keywords: {listed}"),
        )
    }
}

pub fn check_unusual_tld(components: &UrlComponents, config: &EngineConfig) -> RuleFinding {
    let max = config.suspicious_tld_points;
    if !components.host_kind.is_ip_literal() {
        for tld in &config.suspicious_tlds {
            if components.host.ends_with(tld.as_str()) {
                return RuleFinding::new(
                    RuleKind::UnusualTld,
                    config.suspicious_tld_points,
                    max,
                    format!("URL uses suspicious TLD: {tld}"),
                );
            }
        }
    }
    RuleFinding::new(
        RuleKind::UnusualTld,
        0,
        max,
        "URL uses a standard TLD".to_string(),
    )
}

pub fn check_uncommon_port(components: &UrlComponents, config: &EngineConfig) -> RuleFinding {
    let max = config.uncommon_port_points;
    match components.port {
        None => RuleFinding::new(
            RuleKind::UncommonPort,
            0,
            max,
            "URL uses default port".to_string(),
        ),
        Some(port) if config.allowed_ports.contains(&port) => RuleFinding::new(
            RuleKind::UncommonPort,
            0,
            max,
            format!("URL uses standard port {port}"),
        ),
        Some(port) => RuleFinding::new(
            RuleKind::UncommonPort,
            config.uncommon_port_points,
            max,
            format!("URL uses uncommon port {port}"),
        ),
    }
}
