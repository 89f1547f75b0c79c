use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use url::{Host, Url};

/// Syntactic classification of the host - no DNS resolution happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    Domain,
    Ipv4,
    Ipv6,
}

impl HostKind {
    pub fn is_ip_literal(&self) -> bool {
        matches!(self, HostKind::Ipv4 | HostKind::Ipv6)
    }
}

/// The decomposed form of a URL, frozen at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlComponents {
    /// The URL after scheme defaulting; this is the string that gets scanned.
    pub raw: String,
    /// Character count of `raw`.
    pub raw_len: usize,
    pub scheme: String,
    pub host: String,
    pub host_kind: HostKind,
    /// Explicit port, if one was written and is not the scheme default.
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

/// Parse a raw string into [`UrlComponents`].
///
/// Inputs without a scheme are assumed to be `https`. Anything that cannot
/// be decomposed into at least a host is rejected with
/// [`AnalysisError::MalformedUrl`].
pub fn normalize(input: &str) -> Result<UrlComponents> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::MalformedUrl("empty URL".to_string()));
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate)
        .map_err(|e| AnalysisError::MalformedUrl(format!("{trimmed}: {e}")))?;

    let host_kind = match parsed.host() {
        Some(Host::Domain(_)) => HostKind::Domain,
        Some(Host::Ipv4(_)) => HostKind::Ipv4,
        Some(Host::Ipv6(_)) => HostKind::Ipv6,
        None => {
            return Err(AnalysisError::MalformedUrl(format!(
                "{trimmed}: missing host"
            )));
        }
    };
    let host = parsed.host_str().unwrap_or_default().to_string();
    if host.is_empty() {
        return Err(AnalysisError::MalformedUrl(format!(
            "{trimmed}: missing host"
        )));
    }

    Ok(UrlComponents {
        raw_len: candidate.chars().count(),
        raw: candidate,
        scheme: parsed.scheme().to_string(),
        host,
        host_kind,
        port: parsed.port(),
        path: parsed.path().to_string(),
        query: parsed.query().map(str::to_string),
        fragment: parsed.fragment().map(str::to_string),
    })
}
