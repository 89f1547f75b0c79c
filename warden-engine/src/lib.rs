pub mod batch;
pub mod config;
pub mod error;
pub mod intel;
pub mod rules;
pub mod scan;
pub mod score;
pub mod url_parts;
pub mod verdict;

pub use batch::{BatchMessage, BatchReport, BatchRunner, BatchState, BatchSummary, CancelFlag};
pub use config::EngineConfig;
pub use error::AnalysisError;
pub use intel::{IntelStatus, IntelligenceResult, SafeBrowsingClient, SafeBrowsingConfig, ThreatIntel};
pub use scan::{Analyzer, ScanResult};
pub use verdict::Verdict;
