// Sequential batch orchestration. One URL at a time, in input order - the
// intelligence collaborator is rate limited, so the engine never holds more
// than one lookup in flight. Cancellation is cooperative: the flag is
// checked between items, never mid-item.

use crate::intel::ThreatIntel;
use crate::scan::{Analyzer, ScanResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::Idle => "idle",
            BatchState::Running => "running",
            BatchState::Completed => "completed",
            BatchState::Cancelled => "cancelled",
        }
    }
}

/// Monotonic cancellation flag shared between the caller and the worker.
/// Setting it more than once is harmless; it never clears.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-verdict tallies for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub safe: usize,
    pub suspicious: usize,
    pub dangerous: usize,
    pub errored: usize,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.safe + self.suspicious + self.dangerous + self.errored
    }

    fn record(&mut self, item: &BatchItem) {
        match item {
            BatchItem::Scanned(result) => match result.verdict {
                crate::verdict::Verdict::Safe => self.safe += 1,
                crate::verdict::Verdict::Suspicious => self.suspicious += 1,
                crate::verdict::Verdict::Dangerous => self.dangerous += 1,
            },
            BatchItem::Failed { .. } => self.errored += 1,
        }
    }
}

/// One entry of the per-item result list, in original input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchItem {
    Scanned(ScanResult),
    Failed { url: String, error: String },
}

impl BatchItem {
    pub fn url(&self) -> &str {
        match self {
            BatchItem::Scanned(result) => &result.url,
            BatchItem::Failed { url, .. } => url,
        }
    }
}

/// Worker-to-caller progress observations.
#[derive(Debug, Clone)]
pub enum BatchMessage {
    Started { total: usize },
    Scanned { result: ScanResult },
    Failed { url: String, error: String },
    Progress { processed: usize, total: usize },
    Done { state: BatchState, summary: BatchSummary },
}

/// Everything a finished (or cancelled) batch run produced.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub state: BatchState,
    pub items: Vec<BatchItem>,
    pub summary: BatchSummary,
}

pub struct BatchRunner<C> {
    analyzer: Analyzer<C>,
    progress: Option<mpsc::UnboundedSender<BatchMessage>>,
    cancel: CancelFlag,
}

impl<C: ThreatIntel> BatchRunner<C> {
    pub fn new(analyzer: Analyzer<C>) -> Self {
        Self {
            analyzer,
            progress: None,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<BatchMessage>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    /// Handle callers can use to request cancellation from another task.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Process every URL in order. A malformed item is recorded and skipped;
    /// a set cancellation flag stops the run before the next item starts.
    pub async fn run(&self, urls: &[String]) -> BatchReport {
        let total = urls.len();
        info!("starting batch scan of {} URLs", total);
        self.emit(BatchMessage::Started { total });

        let mut items: Vec<BatchItem> = Vec::with_capacity(total);
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        let mut state = BatchState::Running;

        for url in urls {
            if self.cancel.is_cancelled() {
                info!(
                    "cancellation observed after {} of {} items",
                    items.len(),
                    total
                );
                state = BatchState::Cancelled;
                break;
            }

            let item = match self.analyzer.scan(url).await {
                Ok(result) => {
                    self.emit(BatchMessage::Scanned {
                        result: result.clone(),
                    });
                    BatchItem::Scanned(result)
                }
                Err(e) => {
                    warn!("skipping {}: {}", url, e);
                    let error = e.to_string();
                    self.emit(BatchMessage::Failed {
                        url: url.clone(),
                        error: error.clone(),
                    });
                    BatchItem::Failed {
                        url: url.clone(),
                        error,
                    }
                }
            };

            summary.record(&item);
            items.push(item);
            self.emit(BatchMessage::Progress {
                processed: items.len(),
                total,
            });
        }

        if state == BatchState::Running {
            state = BatchState::Completed;
        }
        info!(
            "batch {} with {} of {} items processed",
            state.as_str(),
            items.len(),
            total
        );
        self.emit(BatchMessage::Done { state, summary });

        BatchReport {
            state,
            items,
            summary,
        }
    }

    fn emit(&self, message: BatchMessage) {
        // A dropped receiver only means nobody is watching.
        if let Some(tx) = &self.progress {
            let _ = tx.send(message);
        }
    }
}
