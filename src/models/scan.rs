use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Severity or confidence level reported by the analyzer.
///
/// Ordered so that sets of levels dedup and iterate from least to most
/// severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// A single finding. Backend order is preserved for stable display.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Issue {
    pub file: String,
    pub line: u32,
    pub severity: Level,
    pub confidence: Level,
    pub details: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub files: u64,
    pub lines: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScanResult {
    pub issues: Vec<Issue>,
    pub metrics: Metrics,
}

/// Raw JSON body of a results fetch, as the backend serves it.
#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub repo: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub processing: Option<bool>,
    #[serde(default)]
    pub results: Option<ScanResult>,
}

/// Current status of a scan job for one repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanStatus {
    pub repo: String,
    pub time: DateTime<Utc>,
    pub state: ScanState,
}

/// Tagged lowering of the wire payload, so consumers never have to guess
/// what an absent field means.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    /// A worker is still on the job; any `results` in the payload are stale.
    Processing,
    Ready(ScanResult),
    /// Neither `processing` nor `results` present: the backend has not
    /// picked the job up yet (or it was never submitted).
    Unknown,
}

impl From<StatusPayload> for ScanStatus {
    fn from(payload: StatusPayload) -> Self {
        let state = if payload.processing == Some(true) {
            ScanState::Processing
        } else {
            match payload.results {
                Some(results) => ScanState::Ready(results),
                None => ScanState::Unknown,
            }
        };

        ScanStatus {
            repo: payload.repo,
            time: payload.time,
            state,
        }
    }
}
