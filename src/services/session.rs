use crate::errors::BrowseError;
use crate::models::repo::RepoId;
use crate::models::scan::{Issue, Level, Metrics, ScanState, ScanStatus};
use crate::services::api::ApiClient;
use crate::services::filters::{self, FacetSet, FilterSelection};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::BTreeSet;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Identity of one browsing session. A fetch carries the token of the
/// session it was issued for; a response whose token no longer matches the
/// live session is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(Uuid);

impl SessionToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// What a renderer should show. The three empty-ish ready states stay
/// distinguishable: nothing scanned, nothing found, nothing matching.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    Failed(String),
    NoSourceFiles,
    NoIssues,
    NoMatch { total: usize },
    Issues(Vec<Issue>),
}

/// Outcome of applying a fetched status or error to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The session reached a terminal state; stop polling.
    Settled,
    /// Still processing (or job not picked up yet); poll again.
    Pending,
    /// Response belonged to a superseded session and was dropped.
    Discarded,
}

enum Phase {
    Loading,
    Failed(String),
    Ready {
        time: DateTime<Utc>,
        issues: Vec<Issue>,
        metrics: Metrics,
        facets: FacetSet,
        selection: FilterSelection,
    },
}

struct Session {
    repo: RepoId,
    token: SessionToken,
    phase: Phase,
}

/// State machine for browsing scan results, one repository session at a
/// time. Owns the current `ScanStatus`-derived phase and the filter
/// selection; navigation replaces the session wholesale.
pub struct Browser {
    api: ApiClient,
    poll_interval: Duration,
    session: Option<Session>,
}

impl Browser {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            poll_interval: DEFAULT_POLL_INTERVAL,
            session: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Ask the backend to enqueue a scan. On success the caller is expected
    /// to `open` a session for the repository.
    pub async fn submit(&self, repo: &RepoId) -> Result<(), BrowseError> {
        self.api.enqueue_scan(repo).await
    }

    /// Tear down any current session and start browsing `repo`. Pending
    /// responses for the previous session become stale and will be dropped
    /// when they land.
    pub fn open(&mut self, repo: RepoId) -> SessionToken {
        let token = SessionToken::new();
        info!("session {} started for {}", token.0, repo);
        self.session = Some(Session {
            repo,
            token,
            phase: Phase::Loading,
        });
        token
    }

    pub fn close(&mut self) {
        self.session = None;
    }

    /// Drive the fetch/poll loop for the session identified by `token`
    /// until it settles. At most one fetch is in flight at any time; while
    /// the backend reports the job as processing (or not yet picked up) the
    /// next fetch is issued after the poll interval. Returns `None` when
    /// the session was superseded mid-flight.
    pub async fn run(&mut self, token: SessionToken) -> Option<View> {
        loop {
            let repo = self.session_repo(token)?;
            let outcome = match self.api.fetch_status(&repo).await {
                Ok(status) => self.apply_status(token, status),
                Err(err) => self.apply_error(token, err),
            };
            match outcome {
                PollOutcome::Settled => return Some(self.view()),
                PollOutcome::Pending => tokio::time::sleep(self.poll_interval).await,
                PollOutcome::Discarded => return None,
            }
        }
    }

    /// Apply a fetched status to the session it was issued for.
    pub fn apply_status(&mut self, token: SessionToken, status: ScanStatus) -> PollOutcome {
        let Some(session) = self.live_session(token) else {
            return PollOutcome::Discarded;
        };

        match &session.phase {
            Phase::Loading => {}
            // terminal phases do not regress
            Phase::Failed(_) | Phase::Ready { .. } => return PollOutcome::Settled,
        }

        match status.state {
            ScanState::Processing | ScanState::Unknown => PollOutcome::Pending,
            ScanState::Ready(result) => {
                let selection = filters::default_selection(&result.issues);
                let facets = filters::derive_facets(&result.issues, &selection);
                info!(
                    "session {} ready: {} issues across {} files",
                    session.token.0,
                    result.issues.len(),
                    result.metrics.files
                );
                session.phase = Phase::Ready {
                    time: status.time,
                    issues: result.issues,
                    metrics: result.metrics,
                    facets,
                    selection,
                };
                PollOutcome::Settled
            }
        }
    }

    /// Record a fetch failure. Terminal: the message is kept verbatim and
    /// polling stops.
    pub fn apply_error(&mut self, token: SessionToken, err: BrowseError) -> PollOutcome {
        let Some(session) = self.live_session(token) else {
            return PollOutcome::Discarded;
        };
        session.phase = Phase::Failed(err.to_string());
        PollOutcome::Settled
    }

    /// Replace the severity selection, clamped to the levels actually
    /// present, then recompute the cascading issue-type facets.
    pub fn set_severities(&mut self, severities: BTreeSet<Level>) {
        self.update_selection(|selection| selection.severities = severities);
    }

    /// Replace the confidence selection, analogous to `set_severities`.
    pub fn set_confidences(&mut self, confidences: BTreeSet<Level>) {
        self.update_selection(|selection| selection.confidences = confidences);
    }

    /// Select one issue-type category, or `None` for no filter.
    pub fn set_issue_type(&mut self, issue_type: Option<String>) {
        self.update_selection(|selection| selection.issue_type = issue_type);
    }

    fn update_selection<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut FilterSelection),
    {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Phase::Ready {
            issues,
            facets,
            selection,
            ..
        } = &mut session.phase
        else {
            return;
        };

        mutate(selection);

        let available = filters::derive_facets(issues, selection);
        selection.severities = &selection.severities & &available.severities;
        selection.confidences = &selection.confidences & &available.confidences;

        *facets = filters::derive_facets(issues, selection);

        // self-heal a selection that no longer matches any visible category
        if let Some(ty) = selection.issue_type.take() {
            if facets.issue_types.contains(&ty) {
                selection.issue_type = Some(ty);
            } else {
                debug!("issue type '{}' no longer present, clearing filter", ty);
            }
        }
    }

    /// Current renderable state. Idle (no session) renders as loading.
    pub fn view(&self) -> View {
        let Some(session) = &self.session else {
            return View::Loading;
        };
        match &session.phase {
            Phase::Loading => View::Loading,
            Phase::Failed(message) => View::Failed(message.clone()),
            Phase::Ready {
                issues,
                metrics,
                selection,
                ..
            } => {
                if metrics.files == 0 {
                    return View::NoSourceFiles;
                }
                if issues.is_empty() {
                    return View::NoIssues;
                }
                let visible = filters::apply_filters(issues, selection);
                if visible.is_empty() {
                    View::NoMatch {
                        total: issues.len(),
                    }
                } else {
                    View::Issues(visible)
                }
            }
        }
    }

    pub fn repo(&self) -> Option<&RepoId> {
        self.session.as_ref().map(|session| &session.repo)
    }

    pub fn facets(&self) -> Option<&FacetSet> {
        match &self.session.as_ref()?.phase {
            Phase::Ready { facets, .. } => Some(facets),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&FilterSelection> {
        match &self.session.as_ref()?.phase {
            Phase::Ready { selection, .. } => Some(selection),
            _ => None,
        }
    }

    pub fn metrics(&self) -> Option<Metrics> {
        match &self.session.as_ref()?.phase {
            Phase::Ready { metrics, .. } => Some(*metrics),
            _ => None,
        }
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match &self.session.as_ref()?.phase {
            Phase::Ready { time, .. } => Some(*time),
            _ => None,
        }
    }

    fn session_repo(&self, token: SessionToken) -> Option<RepoId> {
        let session = self.session.as_ref()?;
        (session.token == token).then(|| session.repo.clone())
    }

    fn live_session(&mut self, token: SessionToken) -> Option<&mut Session> {
        let session = self.session.as_mut()?;
        if session.token != token {
            debug!("dropping stale response for session {}", token.0);
            return None;
        }
        Some(session)
    }
}
