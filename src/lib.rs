//! Client-side engine for browsing static-analysis scan results.
//!
//! Submits a scan job for a GitHub repository, polls the backend until it
//! settles, derives the severity/confidence/issue-type facets present in
//! the result set, and recomputes the visible issue subset as filters
//! change. Rendering is left to the consumer of [`View`].

pub mod errors;
pub mod models;
pub mod services;

pub use errors::BrowseError;
pub use models::repo::RepoId;
pub use models::scan::{Issue, Level, Metrics, ScanResult, ScanState, ScanStatus};
pub use services::api::ApiClient;
pub use services::filters::{FacetSet, FilterSelection};
pub use services::session::{Browser, PollOutcome, SessionToken, View};
