use thiserror::Error;

/// Errors surfaced while submitting or browsing a scan.
///
/// `Validation` is resolved locally and never reaches the network layer.
/// `Submission` and `Fetch` are terminal for their operation; the message is
/// shown to the user verbatim and a fetch failure stops further polling.
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("invalid repository identifier '{0}', should be 'user/repository'")]
    Validation(String),

    #[error("unable to queue scan: {0}")]
    Submission(String),

    #[error("unable to fetch results: {0}")]
    Fetch(String),
}
