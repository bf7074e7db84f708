use crate::errors::BrowseError;
use crate::models::repo::RepoId;
use crate::models::scan::{ScanStatus, StatusPayload};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use log::{debug, error};

/// HTTP client for the scan service.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, BrowseError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("scan-browser"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BrowseError::Submission(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the backend to enqueue a scan of `repo`. Any 2xx means accepted;
    /// the backend tolerates duplicate submissions, so no dedup here.
    pub async fn enqueue_scan(&self, repo: &RepoId) -> Result<(), BrowseError> {
        let url = format!(
            "{}/queue/github.com/{}/{}",
            self.base_url,
            repo.owner(),
            repo.name()
        );
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| BrowseError::Submission(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("queue error {}: {}", status, error_text);
            return Err(BrowseError::Submission(format!("server returned {}", status)));
        }

        Ok(())
    }

    /// Fetch the current scan status for `repo`. One call per poll tick.
    pub async fn fetch_status(&self, repo: &RepoId) -> Result<ScanStatus, BrowseError> {
        let url = format!(
            "{}/results/github.com/{}/{}",
            self.base_url,
            repo.owner(),
            repo.name()
        );
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BrowseError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("results error {}: {}", status, error_text);
            return Err(BrowseError::Fetch(format!("server returned {}", status)));
        }

        let payload: StatusPayload = response
            .json()
            .await
            .map_err(|e| BrowseError::Fetch(e.to_string()))?;

        Ok(payload.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scan::ScanState;

    #[tokio::test]
    async fn enqueue_scan_accepts_2xx() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/queue/github.com/octocat/hello")
            .with_status(202)
            .create_async()
            .await;

        let api = ApiClient::new(&server.url()).unwrap();
        let repo = RepoId::parse("octocat/hello").unwrap();
        api.enqueue_scan(&repo).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn enqueue_scan_surfaces_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/queue/github.com/octocat/hello")
            .with_status(503)
            .create_async()
            .await;

        let api = ApiClient::new(&server.url()).unwrap();
        let repo = RepoId::parse("octocat/hello").unwrap();
        let err = api.enqueue_scan(&repo).await.unwrap_err();

        assert!(matches!(err, BrowseError::Submission(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn fetch_status_parses_ready_payload() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/results/github.com/octocat/hello")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "repo": "github.com/octocat/hello",
                    "time": "2024-05-01T12:00:00Z",
                    "results": {
                        "issues": [],
                        "metrics": {"files": 4, "lines": 321}
                    }
                }"#,
            )
            .create_async()
            .await;

        let api = ApiClient::new(&server.url()).unwrap();
        let repo = RepoId::parse("octocat/hello").unwrap();
        let status = api.fetch_status(&repo).await.unwrap();

        assert_eq!(status.repo, "github.com/octocat/hello");
        match status.state {
            ScanState::Ready(result) => assert_eq!(result.metrics.lines, 321),
            other => panic!("expected ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_status_surfaces_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/results/github.com/octocat/hello")
            .with_status(500)
            .create_async()
            .await;

        let api = ApiClient::new(&server.url()).unwrap();
        let repo = RepoId::parse("octocat/hello").unwrap();
        let err = api.fetch_status(&repo).await.unwrap_err();

        assert!(matches!(err, BrowseError::Fetch(_)));
    }
}
