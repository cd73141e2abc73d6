// client.rs
//! HTTP client for the poll API and the widget-side vote state machine.
//!
//! The client takes its base URL and optional auth token at construction;
//! there is no ambient settings object.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Poll, VoteResponse};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message} ({status})")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    message: String,
}

pub struct PollClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl PollClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn fetch_poll(&self, poll_id: i64) -> Result<Poll, ClientError> {
        let request = self.http.get(self.url(&format!("/poll/{poll_id}")));
        let response = self.authorize(request).send().await?;
        decode(response).await
    }

    pub async fn cast_vote(
        &self,
        poll_id: i64,
        option_index: usize,
    ) -> Result<VoteResponse, ClientError> {
        let body = serde_json::json!({
            "poll_id": poll_id,
            "option_index": option_index,
        });
        let request = self.http.post(self.url("/vote")).json(&body);
        let response = self.authorize(request).send().await?;
        decode(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response
            .json::<ApiErrorBody>()
            .await
            .unwrap_or_else(|_| ApiErrorBody {
                code: "error".to_string(),
                message: format!("request failed with status {status}"),
            });
        Err(ClientError::Api {
            status,
            code: body.code,
            message: body.message,
        })
    }
}

/// Widget lifecycle for one page load.
///
/// `Voted` is terminal: there is no undo transition. A failed vote lands in
/// `Failed`, from which a retry is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteState {
    Idle,
    Voting,
    Voted,
    Failed(String),
}

/// Outcome of a single `PollWidget::vote` call.
#[derive(Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded,
    /// Guard hit: a request was already in flight or a vote already landed.
    Ignored,
    Failed(String),
}

pub struct PollWidget {
    client: PollClient,
    poll_id: i64,
    poll: Option<Poll>,
    state: VoteState,
}

impl PollWidget {
    pub fn new(client: PollClient, poll_id: i64) -> Self {
        Self {
            client,
            poll_id,
            poll: None,
            state: VoteState::Idle,
        }
    }

    pub fn state(&self) -> &VoteState {
        &self.state
    }

    pub fn poll(&self) -> Option<&Poll> {
        self.poll.as_ref()
    }

    /// Load the poll for rendering. A fetch failure is returned to the
    /// caller to render inline; the widget keeps no poll in that case.
    pub async fn load(&mut self) -> Result<&Poll, ClientError> {
        let poll = self.client.fetch_poll(self.poll_id).await?;
        Ok(self.poll.insert(poll))
    }

    /// Cast a vote for the option at `index`.
    ///
    /// A second selection while a request is in flight or after a recorded
    /// vote is a no-op. On success the widget swaps in the returned tallies
    /// so results render without another fetch.
    pub async fn vote(&mut self, index: usize) -> VoteOutcome {
        if matches!(self.state, VoteState::Voting | VoteState::Voted) {
            return VoteOutcome::Ignored;
        }
        self.state = VoteState::Voting;

        match self.client.cast_vote(self.poll_id, index).await {
            Ok(response) => {
                if let Some(poll) = self.poll.as_mut() {
                    poll.options = response.results;
                }
                self.state = VoteState::Voted;
                VoteOutcome::Recorded
            }
            Err(err) => {
                tracing::warn!("vote failed: {err}");
                let message = err.to_string();
                self.state = VoteState::Failed(message.clone());
                VoteOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> PollClient {
        PollClient::new(ClientConfig {
            base_url: base_url.to_string(),
            auth_token: None,
        })
    }

    #[test]
    fn url_join_handles_trailing_slash() {
        let with = client("http://localhost:3030/");
        let without = client("http://localhost:3030");
        assert_eq!(with.url("/vote"), "http://localhost:3030/api/vote");
        assert_eq!(without.url("/vote"), "http://localhost:3030/api/vote");
    }

    #[tokio::test]
    async fn vote_after_voted_is_a_no_op() {
        // Unroutable address: the guard must short-circuit before any request.
        let mut widget = PollWidget::new(client("http://127.0.0.1:1"), 1);
        widget.state = VoteState::Voted;

        assert_eq!(widget.vote(0).await, VoteOutcome::Ignored);
        assert_eq!(*widget.state(), VoteState::Voted);
    }

    #[tokio::test]
    async fn failed_vote_lands_in_failed_and_allows_retry() {
        let mut widget = PollWidget::new(client("http://127.0.0.1:1"), 1);

        let outcome = widget.vote(0).await;
        assert!(matches!(outcome, VoteOutcome::Failed(_)));
        assert!(matches!(widget.state(), VoteState::Failed(_)));

        // Retry from Failed is allowed; it fails again but is not ignored.
        let retry = widget.vote(0).await;
        assert!(matches!(retry, VoteOutcome::Failed(_)));
    }
}
