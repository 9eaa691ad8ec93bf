//! Thin façade over the Trello REST API.
//!
//! The [`TrelloApi`] trait is the seam the resolver and driver work against;
//! [`TrelloClient`] is the reqwest implementation. Credentials are injected
//! once at construction and appended to every request as `key`/`token` query
//! parameters.
//!
//! Create calls mutate remote state exactly once per invocation; idempotency
//! is the resolver's responsibility (existence check before create), not this
//! layer's. No retries happen here either.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::config::Credentials;
use crate::error::ImportError;

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

/// A list or label as the board reports it: opaque id plus display name.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntity {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Everything needed to create one card.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub list_id: String,
    pub name: String,
    pub description: String,
    pub label_ids: Vec<String>,
}

/// The five board-directory operations the import pipeline needs.
///
/// Implemented by [`TrelloClient`] for production and by the generated
/// `MockTrelloApi` in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TrelloApi: Send + Sync {
    /// All lists on the board.
    async fn list_lists(&self, board_id: &str) -> Result<Vec<RemoteEntity>, ImportError>;

    /// Create a list at the bottom of the board.
    async fn create_list(&self, board_id: &str, name: &str) -> Result<RemoteEntity, ImportError>;

    /// All named labels on the board. Color-only labels without a name are
    /// filtered out by the implementation.
    async fn list_labels(&self, board_id: &str) -> Result<Vec<RemoteEntity>, ImportError>;

    /// Create an uncolored label on the board.
    async fn create_label(&self, board_id: &str, name: &str) -> Result<RemoteEntity, ImportError>;

    /// Create a card at the bottom of its list.
    async fn create_card(&self, card: NewCard) -> Result<RemoteEntity, ImportError>;
}

/// reqwest-backed [`TrelloApi`] implementation.
pub struct TrelloClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl TrelloClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, credentials)
    }

    /// Point the client at a non-default endpoint (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>, credentials: Credentials) -> Self {
        TrelloClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn auth_params(&self) -> [(&'static str, &str); 2] {
        [
            ("key", self.credentials.api_key.as_str()),
            ("token", self.credentials.api_token.as_str()),
        ]
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ImportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");
        let response = self
            .http
            .get(&url)
            .query(&self.auth_params())
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, ImportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST");
        let response = self
            .http
            .post(&url)
            .query(&self.auth_params())
            .form(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ImportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Trello API request failed");
            return Err(ImportError::RemoteApi {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TrelloApi for TrelloClient {
    async fn list_lists(&self, board_id: &str) -> Result<Vec<RemoteEntity>, ImportError> {
        self.get_json(
            &format!("/boards/{board_id}/lists"),
            &[("fields", "id,name"), ("cards", "none")],
        )
        .await
    }

    async fn create_list(&self, board_id: &str, name: &str) -> Result<RemoteEntity, ImportError> {
        self.post_form(
            "/lists",
            &[("name", name), ("idBoard", board_id), ("pos", "bottom")],
        )
        .await
    }

    async fn list_labels(&self, board_id: &str) -> Result<Vec<RemoteEntity>, ImportError> {
        let labels: Vec<RemoteEntity> = self
            .get_json(
                &format!("/boards/{board_id}/labels"),
                &[("fields", "id,name,color"), ("limit", "1000")],
            )
            .await?;
        Ok(labels.into_iter().filter(|l| !l.name.is_empty()).collect())
    }

    async fn create_label(&self, board_id: &str, name: &str) -> Result<RemoteEntity, ImportError> {
        self.post_form(
            "/labels",
            &[("idBoard", board_id), ("name", name), ("color", "null")],
        )
        .await
    }

    async fn create_card(&self, card: NewCard) -> Result<RemoteEntity, ImportError> {
        let label_ids = card.label_ids.join(",");
        self.post_form(
            "/cards",
            &[
                ("idList", card.list_id.as_str()),
                ("name", card.name.as_str()),
                ("desc", card.description.as_str()),
                ("idLabels", label_ids.as_str()),
                ("pos", "bottom"),
            ],
        )
        .await
    }
}
