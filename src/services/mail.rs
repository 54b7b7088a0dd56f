//! Mail-fetch collaborators supplying raw emails to the scan pipeline.
//!
//! `GmailSource` talks to the Gmail REST API with an already-issued bearer
//! token; `FixtureSource` serves emails from a JSON file or memory.

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;
use serde::Deserialize;

use crate::config::DEFAULT_SEARCH_TERMS;
use crate::errors::AppError;
use crate::models::email::{MessagePart, RawEmail};
use crate::parsers::extract_body;

/// Supplier of raw emails for a search query.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Identifiers of messages matching `query`, at most `max_results`.
    async fn list_message_ids(&self, query: &str, max_results: u32)
        -> Result<Vec<String>, AppError>;

    /// Fetch and normalize a single message.
    async fn fetch_message(&self, id: &str) -> Result<RawEmail, AppError>;

    /// Short name of this source for logs and health output.
    fn name(&self) -> &str;
}

/// Provider search query: the default terms OR-ed, limited to a date range.
pub fn build_search_query(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "({}) after:{} before:{}",
        DEFAULT_SEARCH_TERMS.join(" OR "),
        start.format("%Y/%m/%d"),
        end.format("%Y/%m/%d")
    )
}

// -- Gmail --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GmailMessage {
    id: String,
    payload: GmailPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPayload {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<GmailHeader>,
    #[serde(default)]
    body: GmailBody,
    #[serde(default)]
    parts: Vec<GmailPayload>,
}

#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct GmailBody {
    data: Option<String>,
}

impl GmailPayload {
    fn header(&self, name: &str) -> String {
        self.headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.clone())
            .unwrap_or_default()
    }

    fn into_part(self) -> MessagePart {
        MessagePart {
            mime_type: self.mime_type,
            data: self.body.data,
            parts: self.parts.into_iter().map(GmailPayload::into_part).collect(),
        }
    }
}

impl GmailMessage {
    fn into_raw_email(self) -> RawEmail {
        let subject = self.payload.header("Subject");
        let sender = self.payload.header("From");
        let date_header = self.payload.header("Date");
        let body = extract_body(&self.payload.into_part());

        RawEmail {
            subject,
            sender,
            body,
            date_header,
            message_id: self.id,
        }
    }
}

/// Gmail REST v1 client.
#[derive(Debug, Clone)]
pub struct GmailSource {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl GmailSource {
    pub fn new(base_url: &str, access_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    fn token(&self) -> Result<&str, AppError> {
        self.access_token.as_deref().ok_or_else(|| {
            AppError::Authentication(
                "Gmail access token not configured (set GMAIL_ACCESS_TOKEN)".to_string(),
            )
        })
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, AppError> {
        Url::parse_with_params(&format!("{}{path}", self.base_url), params)
            .map_err(|e| AppError::Transport(format!("Invalid Gmail API URL: {e}")))
    }
}

#[async_trait]
impl MailSource for GmailSource {
    async fn list_message_ids(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<String>, AppError> {
        let max_results = max_results.to_string();
        let url = self.url(
            "/users/me/messages",
            &[("q", query), ("maxResults", max_results.as_str())],
        )?;

        let list: MessageList = self
            .client
            .get(url)
            .bearer_auth(self.token()?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    async fn fetch_message(&self, id: &str) -> Result<RawEmail, AppError> {
        let url = self.url(&format!("/users/me/messages/{id}"), &[("format", "full")])?;

        let message: GmailMessage = self
            .client
            .get(url)
            .bearer_auth(self.token()?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(message.into_raw_email())
    }

    fn name(&self) -> &str {
        "gmail"
    }
}

// -- Fixture --

/// Serves a fixed set of emails; the search query is ignored.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    emails: Vec<RawEmail>,
}

impl FixtureSource {
    pub fn new(emails: Vec<RawEmail>) -> Self {
        Self { emails }
    }

    /// Load a JSON array of raw emails.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let data = std::fs::read(path).map_err(|e| {
            AppError::Transport(format!("Failed to read mail fixture {}: {e}", path.display()))
        })?;
        let emails: Vec<RawEmail> = serde_json::from_slice(&data).map_err(|e| {
            AppError::Transport(format!("Invalid mail fixture {}: {e}", path.display()))
        })?;
        Ok(Self::new(emails))
    }
}

#[async_trait]
impl MailSource for FixtureSource {
    async fn list_message_ids(
        &self,
        _query: &str,
        max_results: u32,
    ) -> Result<Vec<String>, AppError> {
        Ok(self
            .emails
            .iter()
            .take(max_results as usize)
            .map(|e| e.message_id.clone())
            .collect())
    }

    async fn fetch_message(&self, id: &str) -> Result<RawEmail, AppError> {
        self.emails
            .iter()
            .find(|e| e.message_id == id)
            .cloned()
            .ok_or_else(|| AppError::Transport(format!("Message {id} not in fixture")))
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
