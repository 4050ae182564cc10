use crate::errors::AppError;
use crate::models::{RawAccount, RawAuthor, RawComment, RawReaction};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Read operations against the scraping provider.
///
/// Two implementations exist: [`UnipileClient`] talks to the real Unipile
/// API, [`MockUnipileClient`] serves canned fixtures for offline use and
/// tests. Callers receive typed errors instead of silently-empty lists so
/// "no data" and "provider down" stay distinguishable.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Lists all connected LinkedIn accounts.
    async fn list_accounts(&self) -> Result<Vec<RawAccount>, AppError>;

    /// Lists reactions (likes) on a post.
    async fn post_reactions(
        &self,
        account_id: &str,
        post_id: &str,
    ) -> Result<Vec<RawReaction>, AppError>;

    /// Lists comments on a post.
    async fn post_comments(
        &self,
        account_id: &str,
        post_id: &str,
    ) -> Result<Vec<RawComment>, AppError>;

    /// Fetches extended profile details for enrichment.
    async fn profile_details(
        &self,
        account_id: &str,
        profile_url: &str,
    ) -> Result<Value, AppError>;
}

/// The provider wraps list responses inconsistently: sometimes a bare JSON
/// array, sometimes an object with an `items` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { items: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Envelope<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Envelope::Wrapped { items } => items,
            Envelope::Bare(list) => list,
        }
    }
}

/// Client for the Unipile scraping API.
#[derive(Clone)]
pub struct UnipileClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl UnipileClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ProviderError(format!("Failed to create Unipile client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AppError> {
        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| AppError::ProviderError(format!("Failed to build URL: {}", e)))?;

        let response = self
            .client
            .get(url)
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::ProviderError(format!("Unipile request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ProviderError(format!(
                "Unipile returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ProviderError(format!("Failed to parse Unipile response: {}", e))
        })
    }
}

#[async_trait]
impl ProviderClient for UnipileClient {
    async fn list_accounts(&self) -> Result<Vec<RawAccount>, AppError> {
        tracing::debug!("Fetching Unipile accounts");
        let envelope: Envelope<RawAccount> = self.get_json("/accounts", &[]).await?;
        Ok(envelope.into_items())
    }

    async fn post_reactions(
        &self,
        account_id: &str,
        post_id: &str,
    ) -> Result<Vec<RawReaction>, AppError> {
        tracing::debug!("Fetching reactions for post {}", post_id);
        let envelope: Envelope<RawReaction> = self
            .get_json(
                &format!("/posts/{}/reactions", post_id),
                &[("account_id", account_id), ("limit", "100")],
            )
            .await?;
        Ok(envelope.into_items())
    }

    async fn post_comments(
        &self,
        account_id: &str,
        post_id: &str,
    ) -> Result<Vec<RawComment>, AppError> {
        tracing::debug!("Fetching comments for post {}", post_id);
        let envelope: Envelope<RawComment> = self
            .get_json(
                &format!("/posts/{}/comments", post_id),
                &[("account_id", account_id), ("limit", "100")],
            )
            .await?;
        Ok(envelope.into_items())
    }

    async fn profile_details(
        &self,
        account_id: &str,
        profile_url: &str,
    ) -> Result<Value, AppError> {
        let username = extract_username(profile_url);
        tracing::debug!("Fetching profile details for {}", username);
        self.get_json(
            &format!("/users/{}", username),
            &[("account_id", account_id)],
        )
        .await
    }
}

/// Mock client serving the fixtures the real provider would return.
///
/// Selected with USE_MOCK_UNIPILE; lets the whole pipeline run without
/// Unipile credentials.
#[derive(Clone, Default)]
pub struct MockUnipileClient;

impl MockUnipileClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProviderClient for MockUnipileClient {
    async fn list_accounts(&self) -> Result<Vec<RawAccount>, AppError> {
        Ok(vec![RawAccount {
            id: Some("mock_account_123".to_string()),
            provider: Some("LINKEDIN".to_string()),
            username: Some("test@example.com".to_string()),
            status: Some("VALID".to_string()),
        }])
    }

    async fn post_reactions(
        &self,
        _account_id: &str,
        _post_id: &str,
    ) -> Result<Vec<RawReaction>, AppError> {
        Ok(vec![
            RawReaction {
                id: Some("reaction_1".to_string()),
                author: Some(RawAuthor {
                    name: Some("John Doe".to_string()),
                    headline: Some("CEO at TechCorp".to_string()),
                    profile_url: Some("https://linkedin.com/in/johndoe".to_string()),
                    profile_picture: Some("https://example.com/photo1.jpg".to_string()),
                    ..Default::default()
                }),
                reaction_type: Some("LIKE".to_string()),
                created_at: Some(Utc::now().to_rfc3339()),
            },
            RawReaction {
                id: Some("reaction_2".to_string()),
                author: Some(RawAuthor {
                    name: Some("Jane Smith".to_string()),
                    headline: Some("CTO at StartupXYZ".to_string()),
                    profile_url: Some("https://linkedin.com/in/janesmith".to_string()),
                    profile_picture: Some("https://example.com/photo2.jpg".to_string()),
                    ..Default::default()
                }),
                reaction_type: Some("LIKE".to_string()),
                created_at: Some(Utc::now().to_rfc3339()),
            },
        ])
    }

    async fn post_comments(
        &self,
        _account_id: &str,
        _post_id: &str,
    ) -> Result<Vec<RawComment>, AppError> {
        Ok(vec![RawComment {
            id: Some("comment_1".to_string()),
            author: Some(RawAuthor {
                name: Some("Alice Johnson".to_string()),
                headline: Some("Marketing Director".to_string()),
                profile_url: Some("https://linkedin.com/in/alicejohnson".to_string()),
                profile_picture: Some("https://example.com/photo3.jpg".to_string()),
                ..Default::default()
            }),
            content: Some("Great post! Very insightful.".to_string()),
            likes_count: 5,
            replies_count: 2,
            created_at: Some(Utc::now().to_rfc3339()),
        }])
    }

    async fn profile_details(
        &self,
        _account_id: &str,
        profile_url: &str,
    ) -> Result<Value, AppError> {
        Ok(json!({
            "name": "John Doe",
            "headline": "CEO at TechCorp",
            "company": "TechCorp",
            "location": "San Francisco, CA",
            "industry": "Technology",
            "profile_url": profile_url,
        }))
    }
}

/// Extracts the external post identifier from a LinkedIn post URL.
///
/// Handles both URL shapes:
/// `https://www.linkedin.com/posts/username_activity-1234567890-abcd` and
/// `https://www.linkedin.com/feed/update/urn:li:activity:1234567890`.
/// Falls back to the input unchanged when no marker matches.
pub fn extract_post_id(post_url: &str) -> String {
    if let Some((_, rest)) = post_url.split_once("activity-") {
        if let Some(id) = rest.split('-').next() {
            if !id.is_empty() {
                return id.to_string();
            }
        }
    } else if let Some((_, rest)) = post_url.split_once("urn:li:activity:") {
        if let Some(id) = rest.split('/').next() {
            if !id.is_empty() {
                return id.to_string();
            }
        }
    }
    post_url.to_string()
}

/// Extracts the LinkedIn username from a profile URL
/// (`https://www.linkedin.com/in/username/`), falling back to the input
/// unchanged.
pub fn extract_username(profile_url: &str) -> String {
    if let Some((_, rest)) = profile_url.split_once("/in/") {
        if let Some(username) = rest.trim_end_matches('/').split('/').next() {
            if !username.is_empty() {
                return username.to_string();
            }
        }
    }
    profile_url.to_string()
}

/// Parses a provider timestamp, trying RFC 3339 first and a plain
/// `YYYY-MM-DD HH:MM:SS` form second.
pub fn parse_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
