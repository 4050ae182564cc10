use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

// ============ Database Models ============

/// A LinkedIn post tracked for lead extraction.
///
/// Created on the first extraction request for a URL and mutated on every
/// subsequent fetch (status transitions, updated counts).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier for the post row.
    pub id: Uuid,
    /// Canonical post URL, unique across the table.
    pub post_url: String,
    /// External identifier extracted from the URL (activity id).
    pub post_id: String,
    /// Name of the post author, when known.
    pub author_name: Option<String>,
    /// Profile URL of the post author.
    pub author_profile_url: Option<String>,
    /// Post body text.
    pub content: Option<String>,
    /// When the post was published on LinkedIn.
    pub posted_at: Option<DateTime<Utc>>,
    /// Number of reactions seen on the last extraction.
    pub total_likes: i32,
    /// Number of comments seen on the last extraction.
    pub total_comments: i32,
    /// Number of shares, when the provider reports it.
    pub total_shares: i32,
    /// Lifecycle status: pending, processing, completed or failed.
    pub status: String,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of last update.
    pub updated_at: Option<DateTime<Utc>>,
    /// When the post was last scraped from the provider.
    pub last_scraped_at: Option<DateTime<Utc>>,
}

/// A person who liked or commented on a tracked post.
///
/// Unique per (post_id, profile_url).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lead {
    /// Unique identifier for the lead row.
    pub id: Uuid,
    /// Post this lead belongs to.
    pub post_id: Uuid,
    /// LinkedIn profile URL of the person.
    pub profile_url: String,
    /// Full name as reported by the provider.
    pub full_name: Option<String>,
    /// Profile headline.
    pub headline: Option<String>,
    /// Profile picture URL.
    pub profile_picture_url: Option<String>,
    /// Company, filled by enrichment.
    pub company: Option<String>,
    /// Job title, filled by enrichment.
    pub job_title: Option<String>,
    /// Location, filled by enrichment.
    pub location: Option<String>,
    /// Industry, filled by enrichment.
    pub industry: Option<String>,
    /// Email address, filled by enrichment when available.
    pub email: Option<String>,
    /// Phone number, filled by enrichment when available.
    pub phone: Option<String>,
    /// One of "like", "comment" or "both"; always reflects the union of
    /// the liked/commented flags.
    pub interaction_type: String,
    /// Whether the person reacted to the post.
    pub liked: bool,
    /// Whether the person commented on the post.
    pub commented: bool,
    /// Number of comments the person left, per the latest snapshot.
    pub comment_count: i32,
    /// Whether enrichment has run for this lead.
    pub enriched: bool,
    /// Raw enrichment payload from the provider.
    pub enrichment_data: Option<Value>,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
}

/// A raw comment persisted alongside lead aggregation.
///
/// Unique per external comment identifier; replaying an extraction never
/// duplicates rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier for the comment row.
    pub id: Uuid,
    /// Post this comment belongs to.
    pub post_id: Uuid,
    /// Lead this comment belongs to, when linked.
    pub lead_id: Option<Uuid>,
    /// External comment identifier from the provider.
    pub comment_id: String,
    /// Comment body.
    pub content: Option<String>,
    /// Reactions on the comment.
    pub likes_count: i32,
    /// Replies to the comment.
    pub replies_count: i32,
    /// When the comment was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
}

/// A connected Unipile account stored locally.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProviderAccount {
    pub id: Uuid,
    pub account_id: String,
    pub provider: String,
    pub username: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

// ============ Provider Payload Models ============

/// Author sub-record carried by reactions and comments.
///
/// The provider is inconsistent about field names, hence the fallbacks in
/// `resolved_profile_url` and `picture_url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAuthor {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub profile_url: Option<String>,
    pub url: Option<String>,
    pub profile_picture: Option<String>,
    pub picture: Option<String>,
}

impl RawAuthor {
    /// Profile URL under either field name the provider uses.
    pub fn resolved_profile_url(&self) -> Option<&str> {
        self.profile_url.as_deref().or(self.url.as_deref())
    }

    /// Picture URL under either field name the provider uses.
    pub fn picture_url(&self) -> Option<&str> {
        self.profile_picture.as_deref().or(self.picture.as_deref())
    }
}

/// A reaction (like) record as returned by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReaction {
    pub id: Option<String>,
    pub author: Option<RawAuthor>,
    pub reaction_type: Option<String>,
    pub created_at: Option<String>,
}

/// A comment record as returned by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawComment {
    pub id: Option<String>,
    pub author: Option<RawAuthor>,
    pub content: Option<String>,
    #[serde(default)]
    pub likes_count: i32,
    #[serde(default)]
    pub replies_count: i32,
    pub created_at: Option<String>,
}

/// A connected account as returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAccount {
    pub id: Option<String>,
    pub provider: Option<String>,
    pub username: Option<String>,
    pub status: Option<String>,
}

// ============ API Request/Response Models ============

/// Request payload for POST /api/posts/extract.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub post_url: String,
    pub account_id: Option<String>,
    #[serde(default)]
    pub enrich: bool,
}

/// Counters reported after a completed extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_likes: usize,
    pub total_comments: usize,
    pub unique_leads: usize,
    pub leads_saved: usize,
}

/// Result of a full extraction pass over one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub post_id: Uuid,
    pub post_url: String,
    pub stats: ExtractionStats,
}

/// Outcome of a batch enrichment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentReport {
    pub total_leads: usize,
    pub enriched: usize,
    pub failed: usize,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize)]
pub struct PostQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_post_limit")]
    pub limit: i64,
    pub status: Option<String>,
}

fn default_post_limit() -> i64 {
    20
}

/// Query parameters for listing a post's leads.
#[derive(Debug, Deserialize)]
pub struct LeadQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_lead_limit")]
    pub limit: i64,
    /// Filter by "like", "comment" or "both".
    pub interaction_type: Option<String>,
}

fn default_lead_limit() -> i64 {
    100
}

/// Overall statistics across all posts.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_posts: i64,
    pub total_leads: i64,
    pub total_likes: i64,
    pub total_comments: i64,
}

/// Merged per-profile interaction record produced by reconciliation.
///
/// Rebuilt from scratch on every extraction pass, so persisted counters
/// always reflect the latest snapshot rather than a running total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDraft {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub profile_picture_url: Option<String>,
    pub liked: bool,
    pub commented: bool,
    pub comment_count: i32,
}

impl LeadDraft {
    /// Derives the interaction type from the flags, so the stored value can
    /// never drift out of sync with them.
    pub fn interaction_type(&self) -> &'static str {
        match (self.liked, self.commented) {
            (true, true) => "both",
            (true, false) => "like",
            _ => "comment",
        }
    }
}

/// Typed partial update applied to a lead after enrichment.
///
/// Explicit fields instead of a dynamic attribute merge; `payload` keeps the
/// provider's full response.
#[derive(Debug, Clone)]
pub struct EnrichmentUpdate {
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub payload: Value,
}

impl EnrichmentUpdate {
    /// Builds the update from a raw profile payload.
    ///
    /// Job title prefers the headline, falling back to an explicit
    /// `job_title` field.
    pub fn from_profile(profile: Value) -> Self {
        let text = |key: &str| {
            profile
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let company = text("company");
        let job_title = text("headline").or_else(|| text("job_title"));
        let location = text("location");
        let industry = text("industry");
        Self {
            company,
            job_title,
            location,
            industry,
            payload: profile,
        }
    }
}
