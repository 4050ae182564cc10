use crate::errors::AppError;
use crate::models::{
    EnrichmentUpdate, Lead, LeadDraft, Post, RawAccount, RawComment, StatsResponse,
};
use crate::provider::parse_datetime;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Data access layer for posts, leads, comments and provider accounts.
///
/// All SQL lives here. Extraction writes go through an explicit transaction
/// handed in by the caller; standalone reads and single-row updates use the
/// pool directly.
pub struct LeadStore {
    pool: PgPool,
}

impl LeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ===== Posts =====

    pub async fn find_post_by_url(&self, post_url: &str) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM linkedin_posts WHERE post_url = $1")
            .bind(post_url)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    pub async fn insert_post(&self, post_url: &str, external_id: &str) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            "INSERT INTO linkedin_posts (post_url, post_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(post_url)
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Moves a post into 'processing' and stamps the scrape time.
    pub async fn begin_processing(&self, post_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE linkedin_posts
             SET status = 'processing', last_scraped_at = now(), updated_at = now()
             WHERE id = $1",
        )
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Marks a post 'failed'. Runs on the pool, not the aborted transaction.
    pub async fn mark_failed(&self, post_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE linkedin_posts SET status = 'failed', updated_at = now() WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Finalizes a post inside the extraction transaction: snapshot counts
    /// and status 'completed'.
    pub async fn complete_post(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        post_id: Uuid,
        total_likes: i32,
        total_comments: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE linkedin_posts
             SET total_likes = $2, total_comments = $3, status = 'completed', updated_at = now()
             WHERE id = $1",
        )
        .bind(post_id)
        .bind(total_likes)
        .bind(total_comments)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn list_posts(
        &self,
        status: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Post>, AppError> {
        let posts = match status {
            Some(status) => {
                sqlx::query_as::<_, Post>(
                    "SELECT * FROM linkedin_posts WHERE status = $1
                     ORDER BY created_at DESC OFFSET $2 LIMIT $3",
                )
                .bind(status)
                .bind(skip)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Post>(
                    "SELECT * FROM linkedin_posts ORDER BY created_at DESC OFFSET $1 LIMIT $2",
                )
                .bind(skip)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(posts)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM linkedin_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    /// Deletes a post; leads and comments go with it via ON DELETE CASCADE.
    pub async fn delete_post(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM linkedin_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ===== Leads =====

    /// Inserts or updates a merged lead, keyed by (post_id, profile_url).
    /// On conflict every merged field is overwritten with the new snapshot.
    pub async fn upsert_lead(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        post_id: Uuid,
        profile_url: &str,
        draft: &LeadDraft,
    ) -> Result<Uuid, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO leads
                (post_id, profile_url, full_name, headline, profile_picture_url,
                 interaction_type, liked, commented, comment_count)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (post_id, profile_url) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                headline = EXCLUDED.headline,
                profile_picture_url = EXCLUDED.profile_picture_url,
                interaction_type = EXCLUDED.interaction_type,
                liked = EXCLUDED.liked,
                commented = EXCLUDED.commented,
                comment_count = EXCLUDED.comment_count
             RETURNING id",
        )
        .bind(post_id)
        .bind(profile_url)
        .bind(&draft.full_name)
        .bind(&draft.headline)
        .bind(&draft.profile_picture_url)
        .bind(draft.interaction_type())
        .bind(draft.liked)
        .bind(draft.commented)
        .bind(draft.comment_count)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn leads_for_post(
        &self,
        post_id: Uuid,
        interaction_type: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Lead>, AppError> {
        let leads = match interaction_type {
            Some(interaction_type) => {
                sqlx::query_as::<_, Lead>(
                    "SELECT * FROM leads WHERE post_id = $1 AND interaction_type = $2
                     ORDER BY created_at ASC OFFSET $3 LIMIT $4",
                )
                .bind(post_id)
                .bind(interaction_type)
                .bind(skip)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Lead>(
                    "SELECT * FROM leads WHERE post_id = $1
                     ORDER BY created_at ASC OFFSET $2 LIMIT $3",
                )
                .bind(post_id)
                .bind(skip)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(leads)
    }

    /// Every lead of a post, unpaginated, for export.
    pub async fn all_leads_for_post(&self, post_id: Uuid) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE post_id = $1 ORDER BY created_at ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn unenriched_leads(&self, post_id: Uuid) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE post_id = $1 AND enriched = FALSE ORDER BY created_at ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    /// Applies an enrichment result field by field and flips the flag.
    pub async fn apply_enrichment(
        &self,
        lead_id: Uuid,
        update: &EnrichmentUpdate,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE leads
             SET company = $2, job_title = $3, location = $4, industry = $5,
                 enrichment_data = $6, enriched = TRUE
             WHERE id = $1",
        )
        .bind(lead_id)
        .bind(&update.company)
        .bind(&update.job_title)
        .bind(&update.location)
        .bind(&update.industry)
        .bind(&update.payload)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ===== Comments =====

    /// Persists a raw comment inside the extraction transaction.
    ///
    /// Deduplicated on the external comment identifier; replayed extractions
    /// leave existing rows untouched. Returns whether a row was inserted.
    pub async fn insert_comment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        post_id: Uuid,
        comment_id: &str,
        comment: &RawComment,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO comments
                (post_id, comment_id, content, likes_count, replies_count, posted_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (comment_id) DO NOTHING",
        )
        .bind(post_id)
        .bind(comment_id)
        .bind(&comment.content)
        .bind(comment.likes_count)
        .bind(comment.replies_count)
        .bind(parse_datetime(comment.created_at.as_deref()))
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ===== Accounts =====

    /// Records a provider account the first time it is seen.
    pub async fn upsert_account(&self, account: &RawAccount) -> Result<(), AppError> {
        let Some(account_id) = account.id.as_deref() else {
            return Ok(());
        };

        sqlx::query(
            "INSERT INTO unipile_accounts (account_id, provider, username, status)
             VALUES ($1, COALESCE($2, 'LINKEDIN'), $3, $4)
             ON CONFLICT (account_id) DO NOTHING",
        )
        .bind(account_id)
        .bind(&account.provider)
        .bind(&account.username)
        .bind(&account.status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ===== Stats =====

    /// Overall counters. Sequential scalar queries instead of one CTE.
    pub async fn stats(&self) -> Result<StatsResponse, AppError> {
        let total_posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM linkedin_posts")
            .fetch_one(&self.pool)
            .await?;
        let total_leads: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await?;
        let total_likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leads WHERE liked = TRUE")
            .fetch_one(&self.pool)
            .await?;
        let total_comments: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM leads WHERE commented = TRUE")
                .fetch_one(&self.pool)
                .await?;

        Ok(StatsResponse {
            total_posts,
            total_leads,
            total_likes,
            total_comments,
        })
    }
}
