//! Lead extraction and enrichment workflows.
//!
//! Reconciliation merges raw reaction and comment records into one
//! deduplicated interaction record per profile, then persists the result:
//! raw comments keyed by their external identifier, leads upserted on
//! (post, profile URL). Enrichment runs per lead, best effort.

use crate::errors::{AppError, ResultExt};
use crate::models::{
    EnrichmentReport, EnrichmentUpdate, ExtractionResult, ExtractionStats, LeadDraft, Post,
    RawComment, RawReaction,
};
use crate::provider::{extract_post_id, ProviderClient};
use crate::storage::LeadStore;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct LeadExtractor {
    store: LeadStore,
    provider: Arc<dyn ProviderClient>,
}

/// Merges raw reactions and comments into one record per profile URL.
///
/// Rebuilt from scratch on every call: `comment_count` is the number of
/// comments in this batch, not an accumulation across extraction runs.
/// Records without a resolvable profile URL are dropped.
pub fn merge_interactions(
    reactions: &[RawReaction],
    comments: &[RawComment],
) -> HashMap<String, LeadDraft> {
    let mut drafts: HashMap<String, LeadDraft> = HashMap::new();

    for reaction in reactions {
        let Some(author) = reaction.author.as_ref() else {
            continue;
        };
        let Some(profile_url) = author.resolved_profile_url() else {
            continue;
        };
        drafts
            .entry(profile_url.to_string())
            .and_modify(|draft| draft.liked = true)
            .or_insert_with(|| LeadDraft {
                full_name: author.name.clone(),
                headline: author.headline.clone(),
                profile_picture_url: author.picture_url().map(str::to_string),
                liked: true,
                commented: false,
                comment_count: 0,
            });
    }

    for comment in comments {
        let Some(author) = comment.author.as_ref() else {
            continue;
        };
        let Some(profile_url) = author.resolved_profile_url() else {
            continue;
        };
        let draft = drafts
            .entry(profile_url.to_string())
            .or_insert_with(|| LeadDraft {
                full_name: author.name.clone(),
                headline: author.headline.clone(),
                profile_picture_url: author.picture_url().map(str::to_string),
                liked: false,
                commented: false,
                comment_count: 0,
            });
        draft.commented = true;
        draft.comment_count += 1;
    }

    drafts
}

impl LeadExtractor {
    pub fn new(pool: sqlx::PgPool, provider: Arc<dyn ProviderClient>) -> Self {
        Self {
            store: LeadStore::new(pool),
            provider,
        }
    }

    /// Extracts all leads from a post and persists them.
    ///
    /// Finds or creates the post row, fetches the current reaction/comment
    /// snapshot from the provider, reconciles it and writes leads, comments
    /// and the completed post in a single transaction. Any failure marks the
    /// post 'failed' and surfaces the error.
    pub async fn extract_from_post(
        &self,
        post_url: &str,
        account_id: &str,
    ) -> Result<ExtractionResult, AppError> {
        let post = match self.store.find_post_by_url(post_url).await? {
            Some(post) => post,
            None => {
                let external_id = extract_post_id(post_url);
                self.store
                    .insert_post(post_url, &external_id)
                    .await
                    .context("Failed to create post record")?
            }
        };
        self.store.begin_processing(post.id).await?;

        match self.run_extraction(&post, account_id).await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::error!("Extraction failed for {}: {}", post_url, err);
                if let Err(mark_err) = self.store.mark_failed(post.id).await {
                    tracing::error!("Failed to mark post {} as failed: {}", post.id, mark_err);
                }
                Err(err)
            }
        }
    }

    async fn run_extraction(
        &self,
        post: &Post,
        account_id: &str,
    ) -> Result<ExtractionResult, AppError> {
        tracing::info!("Extracting reactions from post: {}", post.post_url);
        let reactions = self
            .provider
            .post_reactions(account_id, &post.post_id)
            .await?;

        tracing::info!("Extracting comments from post: {}", post.post_url);
        let comments = self
            .provider
            .post_comments(account_id, &post.post_id)
            .await?;

        let drafts = merge_interactions(&reactions, &comments);

        // One transaction per extraction call; a failure below leaves no
        // partial lead/comment writes behind.
        let mut tx = self.store.pool().begin().await?;

        for comment in &comments {
            // Comments without an external identifier cannot be deduplicated
            // and are skipped; the author may still appear as a lead.
            let Some(comment_id) = comment.id.as_deref() else {
                continue;
            };
            self.store
                .insert_comment(&mut tx, post.id, comment_id, comment)
                .await?;
        }

        let mut leads_saved = 0;
        for (profile_url, draft) in &drafts {
            self.store
                .upsert_lead(&mut tx, post.id, profile_url, draft)
                .await?;
            leads_saved += 1;
        }

        self.store
            .complete_post(&mut tx, post.id, reactions.len() as i32, comments.len() as i32)
            .await?;
        tx.commit().await?;

        tracing::info!(
            "Extraction completed for {}: {} reactions, {} comments, {} leads",
            post.post_url,
            reactions.len(),
            comments.len(),
            leads_saved
        );

        Ok(ExtractionResult {
            success: true,
            post_id: post.id,
            post_url: post.post_url.clone(),
            stats: ExtractionStats {
                total_likes: reactions.len(),
                total_comments: comments.len(),
                unique_leads: drafts.len(),
                leads_saved,
            },
        })
    }

    /// Enriches a single lead with extended profile data.
    ///
    /// Returns whether the lead was enriched. Errors are logged and count as
    /// a failure; the lead row is left unmodified.
    pub async fn enrich_lead(&self, lead_id: Uuid, account_id: &str) -> bool {
        match self.try_enrich_lead(lead_id, account_id).await {
            Ok(enriched) => enriched,
            Err(err) => {
                tracing::error!("Error enriching lead {}: {}", lead_id, err);
                false
            }
        }
    }

    async fn try_enrich_lead(&self, lead_id: Uuid, account_id: &str) -> Result<bool, AppError> {
        let Some(lead) = self.store.get_lead(lead_id).await? else {
            return Ok(false);
        };

        let profile = self
            .provider
            .profile_details(account_id, &lead.profile_url)
            .await?;
        if profile.is_null() {
            return Ok(false);
        }

        let update = EnrichmentUpdate::from_profile(profile);
        self.store
            .apply_enrichment(lead_id, &update)
            .await
            .context("Failed to store enrichment result")?;
        Ok(true)
    }

    /// Enriches every unenriched lead of a post, best effort.
    ///
    /// Individual failures never abort the batch; the report carries the
    /// split.
    pub async fn enrich_post_leads(
        &self,
        post_id: Uuid,
        account_id: &str,
    ) -> Result<EnrichmentReport, AppError> {
        let leads = self.store.unenriched_leads(post_id).await?;

        let mut enriched = 0;
        let mut failed = 0;
        for lead in &leads {
            if self.enrich_lead(lead.id, account_id).await {
                enriched += 1;
            } else {
                failed += 1;
            }
        }

        tracing::info!(
            "Enrichment finished for post {}: {} enriched, {} failed",
            post_id,
            enriched,
            failed
        );

        Ok(EnrichmentReport {
            total_leads: leads.len(),
            enriched,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAuthor;
    use serde_json::json;

    fn author(name: &str, profile_url: &str) -> RawAuthor {
        RawAuthor {
            name: Some(name.to_string()),
            headline: Some(format!("{} headline", name)),
            profile_url: Some(profile_url.to_string()),
            ..Default::default()
        }
    }

    fn reaction(name: &str, profile_url: &str) -> RawReaction {
        RawReaction {
            id: None,
            author: Some(author(name, profile_url)),
            reaction_type: Some("LIKE".to_string()),
            created_at: None,
        }
    }

    fn comment(name: &str, profile_url: &str) -> RawComment {
        RawComment {
            id: Some(format!("c-{}", name)),
            author: Some(author(name, profile_url)),
            content: Some("text".to_string()),
            likes_count: 0,
            replies_count: 0,
            created_at: None,
        }
    }

    #[test]
    fn liker_and_commenter_becomes_both() {
        let reactions = vec![reaction("A", "https://linkedin.com/in/a")];
        let comments = vec![
            comment("A", "https://linkedin.com/in/a"),
            comment("B", "https://linkedin.com/in/b"),
        ];

        let drafts = merge_interactions(&reactions, &comments);
        assert_eq!(drafts.len(), 2);

        let a = &drafts["https://linkedin.com/in/a"];
        assert!(a.liked);
        assert!(a.commented);
        assert_eq!(a.interaction_type(), "both");
        assert_eq!(a.comment_count, 1);

        let b = &drafts["https://linkedin.com/in/b"];
        assert!(!b.liked);
        assert!(b.commented);
        assert_eq!(b.interaction_type(), "comment");
        assert_eq!(b.comment_count, 1);
    }

    #[test]
    fn like_only_stays_like() {
        let reactions = vec![reaction("A", "https://linkedin.com/in/a")];
        let drafts = merge_interactions(&reactions, &[]);

        let a = &drafts["https://linkedin.com/in/a"];
        assert_eq!(a.interaction_type(), "like");
        assert!(a.liked && !a.commented);
        assert_eq!(a.comment_count, 0);
    }

    #[test]
    fn duplicate_reactions_are_idempotent() {
        let reactions = vec![
            reaction("A", "https://linkedin.com/in/a"),
            reaction("A", "https://linkedin.com/in/a"),
        ];
        let drafts = merge_interactions(&reactions, &[]);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts["https://linkedin.com/in/a"].comment_count, 0);
    }

    #[test]
    fn comment_count_counts_comments_in_batch() {
        let comments = vec![
            comment("A", "https://linkedin.com/in/a"),
            comment("A", "https://linkedin.com/in/a"),
            comment("A", "https://linkedin.com/in/a"),
        ];
        let drafts = merge_interactions(&[], &comments);
        assert_eq!(drafts["https://linkedin.com/in/a"].comment_count, 3);
    }

    #[test]
    fn records_without_profile_url_are_dropped() {
        let mut nameless = reaction("A", "ignored");
        nameless.author = Some(RawAuthor {
            name: Some("A".to_string()),
            ..Default::default()
        });
        let mut authorless = comment("B", "ignored");
        authorless.author = None;

        let drafts = merge_interactions(&[nameless], &[authorless]);
        assert!(drafts.is_empty());
    }

    #[test]
    fn author_url_fallback_is_used() {
        let mut r = reaction("A", "unused");
        r.author = Some(RawAuthor {
            name: Some("A".to_string()),
            url: Some("https://linkedin.com/in/a".to_string()),
            ..Default::default()
        });
        let drafts = merge_interactions(&[r], &[]);
        assert!(drafts.contains_key("https://linkedin.com/in/a"));
    }

    #[test]
    fn remerge_of_same_snapshot_is_stable() {
        let reactions = vec![
            reaction("A", "https://linkedin.com/in/a"),
            reaction("B", "https://linkedin.com/in/b"),
        ];
        let comments = vec![
            comment("B", "https://linkedin.com/in/b"),
            comment("C", "https://linkedin.com/in/c"),
        ];

        let first = merge_interactions(&reactions, &comments);
        let second = merge_interactions(&reactions, &comments);
        assert_eq!(first, second);
    }

    #[test]
    fn enrichment_update_prefers_headline() {
        let update = EnrichmentUpdate::from_profile(json!({
            "headline": "VP Engineering",
            "job_title": "Engineer",
            "company": "Acme",
            "location": "Berlin",
            "industry": "Software"
        }));
        assert_eq!(update.job_title.as_deref(), Some("VP Engineering"));
        assert_eq!(update.company.as_deref(), Some("Acme"));

        let fallback = EnrichmentUpdate::from_profile(json!({ "job_title": "Engineer" }));
        assert_eq!(fallback.job_title.as_deref(), Some("Engineer"));
        assert!(fallback.company.is_none());
    }
}
