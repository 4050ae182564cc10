use std::env;
use uuid::Uuid;

use linkedin_leads_api::db::Database;
use linkedin_leads_api::models::{LeadDraft, RawComment};
use linkedin_leads_api::storage::LeadStore;

/// Integration smoke test for the upsert/dedup/cascade invariants.
/// Marked ignored to avoid running against production by accident; set
/// TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn upsert_dedup_and_cascade_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url).await?;
    db.init_schema().await?;
    let store = LeadStore::new(db.pool.clone());

    // Unique URL to avoid conflicts on repeated runs.
    let post_url = format!(
        "https://www.linkedin.com/posts/it_activity-{}-abcd",
        Uuid::new_v4().simple()
    );
    let post = store
        .insert_post(&post_url, "7100000000000000000")
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let profile_url = format!("https://linkedin.com/in/it-{}", Uuid::new_v4().simple());
    let draft = LeadDraft {
        full_name: Some("Test Person".to_string()),
        headline: Some("Integration tester".to_string()),
        profile_picture_url: None,
        liked: true,
        commented: true,
        comment_count: 2,
    };

    let comment = RawComment {
        id: Some(format!("it_comment_{}", Uuid::new_v4().simple())),
        content: Some("hello".to_string()),
        ..Default::default()
    };
    let comment_id = comment.id.clone().unwrap();

    let mut tx = store.pool().begin().await?;
    let first = store
        .upsert_lead(&mut tx, post.id, &profile_url, &draft)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let second = store
        .upsert_lead(&mut tx, post.id, &profile_url, &draft)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(first, second, "conflicting upsert must update, not insert");

    let inserted = store
        .insert_comment(&mut tx, post.id, &comment_id, &comment)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(inserted);
    let replayed = store
        .insert_comment(&mut tx, post.id, &comment_id, &comment)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(!replayed, "replayed comment id must not insert a second row");

    store
        .complete_post(&mut tx, post.id, 1, 2)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tx.commit().await?;

    let leads = store
        .all_leads_for_post(post.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].interaction_type, "both");
    assert_eq!(leads[0].comment_count, 2);

    let deleted = store
        .delete_post(post.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(deleted);

    let leads_after = store
        .all_leads_for_post(post.id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(leads_after.is_empty(), "delete must cascade to leads");

    Ok(())
}
