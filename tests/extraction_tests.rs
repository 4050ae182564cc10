/// End-to-end reconciliation tests over the mock provider client
/// The mock returns the same fixtures the real provider would, so these
/// cover the full fetch-then-merge path without a database
use linkedin_leads_api::extractor::merge_interactions;
use linkedin_leads_api::models::EnrichmentUpdate;
use linkedin_leads_api::provider::{MockUnipileClient, ProviderClient};

#[tokio::test]
async fn mock_account_is_listed() {
    let client = MockUnipileClient::new();
    let accounts = client.list_accounts().await.unwrap();

    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id.as_deref(), Some("mock_account_123"));
    assert_eq!(accounts[0].status.as_deref(), Some("VALID"));
}

#[tokio::test]
async fn mock_snapshot_reconciles_to_three_leads() {
    let client = MockUnipileClient::new();
    let reactions = client
        .post_reactions("mock_account_123", "post_1")
        .await
        .unwrap();
    let comments = client
        .post_comments("mock_account_123", "post_1")
        .await
        .unwrap();

    let drafts = merge_interactions(&reactions, &comments);
    assert_eq!(drafts.len(), 3);

    let john = &drafts["https://linkedin.com/in/johndoe"];
    assert_eq!(john.interaction_type(), "like");
    assert_eq!(john.comment_count, 0);
    assert_eq!(john.full_name.as_deref(), Some("John Doe"));

    let alice = &drafts["https://linkedin.com/in/alicejohnson"];
    assert_eq!(alice.interaction_type(), "comment");
    assert_eq!(alice.comment_count, 1);
    assert!(!alice.liked);
}

#[tokio::test]
async fn rerunning_against_unchanged_snapshot_is_idempotent() {
    let client = MockUnipileClient::new();
    let reactions = client
        .post_reactions("mock_account_123", "post_1")
        .await
        .unwrap();
    let comments = client
        .post_comments("mock_account_123", "post_1")
        .await
        .unwrap();

    let first = merge_interactions(&reactions, &comments);
    let second = merge_interactions(&reactions, &comments);

    assert_eq!(first, second);
}

#[tokio::test]
async fn mock_profile_feeds_enrichment_update() {
    let client = MockUnipileClient::new();
    let profile = client
        .profile_details("mock_account_123", "https://linkedin.com/in/johndoe")
        .await
        .unwrap();

    let update = EnrichmentUpdate::from_profile(profile);
    assert_eq!(update.company.as_deref(), Some("TechCorp"));
    assert_eq!(update.job_title.as_deref(), Some("CEO at TechCorp"));
    assert_eq!(update.location.as_deref(), Some("San Francisco, CA"));
    assert_eq!(update.industry.as_deref(), Some("Technology"));
    assert_eq!(
        update.payload.get("profile_url").and_then(|v| v.as_str()),
        Some("https://linkedin.com/in/johndoe")
    );
}
