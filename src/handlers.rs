use crate::config::Config;
use crate::errors::AppError;
use crate::export;
use crate::extractor::LeadExtractor;
use crate::models::{ExtractRequest, Lead, LeadQuery, Post, PostQuery, StatsResponse};
use crate::provider::ProviderClient;
use crate::storage::LeadStore;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Scraping provider client, real or mock depending on configuration.
    pub provider: Arc<dyn ProviderClient>,
}

impl AppState {
    fn store(&self) -> LeadStore {
        LeadStore::new(self.db.clone())
    }

    fn extractor(&self) -> LeadExtractor {
        LeadExtractor::new(self.db.clone(), self.provider.clone())
    }
}

/// First usable account id from the provider, if any.
async fn first_account_id(provider: &dyn ProviderClient) -> Result<Option<String>, AppError> {
    let accounts = provider.list_accounts().await?;
    Ok(accounts.into_iter().find_map(|account| account.id))
}

/// GET /
///
/// Service banner, doubles as a liveness probe for humans.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "LinkedIn Leads Extractor API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "linkedin-leads-api",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// GET /api/accounts
///
/// Lists connected provider accounts and records new ones locally.
///
/// # Returns
///
/// * `Result<Json<serde_json::Value>, AppError>` - `{"accounts": [...]}` or an error.
pub async fn get_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let accounts = state.provider.list_accounts().await?;

    let store = state.store();
    for account in &accounts {
        store.upsert_account(account).await?;
    }

    Ok(Json(json!({ "accounts": accounts })))
}

/// POST /api/posts/extract
///
/// Extracts leads from a LinkedIn post URL: scrapes reactions and comments,
/// reconciles them into leads and persists everything. With `enrich: true`
/// a detached background task enriches the new leads afterwards.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - post_url, optional account_id, enrich flag.
///
/// # Returns
///
/// * `Result<Json<serde_json::Value>, AppError>` - Extraction summary or an error.
pub async fn extract_post(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExtractRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!("POST /api/posts/extract - url: {}", payload.post_url);

    let account_id = match payload.account_id {
        Some(id) => id,
        None => first_account_id(state.provider.as_ref())
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(
                    "No Unipile accounts available. Please connect a LinkedIn account first."
                        .to_string(),
                )
            })?,
    };

    let result = state
        .extractor()
        .extract_from_post(&payload.post_url, &account_id)
        .await?;

    if payload.enrich {
        let background = state.extractor();
        let post_id = result.post_id;
        tokio::spawn(async move {
            if let Err(err) = background.enrich_post_leads(post_id, &account_id).await {
                tracing::error!("Background enrichment failed for post {}: {}", post_id, err);
            }
        });
    }

    Ok(Json(json!({
        "message": "Leads extracted successfully",
        "data": result,
    })))
}

/// GET /api/posts
///
/// Lists analyzed posts, newest first, optionally filtered by status.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state
        .store()
        .list_posts(params.status.as_deref(), params.skip, params.limit)
        .await?;

    Ok(Json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, AppError> {
    let post = state
        .store()
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// GET /api/posts/{id}/leads
///
/// Lists leads for a post, optionally filtered by interaction type
/// (like, comment, both).
pub async fn get_post_leads(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<LeadQuery>,
) -> Result<Json<Vec<Lead>>, AppError> {
    let leads = state
        .store()
        .leads_for_post(
            id,
            params.interaction_type.as_deref(),
            params.skip,
            params.limit,
        )
        .await?;

    Ok(Json(leads))
}

/// POST /api/posts/{id}/enrich
///
/// Starts background enrichment for every unenriched lead of a post.
/// Fire-and-forget: the task runs with its own unit of work and the
/// response does not wait for it.
pub async fn enrich_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .store()
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let account_id = first_account_id(state.provider.as_ref())
        .await?
        .ok_or_else(|| AppError::BadRequest("No Unipile accounts available".to_string()))?;

    let extractor = state.extractor();
    tokio::spawn(async move {
        if let Err(err) = extractor.enrich_post_leads(id, &account_id).await {
            tracing::error!("Background enrichment failed for post {}: {}", id, err);
        }
    });

    Ok(Json(json!({ "message": "Enrichment started in background" })))
}

/// GET /api/posts/{id}/export/csv
///
/// Downloads a post's leads as a CSV attachment.
pub async fn export_leads_csv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let leads = state.store().all_leads_for_post(id).await?;
    if leads.is_empty() {
        return Err(AppError::NotFound("No leads found for this post".to_string()));
    }

    let body = export::leads_to_csv(&leads)?;
    let disposition = format!("attachment; filename=\"leads_post_{}.csv\"", id);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/posts/{id}/export/excel
///
/// Downloads a post's leads as an xlsx attachment.
pub async fn export_leads_excel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let leads = state.store().all_leads_for_post(id).await?;
    if leads.is_empty() {
        return Err(AppError::NotFound("No leads found for this post".to_string()));
    }

    let body = export::leads_to_xlsx(&leads)?;
    let disposition = format!("attachment; filename=\"leads_post_{}.xlsx\"", id);

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.store().stats().await?;
    Ok(Json(stats))
}

/// DELETE /api/posts/{id}
///
/// Deletes a post; its leads and comments cascade with it.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.store().delete_post(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    tracing::info!("Deleted post {} and its leads/comments", id);
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
