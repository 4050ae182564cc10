use sqlx::{postgres::PgPoolOptions, PgPool};

pub struct Database {
    pub pool: PgPool,
}

/// DDL run at startup. Each statement is idempotent so the service can boot
/// against a fresh or an existing database.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS linkedin_posts (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        post_url TEXT NOT NULL UNIQUE,
        post_id TEXT NOT NULL,
        author_name TEXT,
        author_profile_url TEXT,
        content TEXT,
        posted_at TIMESTAMPTZ,
        total_likes INTEGER NOT NULL DEFAULT 0,
        total_comments INTEGER NOT NULL DEFAULT 0,
        total_shares INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ,
        last_scraped_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leads (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        post_id UUID NOT NULL REFERENCES linkedin_posts(id) ON DELETE CASCADE,
        profile_url TEXT NOT NULL,
        full_name TEXT,
        headline TEXT,
        profile_picture_url TEXT,
        company TEXT,
        job_title TEXT,
        location TEXT,
        industry TEXT,
        email TEXT,
        phone TEXT,
        interaction_type TEXT NOT NULL,
        liked BOOLEAN NOT NULL DEFAULT FALSE,
        commented BOOLEAN NOT NULL DEFAULT FALSE,
        comment_count INTEGER NOT NULL DEFAULT 0,
        enriched BOOLEAN NOT NULL DEFAULT FALSE,
        enrichment_data JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (post_id, profile_url)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        post_id UUID NOT NULL REFERENCES linkedin_posts(id) ON DELETE CASCADE,
        lead_id UUID REFERENCES leads(id) ON DELETE CASCADE,
        comment_id TEXT NOT NULL UNIQUE,
        content TEXT,
        likes_count INTEGER NOT NULL DEFAULT 0,
        replies_count INTEGER NOT NULL DEFAULT 0,
        posted_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS unipile_accounts (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        account_id TEXT NOT NULL UNIQUE,
        provider TEXT NOT NULL DEFAULT 'LINKEDIN',
        username TEXT,
        status TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        last_used_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workspaces (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_leads_post_id ON leads(post_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id)",
    "CREATE INDEX IF NOT EXISTS idx_posts_status ON linkedin_posts(status)",
];

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Creates the tables when missing.
    ///
    /// Sequential statements instead of one batched script keeps failures
    /// attributable to a single statement.
    pub async fn init_schema(&self) -> anyhow::Result<()> {
        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        tracing::info!("Database schema ready");
        Ok(())
    }
}
