use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub unipile_api_key: String,
    pub unipile_base_url: String,
    /// When true, the mock Unipile client is injected instead of the real one.
    pub use_mock_unipile: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let use_mock_unipile = std::env::var("USE_MOCK_UNIPILE")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            unipile_api_key: match std::env::var("UNIPILE_API_KEY") {
                Ok(key) if !key.trim().is_empty() => key,
                // The mock client never authenticates, so the key may be absent.
                _ if use_mock_unipile => String::new(),
                _ => anyhow::bail!("UNIPILE_API_KEY environment variable required"),
            },
            unipile_base_url: std::env::var("UNIPILE_BASE_URL")
                .unwrap_or_else(|_| "https://api.unipile.com/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            use_mock_unipile,
        };

        if !config.unipile_base_url.starts_with("http://")
            && !config.unipile_base_url.starts_with("https://")
        {
            anyhow::bail!("UNIPILE_BASE_URL must start with http:// or https://");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Unipile Base URL: {}", config.unipile_base_url);
        if config.use_mock_unipile {
            tracing::info!("Mock Unipile client enabled (USE_MOCK_UNIPILE)");
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
