use dotenv::dotenv;
use std::env;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters-long";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub jwt_secret: String,
    pub openrouter_api_key: String,
    pub openrouter_base_url: String,
    pub chat_model: String,
    pub vision_model: String,
    pub retrieval_url: String,
    pub retrieval_top_k: usize,
    pub retrieval_min_score: f32,
    pub storage_bucket: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub app_env: String,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let supabase_url = required("SUPABASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let supabase_service_key = required("SUPABASE_SERVICE_KEY")?;
        let openrouter_api_key = required("OPENROUTER_API_KEY")?;

        let jwt_secret = env::var("SUPABASE_JWT_SECRET").unwrap_or_else(|_| {
            warn!("SUPABASE_JWT_SECRET not set, using default (not secure for production!)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let openrouter_base_url = env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string())
            .trim_end_matches('/')
            .to_string();

        let chat_model =
            env::var("CHAT_MODEL").unwrap_or_else(|_| "anthropic/claude-sonnet-4".to_string());
        let vision_model = env::var("VISION_MODEL").unwrap_or_else(|_| chat_model.clone());

        let retrieval_url = env::var("RETRIEVAL_URL")
            .unwrap_or_else(|_| format!("{}/functions/v1/retrieve-context", supabase_url));

        let retrieval_top_k = parse_or("RETRIEVAL_TOP_K", 5usize, "must be a positive number")?;
        let retrieval_min_score =
            parse_or("RETRIEVAL_MIN_SCORE", 0.5f32, "must be a number between 0 and 1")?;

        let storage_bucket =
            env::var("STORAGE_BUCKET").unwrap_or_else(|_| "tax-documents".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = parse_or(
            "SERVER_PORT",
            3000u16,
            "must be a number between 0-65535",
        )?;
        let max_connections = parse_or("MAX_DB_CONNECTIONS", 10u32, "must be a positive number")?;
        let acquire_timeout_secs =
            parse_or("DB_ACQUIRE_TIMEOUT_SECS", 5u64, "must be a positive number")?;

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            database_url,
            supabase_url,
            supabase_service_key,
            jwt_secret,
            openrouter_api_key,
            openrouter_base_url,
            chat_model,
            vision_model,
            retrieval_url,
            retrieval_top_k,
            retrieval_min_score,
            storage_bucket,
            server_host,
            server_port,
            max_connections,
            acquire_timeout_secs,
            app_env,
        })
    }

    /// Stampa la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!("Server configuration:");
        info!("  Environment: {}", self.app_env);
        info!("  Server address: {}:{}", self.server_host, self.server_port);
        info!("  Database: {}", Self::mask_url(&self.database_url));
        info!("  Max DB connections: {}", self.max_connections);
        info!("  Supabase: {}", self.supabase_url);
        info!("  Storage bucket: {}", self.storage_bucket);
        info!("  LLM endpoint: {}", self.openrouter_base_url);
        info!("  Chat model: {} | Vision model: {}", self.chat_model, self.vision_model);
        info!(
            "  Retrieval: {} (top_k={}, min_score={})",
            self.retrieval_url, self.retrieval_top_k, self.retrieval_min_score
        );
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("  JWT secret: USING DEFAULT (INSECURE!)");
        } else {
            info!("  JWT secret: custom secret configured");
        }
    }

    /// Maschera l'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        "***".to_string()
    }
}

fn required(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("{} must be set in .env file", key))
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T, hint: &str) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("Invalid {}: {}", key, hint)),
        Err(_) => Ok(default),
    }
}
