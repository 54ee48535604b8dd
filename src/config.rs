use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown STORE_BACKEND '{}', expected postgres or memory", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_db_connections: u32,
    pub app_url: String,
    pub jwt_secret: String,
    /// Token lifetime in minutes
    pub jwt_maxage: i64,
    pub port: u16,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    /// Pending withdrawals older than this are settled by the background job
    pub withdrawal_settlement_secs: u64,
}

impl Config {
    /// Reads configuration from the environment. Call `dotenv().ok()` first
    /// to pick up a local `.env` file.
    pub fn init() -> Result<Config, String> {
        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => value.parse::<StoreBackend>()?,
            Err(_) => StoreBackend::Postgres,
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err("DATABASE_URL must be set when STORE_BACKEND is postgres".to_string());
        }

        let jwt_secret = std::env::var("JWT_SECRET_KEY")
            .map_err(|_| "JWT_SECRET_KEY must be set".to_string())?;

        let jwt_maxage = parse_or("JWT_MAXAGE", 60i64)?;
        let port = parse_or("PORT", 8000u16)?;
        let max_db_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10u32)?;
        let withdrawal_settlement_secs = parse_or("WITHDRAWAL_SETTLEMENT_SECS", 3600u64)?;

        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8081".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            store_backend,
            database_url,
            max_db_connections,
            app_url,
            jwt_secret,
            jwt_maxage,
            port,
            log_level,
            cors_origins,
            withdrawal_settlement_secs,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}
