use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub store: StoreKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub interval_secs: u64,
    pub min_price: u32, // whole USD
    pub max_price: u32, // whole USD
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub api_url: String,
    pub poll_interval_secs: u64,
    pub window_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub generator: GeneratorConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/crypto_db".to_string(),
                max_connections: 5,
                store: StoreKind::Postgres,
            },
            generator: GeneratorConfig {
                interval_secs: 10,
                min_price: 100,
                max_price: 50_000,
            },
            dashboard: DashboardConfig {
                api_url: "http://localhost:5000/api/prices".to_string(),
                poll_interval_secs: 10,
                window_size: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl GeneratorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl DashboardConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl AppConfig {
    /// Load configuration from `.env` and environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::default();

        if let Ok(port) = env::var("PORT") {
            config.server.port = port.trim().parse()
                .map_err(|_| AppError::Configuration(format!("Invalid PORT: {}", port)))?;
        }

        if let Ok(bind_addr) = env::var("BIND_ADDR") {
            config.server.bind_addr = bind_addr.trim().to_string();
        }

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database.url = url.trim().to_string();
        }

        if let Ok(max_connections) = env::var("DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections = max_connections.trim().parse()
                .map_err(|_| AppError::Configuration("Invalid DATABASE_MAX_CONNECTIONS".to_string()))?;
        }

        if let Ok(store) = env::var("PRICE_STORE") {
            config.database.store = match store.trim().to_lowercase().as_str() {
                "postgres" => StoreKind::Postgres,
                "memory" => StoreKind::Memory,
                other => {
                    return Err(AppError::Configuration(format!("Unsupported PRICE_STORE: {}", other)))
                }
            };
        }

        if let Ok(api_url) = env::var("API_URL") {
            config.dashboard.api_url = api_url.trim().trim_end_matches('/').to_string();
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.logging.level = log_level.trim().to_lowercase();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.server.port == 0 {
            return Err(AppError::Configuration("Port must be greater than 0".to_string()));
        }

        if self.database.url.is_empty() {
            return Err(AppError::Configuration("Database url cannot be empty".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(AppError::Configuration("Max connections must be greater than 0".to_string()));
        }

        if self.generator.interval_secs == 0 || self.dashboard.poll_interval_secs == 0 {
            return Err(AppError::Configuration("Intervals must be greater than 0".to_string()));
        }

        if self.dashboard.window_size == 0 {
            return Err(AppError::Configuration("Window size must be greater than 0".to_string()));
        }

        if self.generator.min_price > self.generator.max_price {
            return Err(AppError::Configuration("Min price cannot exceed max price".to_string()));
        }

        if self.dashboard.api_url.is_empty() {
            return Err(AppError::Configuration("API url cannot be empty".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(AppError::Configuration(format!("Invalid log level: {}", self.logging.level)));
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }
}
