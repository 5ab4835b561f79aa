use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
    /// Largest accepted asset upload after base64 decoding.
    pub max_asset_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Timing knobs for the client-side session layer: the focus-refresh
/// coordinator and the session-expired notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minimum gap between two background session refreshes.
    pub refresh_min_interval_secs: u64,
    /// Upper bound on the revalidation and profile-sync calls made by a
    /// background refresh. None disables the bound.
    pub refresh_call_timeout_secs: Option<u64>,
    /// How long the "session expired" notice stays visible.
    pub expiry_notice_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for the asset object store.
    pub asset_root: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_MAX_ASSET_SIZE_BYTES") {
            self.api.max_asset_size_bytes = v.parse().unwrap_or(self.api.max_asset_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("HUB_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_REFRESH_MIN_INTERVAL_SECS") {
            self.session.refresh_min_interval_secs =
                v.parse().unwrap_or(self.session.refresh_min_interval_secs);
        }
        if let Ok(v) = env::var("SESSION_REFRESH_CALL_TIMEOUT_SECS") {
            self.session.refresh_call_timeout_secs = v.parse().ok();
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_NOTICE_SECS") {
            self.session.expiry_notice_secs = v.parse().unwrap_or(self.session.expiry_notice_secs);
        }

        // Storage overrides
        if let Ok(v) = env::var("HUB_ASSET_ROOT") {
            self.storage.asset_root = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 25 * 1024 * 1024, // 25MB, base64-encoded uploads included
                max_asset_size_bytes: 15 * 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                jwt_secret: "designhub-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            session: SessionConfig {
                refresh_min_interval_secs: 30,
                refresh_call_timeout_secs: Some(10),
                expiry_notice_secs: 5,
            },
            storage: StorageConfig {
                asset_root: "./data/assets".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 25 * 1024 * 1024,
                max_asset_size_bytes: 15 * 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.designhub.example".to_string()],
                jwt_secret: String::new(), // must come from HUB_JWT_SECRET
                jwt_expiry_hours: 24,
            },
            session: SessionConfig {
                refresh_min_interval_secs: 30,
                refresh_call_timeout_secs: Some(10),
                expiry_notice_secs: 5,
            },
            storage: StorageConfig {
                asset_root: "/var/lib/designhub/assets".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 25 * 1024 * 1024,
                max_asset_size_bytes: 15 * 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://portal.designhub.example".to_string()],
                jwt_secret: String::new(), // must come from HUB_JWT_SECRET
                jwt_expiry_hours: 4,
            },
            session: SessionConfig {
                refresh_min_interval_secs: 30,
                refresh_call_timeout_secs: Some(10),
                expiry_notice_secs: 5,
            },
            storage: StorageConfig {
                asset_root: "/var/lib/designhub/assets".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.session.refresh_min_interval_secs, 30);
        assert_eq!(config.session.expiry_notice_secs, 5);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert!(!config.api.enable_request_logging);
    }
}
