use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::relay::RefreshPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub relay: RelayConfig,
    pub session: SessionConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Banking/customer API, target of `/api/proxy/*`
    pub banking_base_url: String,
    /// Car inventory API, target of the `/api/crud/*` helpers
    pub car_base_url: String,
    pub request_timeout_secs: Option<u64>,
    pub refresh_policy: RefreshPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub access_token_cookie: String,
    pub refresh_token_cookie: String,
    pub identity_refresh_url: Option<String>,
    pub identity_logout_url: Option<String>,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

const DEFAULT_BANKING_BASE_URL: &str = "http://localhost:8080/api/v1";
const DEFAULT_CAR_BASE_URL: &str = "https://car-nextjs-api.cheatdev.online";

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
        // Relay overrides
        if let Ok(v) = env::var("BASE_URL_MBBANKING_API") {
            self.relay.banking_base_url = v;
        }
        if let Ok(v) = env::var("CAR_BASE_URL") {
            self.relay.car_base_url = v;
        }
        if let Ok(v) = env::var("RELAY_REQUEST_TIMEOUT_SECS") {
            self.relay.request_timeout_secs = v.parse().ok();
        }
        if let Ok(v) = env::var("RELAY_REFRESH_POLICY") {
            self.relay.refresh_policy = v.parse().unwrap_or(self.relay.refresh_policy);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_ACCESS_TOKEN_COOKIE") {
            self.session.access_token_cookie = v;
        }
        if let Ok(v) = env::var("SESSION_REFRESH_TOKEN_COOKIE") {
            self.session.refresh_token_cookie = v;
        }
        if let Ok(v) = env::var("IDENTITY_REFRESH_URL") {
            self.session.identity_refresh_url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("IDENTITY_LOGOUT_URL") {
            self.session.identity_logout_url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("SESSION_SECURE_COOKIES") {
            self.session.secure_cookies = v.parse().unwrap_or(self.session.secure_cookies);
        }

        // API overrides
        if let Some(port) = env::var("GATEWAY_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            relay: RelayConfig {
                banking_base_url: DEFAULT_BANKING_BASE_URL.to_string(),
                car_base_url: DEFAULT_CAR_BASE_URL.to_string(),
                request_timeout_secs: None,
                refresh_policy: RefreshPolicy::Independent,
            },
            session: SessionConfig {
                access_token_cookie: "accessToken".to_string(),
                refresh_token_cookie: "refreshToken".to_string(),
                identity_refresh_url: None,
                identity_logout_url: None,
                secure_cookies: false,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            relay: RelayConfig {
                banking_base_url: DEFAULT_BANKING_BASE_URL.to_string(),
                car_base_url: DEFAULT_CAR_BASE_URL.to_string(),
                request_timeout_secs: None,
                refresh_policy: RefreshPolicy::Independent,
            },
            session: SessionConfig {
                access_token_cookie: "accessToken".to_string(),
                refresh_token_cookie: "refreshToken".to_string(),
                identity_refresh_url: None,
                identity_logout_url: None,
                secure_cookies: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            relay: RelayConfig {
                banking_base_url: DEFAULT_BANKING_BASE_URL.to_string(),
                car_base_url: DEFAULT_CAR_BASE_URL.to_string(),
                request_timeout_secs: None,
                refresh_policy: RefreshPolicy::Independent,
            },
            session: SessionConfig {
                access_token_cookie: "accessToken".to_string(),
                refresh_token_cookie: "refreshToken".to_string(),
                identity_refresh_url: None,
                identity_logout_url: None,
                secure_cookies: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
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
