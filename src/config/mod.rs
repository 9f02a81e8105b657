use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Connection settings for the hosted table store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: Option<String>,
    /// Service credential, sent as both `apikey` and bearer token
    #[serde(skip_serializing)]
    pub service_key: Option<String>,
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Data endpoints are only served when both URL and credential are present
    pub fn is_configured(&self) -> bool {
        matches!((&self.url, &self.service_key), (Some(u), Some(k)) if !u.is_empty() && !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub audit_default_limit: usize,
    pub audit_max_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub enable_audit_logging: bool,
    pub token_expiry_hours: u64,
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
        // Store
        if let Ok(v) = env::var("SUPABASE_URL") {
            self.store.url = Some(v.trim().to_string()).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("SUPABASE_KEY") {
            self.store.service_key = Some(v.trim().to_string()).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = v.parse().unwrap_or(self.store.timeout_secs);
        }

        // API
        if let Some(v) = env::var("PORTAL_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_MAX_UPLOAD_BYTES") {
            self.api.max_upload_bytes = v.parse().unwrap_or(self.api.max_upload_bytes);
        }
        if let Ok(v) = env::var("AUDIT_DEFAULT_LIMIT") {
            self.api.audit_default_limit = v.parse().unwrap_or(self.api.audit_default_limit);
        }

        // Security
        if let Ok(v) = env::var("SUPABASE_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = v.parse().unwrap_or(self.security.enable_audit_logging);
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_EXPIRY_HOURS") {
            self.security.token_expiry_hours = v.parse().unwrap_or(self.security.token_expiry_hours);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig {
                url: None,
                service_key: None,
                timeout_secs: 30,
            },
            api: ApiConfig {
                port: 8000,
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
                audit_default_limit: 100,
                audit_max_limit: 1000,
            },
            security: SecurityConfig {
                jwt_secret: "placeholder-secret".to_string(),
                cors_origins: vec!["*".to_string()],
                enable_audit_logging: true,
                token_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            store: StoreConfig {
                url: None,
                service_key: None,
                timeout_secs: 20,
            },
            api: ApiConfig {
                port: 8000,
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
                audit_default_limit: 100,
                audit_max_limit: 1000,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                cors_origins: vec!["*".to_string()],
                enable_audit_logging: true,
                token_expiry_hours: 24,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            store: StoreConfig {
                url: None,
                service_key: None,
                timeout_secs: 10,
            },
            api: ApiConfig {
                port: 8000,
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
                audit_default_limit: 100,
                audit_max_limit: 1000,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                cors_origins: Vec::new(),
                enable_audit_logging: true,
                token_expiry_hours: 4,
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

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
