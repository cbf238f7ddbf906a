use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub spec: SpecConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Where the specification documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecConfig {
    pub root_path: PathBuf,
    pub mounts: Vec<MountConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_request_size_bytes: usize,
}

/// Where callers present their token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token_header: String,
    pub token_query_param: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_header: "x-hr-authtoken".to_string(),
            token_query_param: "auth_token".to_string(),
        }
    }
}

impl Default for SpecConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("../tools/db2api/api.json"),
            mounts: vec![
                MountConfig {
                    name: "sde".to_string(),
                    path: PathBuf::from("../tools/db2api/evesde.json"),
                },
                MountConfig {
                    name: "esi".to_string(),
                    path: PathBuf::from("../tools/db2api/esi.json"),
                },
            ],
        }
    }
}

impl MountConfig {
    /// Parse a `name=path,name=path` list; malformed entries are skipped.
    pub fn parse_list(raw: &str) -> Vec<MountConfig> {
        raw.split(',')
            .filter_map(|entry| {
                let (name, path) = entry.split_once('=')?;
                let (name, path) = (name.trim(), path.trim());
                if name.is_empty() || path.is_empty() {
                    return None;
                }
                Some(MountConfig {
                    name: name.to_string(),
                    path: PathBuf::from(path),
                })
            })
            .collect()
    }
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
        // Spec document overrides
        if let Ok(v) = env::var("SPEC_ROOT") {
            self.spec.root_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("SPEC_MOUNTS") {
            self.spec.mounts = MountConfig::parse_list(&v);
        }

        // API overrides
        if let Some(v) = env::var("API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_CORS_ORIGINS") {
            self.api.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_TOKEN_HEADER") {
            self.auth.token_header = v.to_ascii_lowercase();
        }
        if let Ok(v) = env::var("AUTH_TOKEN_QUERY_PARAM") {
            self.auth.token_query_param = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs = v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            spec: SpecConfig::default(),
            api: ApiConfig {
                port: 3000,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            auth: AuthConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            spec: SpecConfig::default(),
            api: ApiConfig {
                port: 3000,
                cors_origins: vec!["https://staging.example.com".to_string()],
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            auth: AuthConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout_secs: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            spec: SpecConfig::default(),
            api: ApiConfig {
                port: 3000,
                cors_origins: vec!["https://app.example.com".to_string()],
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            auth: AuthConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout_secs: 5,
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
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.auth.token_header, "x-hr-authtoken");
        assert_eq!(config.auth.token_query_param, "auth_token");
        assert_eq!(config.spec.mounts.len(), 2);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.api.max_request_size_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn parses_mount_lists() {
        let mounts = MountConfig::parse_list("sde = specs/sde.json, bogus, esi=specs/esi.yaml,=x");
        assert_eq!(
            mounts,
            vec![
                MountConfig { name: "sde".to_string(), path: PathBuf::from("specs/sde.json") },
                MountConfig { name: "esi".to_string(), path: PathBuf::from("specs/esi.yaml") },
            ]
        );
    }
}
