//! Configuration management for Sign-Bridge
//!
//! All configurable parameters in one place with environment variable overrides.
//! Sensible defaults for a local recording session; override in deployment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::constants::{
    DEFAULT_BACKUP_FILE, DEFAULT_COLLECTION_NAME, DEFAULT_MATCH_THRESHOLD, DEFAULT_SEARCH_DEPTH,
    DEFAULT_VECTOR_SIZE, MAX_SEARCH_DEPTH,
};
use crate::gesture::StoreConfig;

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods (empty = allow all)
    pub allowed_methods: Vec<String>,
    /// Allowed headers (empty = allow all)
    pub allowed_headers: Vec<String>,
    /// Whether to allow credentials (only honoured with explicit origins)
    pub allow_credentials: bool,
    /// Max age for preflight cache (seconds)
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            // The capture client is usually served from another local port
            allowed_origins: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            allow_credentials: false,
            max_age_seconds: 86400, // 24 hours
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

impl CorsConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = env::var("SIGNBRIDGE_CORS_ORIGINS") {
            config.allowed_origins = parse_list(&origins);
        }

        if let Ok(methods) = env::var("SIGNBRIDGE_CORS_METHODS") {
            config.allowed_methods = parse_list(&methods)
                .into_iter()
                .map(|m| m.to_uppercase())
                .collect();
        }

        if let Ok(headers) = env::var("SIGNBRIDGE_CORS_HEADERS") {
            config.allowed_headers = parse_list(&headers);
        }

        if let Ok(val) = env::var("SIGNBRIDGE_CORS_CREDENTIALS") {
            config.allow_credentials = parse_bool(&val);
        }

        if let Ok(val) = env::var("SIGNBRIDGE_CORS_MAX_AGE") {
            if let Ok(n) = val.parse() {
                config.max_age_seconds = n;
            }
        }

        config
    }

    /// Check if any origin restrictions are configured
    pub fn is_restricted(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    /// Convert to tower-http CorsLayer
    pub fn to_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let mut layer = CorsLayer::new();

        if self.allowed_origins.is_empty() {
            layer = layer.allow_origin(Any);
        } else {
            let mut valid_origins = Vec::new();
            for origin_str in &self.allowed_origins {
                match origin_str.parse::<axum::http::HeaderValue>() {
                    Ok(origin) => valid_origins.push(origin),
                    Err(_) => tracing::warn!("CORS: Invalid origin '{}' - skipping", origin_str),
                }
            }
            if valid_origins.is_empty() {
                // Misconfigured origins deny everything rather than allowing all
                tracing::error!(
                    "CORS: All {} configured origin(s) failed to parse. \
                     Rejecting all cross-origin requests. Fix SIGNBRIDGE_CORS_ORIGINS.",
                    self.allowed_origins.len()
                );
            }
            layer = layer.allow_origin(AllowOrigin::list(valid_origins));
        }

        let methods: Vec<axum::http::Method> = self
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        layer = if methods.is_empty() {
            layer.allow_methods(Any)
        } else {
            layer.allow_methods(methods)
        };

        let headers: Vec<axum::http::HeaderName> = self
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        layer = if headers.is_empty() {
            layer.allow_headers(Any)
        } else {
            layer.allow_headers(headers)
        };

        // tower-http rejects credentials combined with wildcard origins
        if self.allow_credentials {
            if self.is_restricted() && !self.allowed_methods.is_empty() && !self.allowed_headers.is_empty() {
                layer = layer.allow_credentials(true);
            } else {
                tracing::warn!(
                    "CORS: credentials require explicit origins, methods and headers - ignoring"
                );
            }
        }

        layer.max_age(Duration::from_secs(self.max_age_seconds))
    }
}

/// Server configuration loaded from environment with defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address (default: 127.0.0.1)
    pub host: String,

    /// Server port (default: 8000)
    pub port: u16,

    /// Required vector length, `VECTOR_SIZE` (default: 1890 = 30 × 21 × 3)
    pub vector_size: usize,

    /// Backup artifact path (default: ./qdrant_backup.json)
    pub backup_path: PathBuf,

    /// Live collection name (default: sign_language_gestures)
    pub collection: String,

    /// Neighbours inspected per prediction (default: 3)
    pub search_depth: usize,

    /// Minimum score for a prediction to name a label (default: 0.0)
    pub match_threshold: f32,

    /// Maximum concurrent requests (default: 64)
    pub max_concurrent_requests: usize,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_secs: u64,

    /// Whether running in production mode
    pub is_production: bool,

    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            vector_size: DEFAULT_VECTOR_SIZE,
            backup_path: PathBuf::from(DEFAULT_BACKUP_FILE),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            search_depth: DEFAULT_SEARCH_DEPTH,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            max_concurrent_requests: 64,
            request_timeout_secs: 30,
            is_production: false,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    #[allow(clippy::field_reassign_with_default)] // Environment overrides require mutable config
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.is_production = env::var("SIGNBRIDGE_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        if let Ok(val) = env::var("SIGNBRIDGE_HOST") {
            config.host = val;
        }

        if let Ok(val) = env::var("SIGNBRIDGE_PORT") {
            if let Ok(port) = val.parse() {
                config.port = port;
            }
        }

        // Zero is not a usable size; keep the default rather than fail later
        if let Ok(val) = env::var("SIGNBRIDGE_VECTOR_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.vector_size = n,
                _ => tracing::warn!("Ignoring invalid SIGNBRIDGE_VECTOR_SIZE '{}'", val),
            }
        }

        if let Ok(val) = env::var("SIGNBRIDGE_BACKUP_PATH") {
            config.backup_path = PathBuf::from(val);
        }

        if let Ok(val) = env::var("SIGNBRIDGE_COLLECTION") {
            if !val.trim().is_empty() {
                config.collection = val.trim().to_string();
            }
        }

        if let Ok(val) = env::var("SIGNBRIDGE_SEARCH_DEPTH") {
            if let Ok(n) = val.parse::<usize>() {
                config.search_depth = n.clamp(1, MAX_SEARCH_DEPTH);
            }
        }

        if let Ok(val) = env::var("SIGNBRIDGE_MATCH_THRESHOLD") {
            if let Ok(n) = val.parse::<f32>() {
                if n.is_finite() {
                    config.match_threshold = n.clamp(-1.0, 1.0);
                }
            }
        }

        if let Ok(val) = env::var("SIGNBRIDGE_MAX_CONCURRENT") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_concurrent_requests = n.max(1);
            }
        }

        if let Ok(val) = env::var("SIGNBRIDGE_REQUEST_TIMEOUT") {
            if let Ok(n) = val.parse() {
                config.request_timeout_secs = n;
            }
        }

        config.cors = CorsConfig::from_env();

        if config.is_production && !config.cors.is_restricted() {
            tracing::warn!(
                "PRODUCTION WARNING: CORS allows all origins. Set SIGNBRIDGE_CORS_ORIGINS to restrict."
            );
        }

        config
    }

    /// Options handed to the gesture store
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            vector_size: self.vector_size,
            backup_path: self.backup_path.clone(),
            collection: self.collection.clone(),
            search_depth: self.search_depth,
            match_threshold: self.match_threshold,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Log the current configuration
    pub fn log(&self) {
        info!("Configuration:");
        info!(
            "   Mode: {}",
            if self.is_production {
                "PRODUCTION"
            } else {
                "Development"
            }
        );
        info!("   Bind: {}:{}", self.host, self.port);
        info!("   Vector size: {}", self.vector_size);
        info!("   Backup: {:?}", self.backup_path);
        info!("   Collection: {}", self.collection);
        info!(
            "   Prediction: depth {} (threshold {:.2})",
            self.search_depth, self.match_threshold
        );
        info!("   Max concurrent: {}", self.max_concurrent_requests);
        info!("   Request timeout: {}s", self.request_timeout_secs);
        if self.cors.is_restricted() {
            info!("   CORS origins: {:?}", self.cors.allowed_origins);
        } else {
            info!("   CORS: Permissive (all origins allowed)");
        }
    }
}

/// Environment variable documentation
pub fn print_env_help() {
    println!("Sign-Bridge Configuration Environment Variables:");
    println!();
    println!("  SIGNBRIDGE_ENV              - Set to 'production' or 'prod' for production mode");
    println!("  SIGNBRIDGE_HOST             - Bind address (default: 127.0.0.1)");
    println!("  SIGNBRIDGE_PORT             - Server port (default: 8000)");
    println!("  SIGNBRIDGE_VECTOR_SIZE      - Floats per gesture (default: {DEFAULT_VECTOR_SIZE})");
    println!("  SIGNBRIDGE_BACKUP_PATH      - Backup file (default: ./{DEFAULT_BACKUP_FILE})");
    println!("  SIGNBRIDGE_COLLECTION       - Collection name (default: {DEFAULT_COLLECTION_NAME})");
    println!("  SIGNBRIDGE_SEARCH_DEPTH     - Matches inspected per prediction (default: {DEFAULT_SEARCH_DEPTH})");
    println!("  SIGNBRIDGE_MATCH_THRESHOLD  - Minimum score to name a label (default: {DEFAULT_MATCH_THRESHOLD})");
    println!("  SIGNBRIDGE_MAX_CONCURRENT   - Max concurrent requests (default: 64)");
    println!("  SIGNBRIDGE_REQUEST_TIMEOUT  - Request timeout in seconds (default: 30)");
    println!();
    println!("CORS Configuration:");
    println!("  SIGNBRIDGE_CORS_ORIGINS     - Comma-separated allowed origins (default: all)");
    println!("  SIGNBRIDGE_CORS_METHODS     - Comma-separated allowed methods (default: all)");
    println!("  SIGNBRIDGE_CORS_HEADERS     - Comma-separated allowed headers (default: all)");
    println!("  SIGNBRIDGE_CORS_CREDENTIALS - Allow credentials true/false (default: false)");
    println!("  SIGNBRIDGE_CORS_MAX_AGE     - Preflight cache seconds (default: 86400)");
    println!();
    println!("  RUST_LOG                    - Log level (e.g., info, debug, trace)");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.vector_size, 1890);
        assert_eq!(config.search_depth, 3);
        assert_eq!(config.backup_path, PathBuf::from("qdrant_backup.json"));
        assert!(!config.is_production);
    }

    #[test]
    fn test_env_override() {
        env::set_var("SIGNBRIDGE_PORT", "9100");
        env::set_var("SIGNBRIDGE_VECTOR_SIZE", "63");
        env::set_var("SIGNBRIDGE_SEARCH_DEPTH", "5000");
        env::set_var("SIGNBRIDGE_MATCH_THRESHOLD", "7.5");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 9100);
        assert_eq!(config.vector_size, 63);
        assert_eq!(config.search_depth, MAX_SEARCH_DEPTH);
        assert_eq!(config.match_threshold, 1.0);

        env::set_var("SIGNBRIDGE_VECTOR_SIZE", "0");
        assert_eq!(ServerConfig::from_env().vector_size, DEFAULT_VECTOR_SIZE);

        env::remove_var("SIGNBRIDGE_PORT");
        env::remove_var("SIGNBRIDGE_VECTOR_SIZE");
        env::remove_var("SIGNBRIDGE_SEARCH_DEPTH");
        env::remove_var("SIGNBRIDGE_MATCH_THRESHOLD");
    }

    #[test]
    fn test_store_config_mirrors_server_config() {
        let config = ServerConfig {
            vector_size: 12,
            backup_path: PathBuf::from("/tmp/gestures.json"),
            match_threshold: 0.5,
            ..ServerConfig::default()
        };
        let store = config.store_config();
        assert_eq!(store.vector_size, 12);
        assert_eq!(store.backup_path, PathBuf::from("/tmp/gestures.json"));
        assert_eq!(store.match_threshold, 0.5);
        assert_eq!(store.collection, DEFAULT_COLLECTION_NAME);
    }

    #[test]
    fn test_cors_default_is_permissive() {
        let cors = CorsConfig::default();
        assert!(!cors.is_restricted());
        let _layer = cors.to_layer();
    }

    #[test]
    fn test_cors_credentials_without_origins_does_not_panic() {
        let cors = CorsConfig {
            allow_credentials: true,
            ..Default::default()
        };
        let _layer = cors.to_layer();
    }

    #[test]
    fn test_cors_to_layer_restricted() {
        let cors = CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string()],
            allowed_headers: vec!["Content-Type".to_string()],
            allow_credentials: true,
            ..Default::default()
        };
        assert!(cors.is_restricted());
        let _layer = cors.to_layer();
    }
}
