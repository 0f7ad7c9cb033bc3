//! API configuration.

use std::str::FromStr;

/// Which backend serves frame enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnhanceBackendChoice {
    /// Restoration model sidecar
    #[default]
    Model,
    /// In-process unsharp mask, no sidecar needed
    Local,
}

impl FromStr for EnhanceBackendChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(EnhanceBackendChoice::Model),
            "local" => Ok(EnhanceBackendChoice::Local),
            other => Err(format!("unknown enhance backend: {other}")),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_bytes: usize,
    /// Base URL of the face model sidecar (detect, swap, enhance)
    pub face_sidecar_url: String,
    /// Base URL of the video generation sidecar
    pub video_sidecar_url: String,
    /// Per-request timeout for sidecar calls
    pub sidecar_timeout_secs: u64,
    /// How long a generation job may run before it times out
    pub generation_max_wait_secs: u64,
    /// Enhancement backend
    pub enhance_backend: EnhanceBackendChoice,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_bytes: 10 * 1024 * 1024, // 10MB
            face_sidecar_url: "http://localhost:8002".to_string(),
            video_sidecar_url: "http://localhost:8001".to_string(),
            sidecar_timeout_secs: 300,
            generation_max_wait_secs: 1800,
            enhance_backend: EnhanceBackendChoice::Model,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("VMORPH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("VMORPH_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("VMORPH_CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_bytes: std::env::var("VMORPH_MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            face_sidecar_url: std::env::var("VMORPH_FACE_SIDECAR_URL")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),
            video_sidecar_url: std::env::var("VMORPH_VIDEO_SIDECAR_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            sidecar_timeout_secs: std::env::var("VMORPH_SIDECAR_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            generation_max_wait_secs: std::env::var("VMORPH_GENERATION_MAX_WAIT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1800),
            enhance_backend: std::env::var("VMORPH_ENHANCE_BACKEND")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }
}
