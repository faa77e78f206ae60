use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct StashConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// AI gateway (chat-completion) settings. The API key is never read from the
/// config file; it comes from the `AI_GATEWAY_KEY` environment variable.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ai.gateway.lovable.dev/v1".to_string(),
            model: "google/gemini-2.5-flash-lite".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnrichmentConfig {
    pub fetch_timeout_seconds: u64,
    pub max_content_chars: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: 15,
            max_content_chars: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8767,
        }
    }
}

impl StashConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_optional_sections() {
        let gateway = GatewayConfig::default();
        assert_eq!(gateway.model, "google/gemini-2.5-flash-lite");
        assert_eq!(gateway.timeout_seconds, 30);

        let enrichment = EnrichmentConfig::default();
        assert_eq!(enrichment.max_content_chars, 3000);
        assert_eq!(enrichment.fetch_timeout_seconds, 15);

        let http = HttpConfig::default();
        assert_eq!(http.port, 8767);
    }
}
