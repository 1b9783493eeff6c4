use super::RequestsLoggingLevel;
use crate::listing::{ListingSettings, DEFAULT_MAX_RECURSION_DEPTH};

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    pub content_cache_age_sec: usize,
    /// Settings every listing starts from, before element or query overrides.
    pub listing_defaults: ListingSettings,
    pub max_recursion_depth: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            content_cache_age_sec: 3600,
            listing_defaults: ListingSettings::default(),
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}
