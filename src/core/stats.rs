use std::time::SystemTime;
use serde::{Serialize, Deserialize};
use crate::core::config::SourceMode;
use crate::query::cache::CacheStats;

/// Engine statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub uptime_secs: u64,
    pub start_time: SystemTime,

    // Source
    pub source_mode: SourceMode,
    pub source_files: usize,
    /// Known only for the in-memory source
    pub total_records: Option<usize>,

    // Queries
    pub queries_served: u64,
    pub cache_stats: CacheStats,
    pub filter_options_cached: bool,
}

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl EngineStats {
    /// A source with no records still serves well-formed empty pages.
    pub fn health(&self) -> HealthStatus {
        match (self.source_files, self.total_records) {
            (_, Some(0)) => HealthStatus::Degraded("dataset is empty".to_string()),
            (0, None) => HealthStatus::Unhealthy("no data files".to_string()),
            _ => HealthStatus::Healthy,
        }
    }
}
