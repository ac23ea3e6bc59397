use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, Result};

/// Where records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Load every CSV file into memory at startup
    InMemory,
    /// Re-read the CSV chunks on every query, stopping at the result budget
    Streaming,
}

impl SourceMode {
    pub fn parse(value: &str) -> Option<SourceMode> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "in-memory" | "memory" => Some(SourceMode::InMemory),
            "streaming" | "stream" => Some(SourceMode::Streaming),
            _ => None,
        }
    }
}

/// How the sampling path of the top-k selector builds its candidate set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Sample only estimates the pivot; the window is exact
    Exact,
    /// Single pass around the estimated pivot; may miss elements on skewed data
    Approximate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: "0.0.0.0:5002".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
    /// Chunk files are named `<chunk_prefix><N>.csv`
    pub chunk_prefix: String,
    pub mode: SourceMode,
    pub split_chunk_size: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: PathBuf::from("./data"),
            file_name: "sales_data.csv".to_string(),
            chunk_prefix: "sales_data_part".to_string(),
            mode: SourceMode::InMemory,
            split_chunk_size: 50_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub cache_capacity: usize,
    /// Streaming source only: stop after `page_size * result_budget_factor` matches
    pub result_budget_factor: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            default_page_size: 10,
            max_page_size: 100,
            cache_capacity: 50,
            result_budget_factor: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Below this many matches the window comes from a full sort
    pub full_sort_threshold: usize,
    /// Windows starting at or past this position come from a full sort
    pub early_page_limit: usize,
    /// Above this many matches the pivot is estimated from a sample
    pub sampling_threshold: usize,
    pub max_sample_size: usize,
    pub sample_ratio: f64,
    pub sampling_mode: SamplingMode,
    pub seed: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            full_sort_threshold: 1000,
            early_page_limit: 100,
            sampling_threshold: 100_000,
            max_sample_size: 10_000,
            sample_ratio: 0.01,
            sampling_mode: SamplingMode::Exact,
            seed: 0x5eed,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub query: QueryConfig,
    pub selection: SelectionConfig,
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Config = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Apply `SALES_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment, tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("SALES_ADDR") {
            self.server.addr = addr;
        }
        if let Some(dir) = lookup("SALES_DATA_DIR") {
            self.data.data_dir = PathBuf::from(dir);
        }
        if let Some(mode) = lookup("SALES_MODE") {
            self.data.mode = SourceMode::parse(&mode)
                .ok_or_else(|| Error::invalid_config(format!("unknown SALES_MODE '{}'", mode)))?;
        }
        if let Some(size) = lookup("SALES_CACHE_SIZE") {
            self.query.cache_capacity = parse_number("SALES_CACHE_SIZE", &size)?;
        }
        if let Some(size) = lookup("SALES_MAX_PAGE_SIZE") {
            self.query.max_page_size = parse_number("SALES_MAX_PAGE_SIZE", &size)?;
        }
        if let Some(origins) = lookup("SALES_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.max_page_size == 0 {
            return Err(Error::invalid_config("query.max_page_size must be at least 1"));
        }
        if self.query.default_page_size == 0 || self.query.default_page_size > self.query.max_page_size {
            return Err(Error::invalid_config(format!(
                "query.default_page_size must be within 1..={}",
                self.query.max_page_size
            )));
        }
        if self.query.cache_capacity == 0 {
            return Err(Error::invalid_config("query.cache_capacity must be at least 1"));
        }
        if self.query.result_budget_factor == 0 {
            return Err(Error::invalid_config("query.result_budget_factor must be at least 1"));
        }
        if !(self.selection.sample_ratio > 0.0 && self.selection.sample_ratio <= 1.0) {
            return Err(Error::invalid_config("selection.sample_ratio must be in (0, 1]"));
        }
        if self.selection.max_sample_size == 0 {
            return Err(Error::invalid_config("selection.max_sample_size must be at least 1"));
        }
        if self.data.split_chunk_size == 0 {
            return Err(Error::invalid_config("data.split_chunk_size must be at least 1"));
        }
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_config(format!("{} must be a number, got '{}'", key, value)))
}
