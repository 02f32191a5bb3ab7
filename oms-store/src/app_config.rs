use oms_shared::Masked;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// local | dev | prod, selects the log format
    #[serde(default = "default_env")]
    pub env: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub kafka: KafkaConfig,
}

/// Configuration of the `oms-sender` binary
#[derive(Debug, Deserialize, Clone)]
pub struct SenderConfig {
    #[serde(default = "default_env")]
    pub env: String,
    pub server: ServerConfig,
    pub kafka: ProducerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub address: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: Masked<String>,
    pub dbname: String,
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub limit: usize,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    /// Comma separated bootstrap servers
    pub brokers: String,
    pub reader: ReaderConfig,
    pub writer: WriterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProducerConfig {
    pub brokers: String,
    pub writer: WriterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReaderConfig {
    pub topic: String,
    pub group_id: String,
    #[serde(default = "default_min_bytes")]
    pub min_bytes: u32,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u32,
    #[serde(default = "default_commit_interval_ms")]
    pub commit_interval_ms: u64,
    /// earliest | latest
    #[serde(default = "default_start_offset")]
    pub start_offset: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WriterConfig {
    pub topic: String,
    pub client_id: String,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_max_bytes")]
    pub max_message_bytes: u32,
    /// 0 | 1 | all
    #[serde(default = "default_acks")]
    pub acks: String,
    /// none | gzip | snappy | lz4 | zstd
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_writer_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_env() -> String { "dev".to_string() }
fn default_timeout_secs() -> u64 { 5 }
fn default_sslmode() -> String { "require".to_string() }
fn default_max_connections() -> u32 { 5 }
fn default_sweep_interval_secs() -> u64 { 60 }
fn default_min_bytes() -> u32 { 1 }
fn default_max_bytes() -> u32 { 1_048_576 }
fn default_commit_interval_ms() -> u64 { 1000 }
fn default_start_offset() -> String { "latest".to_string() }
fn default_retries() -> u32 { 5 }
fn default_acks() -> String { "all".to_string() }
fn default_compression() -> String { "lz4".to_string() }
fn default_writer_timeout_ms() -> u64 { 5000 }

impl ServerConfig {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "server.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.sweep_interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "cache.sweep_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Reject values the runtime cannot work with, e.g. a zero sweep period.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.server.validate()?;
        self.cache.validate()
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        layered("config/default")?
            // The database password is usually injected by the container environment
            .set_override_option("database.password", env::var("POSTGRES_PASSWORD").ok())?
            .build()?
            .try_deserialize()
    }
}

impl SenderConfig {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.server.validate()
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        layered("config/sender")?.build()?.try_deserialize()
    }
}

fn layered(
    base: &str,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let builder = config::Config::builder()
        // Start off by merging in the base configuration file
        .add_source(config::File::with_name(base))
        // Add in the current environment file, this file is optional
        .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
        // Add in a local configuration file, not checked in to git
        .add_source(config::File::with_name("config/local").required(false))
        // Add in settings from the environment, e.g. `OMS__SERVER__ADDRESS=0.0.0.0:9000`
        .add_source(config::Environment::with_prefix("OMS").separator("__"));

    Ok(builder)
}
