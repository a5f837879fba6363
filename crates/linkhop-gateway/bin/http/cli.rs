use clap::{Parser, ValueEnum};
use linkhop_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "LINKHOP_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "LINKHOP_BASE_URL";
pub const CODE_LENGTH_ENV: &str = "LINKHOP_CODE_LENGTH";
pub const STORAGE_BACKEND_ENV: &str = "LINKHOP_STORAGE";
pub const DATABASE_URL_ENV: &str = "LINKHOP_DATABASE_URL";
pub const DATABASE_MAX_CONNECTIONS_ENV: &str = "LINKHOP_DATABASE_MAX_CONNECTIONS";
pub const CACHE_BACKEND_ENV: &str = "LINKHOP_CACHE";
pub const REDIS_URL_ENV: &str = "LINKHOP_REDIS_URL";
pub const CACHE_TTL_SECS_ENV: &str = "LINKHOP_CACHE_TTL_SECS";
pub const CACHE_CAPACITY_ENV: &str = "LINKHOP_CACHE_CAPACITY";
pub const CLICK_TIMEOUT_SECS_ENV: &str = "LINKHOP_CLICK_TIMEOUT_SECS";
pub const REQUEST_TIMEOUT_SECS_ENV: &str = "LINKHOP_REQUEST_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LINKHOP_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://linkhop.db";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "sqlite")]
    Sqlite,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Sqlite => write!(f, "sqlite"),
            StorageBackendArg::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "redis")]
    Redis,
    #[value(name = "moka")]
    Moka,
    #[value(name = "none")]
    None,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Redis => write!(f, "redis"),
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        LogFormat::from(*self).fmt(f)
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "linkhop", about = "URL shortener with click analytics")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix for generated short links, e.g. `https://lh.example`.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = 6,
        value_parser = clap::value_parser!(u8).range(1..=50),
    )]
    pub code_length: u8,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Sqlite
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = DATABASE_URL_ENV, default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    #[arg(long, env = DATABASE_MAX_CONNECTIONS_ENV, default_value_t = 10)]
    pub database_max_connections: u32,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Redis
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    #[arg(long, env = CACHE_TTL_SECS_ENV, default_value_t = 86_400)]
    pub cache_ttl_secs: u64,

    /// Maximum entries held by the moka cache.
    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = 10_000)]
    pub cache_capacity: u64,

    #[arg(long, env = CLICK_TIMEOUT_SECS_ENV, default_value_t = 5)]
    pub click_timeout_secs: u64,

    #[arg(long, env = REQUEST_TIMEOUT_SECS_ENV, default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Pretty
    )]
    pub log_format: LogFormatArg,
}

impl CLI {
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
