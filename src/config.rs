use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use anyhow::Context;
use derivative::Derivative;
use serde::Deserialize;

use crate::{
    cli_args::CliArgs, error::ErrorVerbosity, extractor::validated::ValidationPolicy,
    utils::mask_fmt,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub error_verbosity: ErrorVerbosity,
    pub validation_policy: ValidationPolicy,
    /// Origin allowed to make cross-origin requests. `None` allows none.
    pub allowed_origin: Option<String>,
    pub request_timeout_in_seconds: u64,
    pub storage: StorageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            error_verbosity: ErrorVerbosity::default(),
            validation_policy: ValidationPolicy::default(),
            allowed_origin: None,
            request_timeout_in_seconds: 30,
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    Mongo(MongoConfig),
    /// Process-local storage, for development.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Mongo(MongoConfig::default())
    }
}

#[derive(Derivative, Clone, PartialEq, Eq, Deserialize)]
#[derivative(Debug)]
pub struct MongoConfig {
    /// May carry credentials, never logged.
    #[derivative(Debug(format_with = "mask_fmt"))]
    pub uri: String,
    /// Falls back to the database named in `uri`.
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl MongoConfig {
    pub fn from_uri(uri: String) -> Self {
        Self {
            uri,
            database: None,
            collection: default_collection(),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self::from_uri("mongodb://localhost:27017".to_string())
    }
}

fn default_collection() -> String {
    "books".to_string()
}

impl ServerConfig {
    pub async fn from_config_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Reads the config file named by `cli_args`, if any, then applies the overrides.
    pub async fn load(cli_args: CliArgs) -> anyhow::Result<Self> {
        let config = match &cli_args.config_file {
            Some(path) => Self::from_config_file(path).await?,
            None => Self::default(),
        };

        Ok(config.with_overrides(cli_args))
    }

    pub fn with_overrides(mut self, cli_args: CliArgs) -> Self {
        if let Some(port) = cli_args.port {
            self.port = port;
        }

        if let Some(uri) = cli_args.mongodb_uri {
            self.storage = match self.storage {
                StorageConfig::Mongo(mongo) => StorageConfig::Mongo(MongoConfig { uri, ..mongo }),
                StorageConfig::Memory => StorageConfig::Mongo(MongoConfig::from_uri(uri)),
            };
        }

        if let Some(frontend_url) = cli_args.frontend_url {
            self.allowed_origin = Some(frontend_url);
        }

        self
    }

    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_in_seconds)
    }
}
