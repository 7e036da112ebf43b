//! Centralized configuration (environment variables + defaults).

use anyhow::{anyhow, Context, Result};
use std::env;

/// Which entity store backs the resource services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Which object store receives uploaded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectBackend {
    S3,
    Memory,
}

/// S3-compatible object storage settings.
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Base URL used when handing object URLs back to clients.
    pub public_base_url: Option<String>,
}

impl ObjectStoreConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bucket: required("S3_BUCKET")?,
            region: optional("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            endpoint_url: optional("S3_ENDPOINT_URL"),
            access_key_id: optional("S3_ACCESS_KEY_ID"),
            secret_access_key: optional("S3_SECRET_ACCESS_KEY"),
            public_base_url: optional("S3_PUBLIC_BASE_URL"),
        })
    }
}

/// Database URL must be provided (no default) when the Postgres backend is used.
pub fn database_url() -> Result<String> {
    required("DATABASE_URL")
}

/// Pool size for the Postgres backend (default 5).
pub fn database_max_connections() -> Result<u32> {
    match optional("DATABASE_MAX_CONNECTIONS") {
        None => Ok(5),
        Some(v) => v
            .parse::<u32>()
            .map(|n| n.max(1))
            .with_context(|| format!("DATABASE_MAX_CONNECTIONS must be a valid u32 (got '{}')", v)),
    }
}

/// Listen address of the API server (default `0.0.0.0:3000`).
pub fn bind_addr() -> String {
    optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string())
}

pub fn storage_backend() -> Result<StorageBackend> {
    match optional("STORAGE_BACKEND").as_deref() {
        None | Some("postgres") => Ok(StorageBackend::Postgres),
        Some("memory") => Ok(StorageBackend::Memory),
        Some(other) => Err(anyhow!(
            "STORAGE_BACKEND must be 'postgres' or 'memory' (got '{}')",
            other
        )),
    }
}

pub fn object_backend() -> Result<ObjectBackend> {
    match optional("OBJECT_BACKEND").as_deref() {
        None | Some("s3") => Ok(ObjectBackend::S3),
        Some("memory") => Ok(ObjectBackend::Memory),
        Some(other) => Err(anyhow!(
            "OBJECT_BACKEND must be 's3' or 'memory' (got '{}')",
            other
        )),
    }
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| anyhow!("{} must be set", key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
