//! Configuration module
//!
//! Settings are read from the environment (after loading `.env` when present)
//! and checked with [`Config::validate`] before any collaborator is built.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    BYTES_PER_MB, DEFAULT_DOWNLOAD_URL_TTL_SECS, DEFAULT_IDENTITY_ID, S3_MIN_PART_SIZE_BYTES,
};
use crate::models::StorageTier;
use crate::storage_types::StorageBackend;

const UPLOAD_CHUNK_SIZE_MB: usize = 5;
const MAX_FILE_SIZE_MB: usize = 50;

/// Which service performs text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisBackend {
    /// Local PDF parsing; any other input is rejected as unsupported.
    Pdf,
    /// AWS Textract `AnalyzeDocument`.
    Textract,
}

impl FromStr for AnalysisBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(AnalysisBackend::Pdf),
            "textract" => Ok(AnalysisBackend::Textract),
            _ => Err(anyhow::anyhow!("Invalid extractor backend: {}", s)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub identity_id: String,
    pub default_tier: StorageTier,
    pub download_url_ttl_secs: u64,
    pub upload_chunk_size_bytes: usize,
    pub max_file_size_bytes: usize,
    // Analysis configuration
    pub extractor_backend: AnalysisBackend,
    pub interpreter_language: Option<String>,
    // Identity
    pub user_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: "./data".to_string(),
            local_storage_base_url: "http://localhost:3000/files".to_string(),
            identity_id: DEFAULT_IDENTITY_ID.to_string(),
            default_tier: StorageTier::Private,
            download_url_ttl_secs: DEFAULT_DOWNLOAD_URL_TTL_SECS,
            upload_chunk_size_bytes: UPLOAD_CHUNK_SIZE_MB * BYTES_PER_MB,
            max_file_size_bytes: MAX_FILE_SIZE_MB * BYTES_PER_MB,
            extractor_backend: AnalysisBackend::Pdf,
            interpreter_language: None,
            user_email: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or(defaults.environment);

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => defaults.storage_backend,
        };

        let default_tier = match env::var("DOCVAULT_DEFAULT_TIER") {
            Ok(s) => s
                .parse::<StorageTier>()
                .map_err(|e| anyhow::anyhow!("DOCVAULT_DEFAULT_TIER: {}", e))?,
            Err(_) => defaults.default_tier,
        };

        let extractor_backend = match env::var("EXTRACTOR_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => defaults.extractor_backend,
        };

        let config = Config {
            environment,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or(defaults.local_storage_path),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or(defaults.local_storage_base_url),
            identity_id: env::var("DOCVAULT_IDENTITY_ID")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.identity_id),
            default_tier,
            download_url_ttl_secs: env_number("DOWNLOAD_URL_TTL_SECS")?
                .unwrap_or(defaults.download_url_ttl_secs),
            upload_chunk_size_bytes: match env_number("UPLOAD_CHUNK_SIZE_MB")? {
                Some(mb) => megabytes("UPLOAD_CHUNK_SIZE_MB", mb)?,
                None => defaults.upload_chunk_size_bytes,
            },
            max_file_size_bytes: match env_number("MAX_FILE_SIZE_MB")? {
                Some(mb) => megabytes("MAX_FILE_SIZE_MB", mb)?,
                None => defaults.max_file_size_bytes,
            },
            extractor_backend,
            interpreter_language: env::var("INTERPRETER_LANGUAGE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            user_email: env::var("DOCVAULT_USER_EMAIL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.download_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "DOWNLOAD_URL_TTL_SECS must be greater than zero"
            ));
        }

        if self.upload_chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_CHUNK_SIZE_MB must be greater than zero"
            ));
        }

        if self.identity_id.contains('/') || self.identity_id.contains("..") {
            return Err(anyhow::anyhow!(
                "DOCVAULT_IDENTITY_ID must not contain '/' or '..'"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
                if self.upload_chunk_size_bytes < S3_MIN_PART_SIZE_BYTES {
                    return Err(anyhow::anyhow!(
                        "UPLOAD_CHUNK_SIZE_MB must be at least 5 when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must not be empty when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn download_url_ttl(&self) -> Duration {
        Duration::from_secs(self.download_url_ttl_secs)
    }

    /// Region for S3, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    /// Region for the analysis services; `None` defers to the AWS default chain.
    pub fn analysis_region(&self) -> Option<&str> {
        self.aws_region.as_deref().or(self.s3_region.as_deref())
    }
}

/// Reads a numeric variable; unset is `None`, anything unparsable is an error.
fn env_number<T>(name: &str) -> Result<Option<T>, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => parse_number(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_number<T>(name: &str, raw: &str) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        anyhow::anyhow!(
            "{} must be a non-negative integer, got {:?}: {}",
            name,
            raw,
            e
        )
    })
}

fn megabytes(name: &str, mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(BYTES_PER_MB)
        .ok_or_else(|| anyhow::anyhow!("{} is too large: {} MB", name, mb))
}
