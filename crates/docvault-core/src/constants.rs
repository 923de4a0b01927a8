//! Application-wide constants

/// Owner segment used for private/protected namespaces when no identity is configured.
pub const DEFAULT_IDENTITY_ID: &str = "default";

/// Lifetime of a retrieval URL when `DOWNLOAD_URL_TTL_SECS` is not set.
pub const DEFAULT_DOWNLOAD_URL_TTL_SECS: u64 = 900;

/// Smallest part size S3 accepts for all but the last multipart part.
pub const S3_MIN_PART_SIZE_BYTES: usize = 5 * 1024 * 1024;

pub const BYTES_PER_MB: usize = 1024 * 1024;
