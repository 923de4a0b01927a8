//! Shared key generation for storage backends.
//!
//! Key format: `public/{key}` for guest, `{tier}/{identity_id}/{key}` for
//! private and protected.

use docvault_core::StorageTier;

use crate::{StorageError, StorageResult};

/// Maps tier-relative keys to full storage keys for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    identity_id: String,
}

impl KeyLayout {
    pub fn new(identity_id: impl Into<String>) -> Self {
        Self {
            identity_id: identity_id.into(),
        }
    }

    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    /// Namespace prefix for a tier, always ending in `/`.
    pub fn prefix(&self, tier: StorageTier) -> String {
        match tier {
            StorageTier::Guest => "public/".to_string(),
            StorageTier::Private => format!("private/{}/", self.identity_id),
            StorageTier::Protected => format!("protected/{}/", self.identity_id),
        }
    }

    /// Full storage key for `key` within the tier namespace.
    pub fn object_key(&self, tier: StorageTier, key: &str) -> StorageResult<String> {
        validate_key(key)?;
        Ok(format!("{}{}", self.prefix(tier), key))
    }

    /// Strip the tier namespace from a full storage key. Returns `None` for keys
    /// outside the namespace.
    pub fn relative_key<'a>(&self, tier: StorageTier, full_key: &'a str) -> Option<&'a str> {
        full_key
            .strip_prefix(self.prefix(tier).as_str())
            .filter(|rest| !rest.is_empty())
    }
}

/// Reject keys that are empty, absolute, or attempt path traversal.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_per_tier() {
        let layout = KeyLayout::new("user-1");
        assert_eq!(layout.prefix(StorageTier::Guest), "public/");
        assert_eq!(layout.prefix(StorageTier::Private), "private/user-1/");
        assert_eq!(layout.prefix(StorageTier::Protected), "protected/user-1/");
    }

    #[test]
    fn object_key_and_back() {
        let layout = KeyLayout::new("user-1");
        let full = layout
            .object_key(StorageTier::Private, "docs/invoice.pdf")
            .unwrap();
        assert_eq!(full, "private/user-1/docs/invoice.pdf");
        assert_eq!(
            layout.relative_key(StorageTier::Private, &full),
            Some("docs/invoice.pdf")
        );
        assert_eq!(layout.relative_key(StorageTier::Protected, &full), None);
    }

    #[test]
    fn rejects_traversal_and_absolute_keys() {
        let layout = KeyLayout::new("u");
        for bad in ["", "  ", "../etc/passwd", "/etc/passwd", "a/../../b", "a\\b"] {
            assert!(
                matches!(
                    layout.object_key(StorageTier::Guest, bad),
                    Err(StorageError::InvalidKey(_))
                ),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn bare_prefix_is_not_an_object() {
        let layout = KeyLayout::new("u");
        assert_eq!(layout.relative_key(StorageTier::Guest, "public/"), None);
    }
}
