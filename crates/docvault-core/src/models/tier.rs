use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;

/// Access-level partition of stored objects. Each tier is a separate namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    /// Readable by every user, including unauthenticated ones.
    Guest,
    /// Readable and writable only by the owning identity.
    #[default]
    Private,
    /// Readable by everyone, writable only by the owning identity.
    Protected,
}

impl StorageTier {
    pub const ALL: [StorageTier; 3] = [
        StorageTier::Guest,
        StorageTier::Private,
        StorageTier::Protected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageTier::Guest => "guest",
            StorageTier::Private => "private",
            StorageTier::Protected => "protected",
        }
    }

    /// Heading shown above the file views for this tier.
    pub fn title(&self) -> &'static str {
        match self {
            StorageTier::Private => "My private files",
            StorageTier::Guest | StorageTier::Protected => "Shared files",
        }
    }
}

impl FromStr for StorageTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "guest" => Ok(StorageTier::Guest),
            "private" => Ok(StorageTier::Private),
            "protected" => Ok(StorageTier::Protected),
            other => Err(AppError::InvalidInput(format!(
                "Invalid storage tier: {} (expected guest, private or protected)",
                other
            ))),
        }
    }
}

impl Display for StorageTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        for tier in StorageTier::ALL {
            assert_eq!(tier.to_string().parse::<StorageTier>().unwrap(), tier);
        }
        assert_eq!(
            " Protected ".parse::<StorageTier>().unwrap(),
            StorageTier::Protected
        );
    }

    #[test]
    fn rejects_unknown_tier() {
        let err = "public".parse::<StorageTier>().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn default_is_private() {
        assert_eq!(StorageTier::default(), StorageTier::Private);
    }

    #[test]
    fn titles() {
        assert_eq!(StorageTier::Private.title(), "My private files");
        assert_eq!(StorageTier::Guest.title(), "Shared files");
        assert_eq!(StorageTier::Protected.title(), "Shared files");
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&StorageTier::Protected).unwrap(),
            "\"protected\""
        );
    }
}
