use docvault_core::StorageTier;
use tokio::sync::watch;
use tracing::debug;

/// Owner of the active storage tier. Readers take a snapshot per operation.
pub struct TierSelector {
    tier: watch::Sender<StorageTier>,
}

impl TierSelector {
    pub fn new(initial: StorageTier) -> Self {
        let (tier, _) = watch::channel(initial);
        Self { tier }
    }

    pub fn current(&self) -> StorageTier {
        *self.tier.borrow()
    }

    pub fn set(&self, tier: StorageTier) {
        let changed = self.tier.send_if_modified(|current| {
            if *current == tier {
                return false;
            }
            *current = tier;
            true
        });
        if changed {
            debug!(tier = %tier, "Storage tier changed");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StorageTier> {
        self.tier.subscribe()
    }
}

impl Default for TierSelector {
    fn default() -> Self {
        Self::new(StorageTier::default())
    }
}
