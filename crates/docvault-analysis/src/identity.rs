//! Identity providers

use async_trait::async_trait;

use crate::traits::IdentityProvider;

/// Reads the display name from `DOCVAULT_USER_EMAIL` on every call.
#[derive(Debug, Default, Clone)]
pub struct EnvIdentityProvider;

#[async_trait]
impl IdentityProvider for EnvIdentityProvider {
    async fn current_user_display_name(&self) -> Option<String> {
        match std::env::var("DOCVAULT_USER_EMAIL") {
            Ok(email) if !email.trim().is_empty() => Some(email),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "No user identity available");
                None
            }
        }
    }
}

/// Fixed identity, e.g. taken from configuration at startup.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityProvider {
    display_name: Option<String>,
}

impl StaticIdentityProvider {
    pub fn new(display_name: Option<String>) -> Self {
        Self {
            display_name: display_name.filter(|n| !n.trim().is_empty()),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_user_display_name(&self) -> Option<String> {
        self.display_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_identity_ignores_blank_names() {
        assert_eq!(
            StaticIdentityProvider::new(Some("  ".into()))
                .current_user_display_name()
                .await,
            None
        );
        assert_eq!(
            StaticIdentityProvider::new(Some("ana@example.com".into()))
                .current_user_display_name()
                .await
                .as_deref(),
            Some("ana@example.com")
        );
    }

    #[tokio::test]
    async fn absent_identity_is_none() {
        assert_eq!(
            StaticIdentityProvider::default()
                .current_user_display_name()
                .await,
            None
        );
    }
}
