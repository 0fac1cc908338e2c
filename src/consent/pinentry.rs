use std::time::Duration;

use async_trait::async_trait;

use super::{ConsentDecision, UserConsent};
use crate::config::CONSENT_DIALOG_TIMEOUT_SECS;
use crate::store::CredentialSource;
use crate::types::{RelyingParty, UserAccount};

type CreationMessage = dyn Fn(&RelyingParty, &UserAccount) -> String + Send + Sync;

/// Consent gate backed by a pinentry dialog. The dialog copy is
/// caller-replaceable so embedders can reword or localize it.
pub struct PinentryConsent {
    binary: String,
    dialog_timeout: Duration,
    title: String,
    creation_message: Box<CreationMessage>,
}

impl PinentryConsent {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            dialog_timeout: Duration::from_secs(CONSENT_DIALOG_TIMEOUT_SECS),
            title: "keyrium".to_string(),
            creation_message: Box::new(default_creation_message),
        }
    }

    /// Cap on how long one dialog stays up before counting as a timeout.
    pub fn with_dialog_timeout(mut self, timeout: Duration) -> Self {
        self.dialog_timeout = timeout;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replace the registration prompt body.
    pub fn with_creation_message<F>(mut self, build: F) -> Self
    where
        F: Fn(&RelyingParty, &UserAccount) -> String + Send + Sync + 'static,
    {
        self.creation_message = Box::new(build);
        self
    }

    async fn confirm(&self, description: String) -> ConsentDecision {
        let bin = self.binary.clone();
        let title = self.title.clone();

        // pinentry talks over stdin/stdout and blocks; keep it off the
        // async workers.
        let join = tokio::task::spawn_blocking(move || {
            let input = pinentry::PassphraseInput::with_binary(&bin);
            match input {
                None => Err(pinentry::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "pinentry binary not found",
                ))),
                Some(mut input) => input
                    .with_title(&title)
                    .with_description(&description)
                    .with_ok("Confirm")
                    .with_cancel("Deny")
                    .interact(),
            }
        });

        match tokio::time::timeout(self.dialog_timeout, join).await {
            Err(_) => ConsentDecision::TimedOut,
            Ok(Err(_)) => ConsentDecision::Denied,
            Ok(Ok(Ok(_))) => ConsentDecision::Approved,
            Ok(Ok(Err(_))) => ConsentDecision::Denied,
        }
    }
}

#[async_trait]
impl UserConsent for PinentryConsent {
    async fn request_creation_consent(
        &self,
        rp: &RelyingParty,
        user: &UserAccount,
    ) -> ConsentDecision {
        let message = (self.creation_message)(rp, user);
        let decision = self.confirm(message).await;
        tracing::debug!(rp_id = %rp.id, decision = ?decision, "Creation consent dialog resolved");
        decision
    }

    async fn request_selection_consent(
        &self,
        rp_id: &str,
        candidates: &[CredentialSource],
    ) -> Option<usize> {
        // One confirm dialog per candidate, newest first. Denying moves on
        // to the next; denying all of them denies the request.
        for (i, candidate) in candidates.iter().enumerate() {
            let account = if candidate.user_display.is_empty() {
                &candidate.user_name
            } else {
                &candidate.user_display
            };
            let description = format!(
                "Sign in to {rp_id}\n\nKey {} of {}\nAccount: {account}\n\nConfirm to use this key, or deny to see the next one.",
                i + 1,
                candidates.len(),
            );
            if self.confirm(description).await == ConsentDecision::Approved {
                tracing::debug!(rp_id, index = i, "Credential selected");
                return Some(i);
            }
        }
        tracing::debug!(rp_id, "All candidates denied");
        None
    }
}

fn default_creation_message(rp: &RelyingParty, user: &UserAccount) -> String {
    let site = if rp.name.is_empty() {
        rp.id.clone()
    } else {
        format!("{} ({})", rp.name, rp.id)
    };
    let account = if user.display_name.is_empty() {
        user.name.as_str()
    } else {
        user.display_name.as_str()
    };
    format!(
        "Register new passkey\n\nSite: {site}\nAccount: {account}\n\nPress Confirm to create it, or Deny to refuse."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_names_site_and_account() {
        let message = default_creation_message(
            &RelyingParty {
                id: "example.org".into(),
                name: "MyService".into(),
            },
            &UserAccount {
                id: vec![1],
                name: "john".into(),
                display_name: "John".into(),
            },
        );
        assert!(message.contains("MyService (example.org)"));
        assert!(message.contains("John"));
    }

    #[test]
    fn test_default_message_falls_back_to_ids() {
        let message = default_creation_message(
            &RelyingParty {
                id: "example.org".into(),
                name: String::new(),
            },
            &UserAccount {
                id: vec![1],
                name: "john".into(),
                display_name: String::new(),
            },
        );
        assert!(message.contains("Site: example.org"));
        assert!(message.contains("Account: john"));
    }
}
