use async_trait::async_trait;

use super::{ConsentDecision, UserConsent};
use crate::store::CredentialSource;
use crate::types::{RelyingParty, UserAccount};

/// Consent gate with a fixed answer and no human involved. The approving
/// form backs `--headless` runs; both forms are useful in tests.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessConsent {
    decision: ConsentDecision,
}

impl HeadlessConsent {
    /// Approves every request and selects the first candidate.
    pub fn approving() -> Self {
        Self {
            decision: ConsentDecision::Approved,
        }
    }

    /// Denies every request.
    pub fn denying() -> Self {
        Self {
            decision: ConsentDecision::Denied,
        }
    }
}

#[async_trait]
impl UserConsent for HeadlessConsent {
    async fn request_creation_consent(
        &self,
        rp: &RelyingParty,
        _user: &UserAccount,
    ) -> ConsentDecision {
        tracing::debug!(rp_id = %rp.id, decision = ?self.decision, "Headless creation consent");
        self.decision
    }

    async fn request_selection_consent(
        &self,
        rp_id: &str,
        candidates: &[CredentialSource],
    ) -> Option<usize> {
        tracing::debug!(
            rp_id,
            candidates = candidates.len(),
            decision = ?self.decision,
            "Headless selection consent"
        );
        match self.decision {
            ConsentDecision::Approved if !candidates.is_empty() => Some(0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rp() -> RelyingParty {
        RelyingParty {
            id: "example.org".into(),
            name: "Example".into(),
        }
    }

    fn user() -> UserAccount {
        UserAccount {
            id: vec![1],
            name: "alice".into(),
            display_name: "Alice".into(),
        }
    }

    fn record() -> CredentialSource {
        CredentialSource {
            version: 1,
            credential_id: vec![0xAB; 32],
            rp_id: "example.org".into(),
            rp_name: None,
            user_handle: vec![1],
            user_name: "alice".into(),
            user_display: "Alice".into(),
            algorithm: -7,
            private_key: vec![2; 32],
            public_key_x: vec![0; 32],
            public_key_y: vec![1; 32],
            sign_counter: 0,
            is_resident: true,
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn test_approving_approves_and_selects_first() {
        let gate = HeadlessConsent::approving();
        assert_eq!(
            gate.request_creation_consent(&rp(), &user()).await,
            ConsentDecision::Approved
        );
        assert_eq!(
            gate.request_selection_consent("example.org", &[record()]).await,
            Some(0)
        );
        assert_eq!(gate.request_selection_consent("example.org", &[]).await, None);
    }

    #[tokio::test]
    async fn test_denying_denies_everything() {
        let gate = HeadlessConsent::denying();
        assert_eq!(
            gate.request_creation_consent(&rp(), &user()).await,
            ConsentDecision::Denied
        );
    }
}
