pub mod headless;
pub mod pinentry;

pub use headless::HeadlessConsent;
pub use pinentry::PinentryConsent;

use async_trait::async_trait;

use crate::store::CredentialSource;
use crate::types::{RelyingParty, UserAccount};

/// Outcome of a creation-consent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentDecision {
    Approved,
    Denied,
    TimedOut,
}

/// The human in the loop. Every ceremony that touches key material goes
/// through one of these before anything else happens.
///
/// Implementations may take unbounded time; the ceremony timeout cancels a
/// pending request by dropping its future.
#[async_trait]
pub trait UserConsent: Send + Sync {
    /// Ask permission to create a credential for `user` at `rp`.
    async fn request_creation_consent(
        &self,
        rp: &RelyingParty,
        user: &UserAccount,
    ) -> ConsentDecision;

    /// Ask the user to pick one of `candidates` for signing. Returns the
    /// chosen index, or `None` to deny. An out-of-range index counts as a
    /// denial.
    async fn request_selection_consent(
        &self,
        rp_id: &str,
        candidates: &[CredentialSource],
    ) -> Option<usize>;
}
