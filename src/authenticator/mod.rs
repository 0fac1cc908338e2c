pub(crate) mod data;
pub mod make_assertion;
pub mod make_credential;
pub mod state;

pub use make_assertion::{Assertion, MakeAssertionArgs};
pub use make_credential::{MadeCredential, MakeCredentialArgs};
pub use state::CeremonyState;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::cbor::cose::ALG_ES256;
use crate::consent::UserConsent;
use crate::error::WebAuthnError;
use crate::store::CredentialStore;
use crate::types::PubKeyCredParam;

/// COSE algorithms this authenticator can generate keys for, in preference
/// order.
pub const SUPPORTED_ALGORITHMS: &[i64] = &[ALG_ES256];

/// Software authenticator: keys are generated in-process, credentials live
/// in an encrypted store, and every ceremony goes through a [`UserConsent`]
/// gate.
///
/// Ceremonies take `&mut self`, so one authenticator runs one ceremony at a
/// time; the store behind it may be shared.
pub struct InternalAuthenticator {
    pub(crate) aaguid: [u8; 16],
    pub(crate) consent: Arc<dyn UserConsent>,
    pub(crate) store: Arc<CredentialStore>,
    state_tx: watch::Sender<CeremonyState>,
}

impl InternalAuthenticator {
    pub fn new(consent: Arc<dyn UserConsent>, store: Arc<CredentialStore>) -> Self {
        let (state_tx, _) = watch::channel(CeremonyState::Idle);
        Self {
            aaguid: crate::config::AAGUID,
            consent,
            store,
            state_tx,
        }
    }

    /// Watch ceremony state transitions. The receiver outlives individual
    /// ceremonies and sees each one restart from [`CeremonyState::Idle`].
    pub fn state(&self) -> watch::Receiver<CeremonyState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn transition(&self, state: CeremonyState) {
        tracing::debug!(state = ?state, "Ceremony state");
        self.state_tx.send_replace(state);
    }

    /// Publish the terminal state matching `err`, then hand it back.
    pub(crate) fn fail(&self, err: WebAuthnError) -> WebAuthnError {
        let state = match err {
            WebAuthnError::Denied => CeremonyState::Denied,
            WebAuthnError::TimedOut => CeremonyState::TimedOut,
            _ => CeremonyState::Failed,
        };
        self.transition(state);
        err
    }

    /// First algorithm from `params` (in caller order) that this
    /// authenticator supports.
    pub(crate) fn select_algorithm(&self, params: &[PubKeyCredParam]) -> Option<i64> {
        params
            .iter()
            .map(|p| p.alg)
            .find(|alg| SUPPORTED_ALGORITHMS.contains(alg))
    }
}

/// Run `fut` under the ceremony timeout, when one is configured.
pub(crate) async fn race_timeout<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = T>,
) -> Result<T, WebAuthnError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| WebAuthnError::TimedOut),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::cose::ALG_RS256;
    use crate::consent::HeadlessConsent;

    fn authenticator() -> (InternalAuthenticator, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open([0u8; 16], dir.path().to_path_buf()).unwrap();
        let authenticator =
            InternalAuthenticator::new(Arc::new(HeadlessConsent::approving()), Arc::new(store));
        (authenticator, dir)
    }

    #[test]
    fn test_select_algorithm_prefers_caller_order() {
        let (authenticator, _dir) = authenticator();
        let params = vec![
            PubKeyCredParam { alg: ALG_RS256 },
            PubKeyCredParam { alg: ALG_ES256 },
        ];
        assert_eq!(authenticator.select_algorithm(&params), Some(ALG_ES256));
        assert_eq!(authenticator.select_algorithm(&[]), None);
        assert_eq!(
            authenticator.select_algorithm(&[PubKeyCredParam { alg: ALG_RS256 }]),
            None
        );
    }

    #[tokio::test]
    async fn test_state_receiver_sees_transitions() {
        let (authenticator, _dir) = authenticator();
        let state = authenticator.state();
        assert_eq!(*state.borrow(), CeremonyState::Idle);
        authenticator.transition(CeremonyState::AwaitingConsent);
        assert_eq!(*state.borrow(), CeremonyState::AwaitingConsent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_timeout_fires() {
        let err = race_timeout(
            Some(Duration::from_millis(50)),
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WebAuthnError::TimedOut));
    }

    #[tokio::test]
    async fn test_race_timeout_absent_means_wait() {
        let value = race_timeout(None, async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }
}
