use std::time::Duration;

use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey};
use sha2::{Digest, Sha256};

use super::state::CeremonyState;
use super::{InternalAuthenticator, data, race_timeout};
use crate::error::WebAuthnError;
use crate::store::CredentialSource;
use crate::types::UserVerification;

/// Inputs for one assertion ceremony.
#[derive(Debug, Clone)]
pub struct MakeAssertionArgs {
    pub rp_id: String,
    /// SHA-256 of the exact clientDataJSON bytes; signed together with the
    /// authenticator data.
    pub client_data_hash: [u8; 32],
    /// Credential ids the caller will accept. Empty means discover
    /// resident credentials for `rp_id`.
    pub allow_list: Vec<Vec<u8>>,
    pub user_verification: UserVerification,
    pub timeout: Option<Duration>,
}

/// A signature over `auth_data || client_data_hash` by one stored
/// credential.
#[derive(Debug, Clone)]
pub struct Assertion {
    pub credential_id: Vec<u8>,
    pub user_handle: Vec<u8>,
    pub auth_data: Vec<u8>,
    /// ASN.1 DER, as relying parties expect for ES256.
    pub signature: Vec<u8>,
    pub sign_count: u32,
}

impl InternalAuthenticator {
    /// Sign in with an existing credential: gather candidates, let the user
    /// pick one, bump its counter, sign.
    pub async fn make_assertion(
        &mut self,
        args: MakeAssertionArgs,
    ) -> Result<Assertion, WebAuthnError> {
        self.transition(CeremonyState::Idle);

        // 1. Candidates, newest first. An allow-list id registered for a
        // different rp stays invisible.
        let candidates: Vec<CredentialSource> = if args.allow_list.is_empty() {
            self.store.lookup_resident(&args.rp_id)
        } else {
            args.allow_list
                .iter()
                .filter_map(|id| self.store.lookup(&args.rp_id, id))
                .collect()
        };
        if candidates.is_empty() {
            return Err(self.fail(WebAuthnError::NoCredentials));
        }

        // 2. Selection consent
        self.transition(CeremonyState::AwaitingConsent);
        let consent = self.consent.clone();
        let selected = race_timeout(
            args.timeout,
            consent.request_selection_consent(&args.rp_id, &candidates),
        )
        .await
        .map_err(|e| self.fail(e))?;
        let Some(credential) = selected.and_then(|i| candidates.get(i)) else {
            return Err(self.fail(WebAuthnError::Denied));
        };
        tracing::info!(rp_id = %args.rp_id, "Assertion consent granted");

        // 3. Counter goes to disk before the signature exists
        self.transition(CeremonyState::Signing);
        let sign_count = self
            .store
            .increment_counter(&credential.credential_id)
            .map_err(|e| self.fail(e.into()))?;

        let signing_key = SigningKey::from_slice(&credential.private_key)
            .map_err(|e| self.fail(WebAuthnError::Crypto(e.to_string())))?;

        // 4. Sign
        let rp_id_hash: [u8; 32] = Sha256::digest(args.rp_id.as_bytes()).into();
        let flags = data::presence_flags(args.user_verification);
        let auth_data = data::build_assertion_data(&rp_id_hash, flags, sign_count);
        let mut to_sign = auth_data.clone();
        to_sign.extend_from_slice(&args.client_data_hash);
        let signature: Signature = signing_key
            .try_sign(&to_sign)
            .map_err(|e| self.fail(WebAuthnError::Crypto(e.to_string())))?;

        self.transition(CeremonyState::Done);
        Ok(Assertion {
            credential_id: credential.credential_id.clone(),
            user_handle: credential.user_handle.clone(),
            auth_data,
            signature: signature.to_der().as_bytes().to_vec(),
            sign_count,
        })
    }
}
