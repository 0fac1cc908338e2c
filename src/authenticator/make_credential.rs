use std::time::Duration;

use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::Rng;
use sha2::{Digest, Sha256};

use super::state::CeremonyState;
use super::{InternalAuthenticator, data, race_timeout};
use crate::cbor::{AttestationObject, CoseKey};
use crate::consent::ConsentDecision;
use crate::error::WebAuthnError;
use crate::store::CredentialSource;
use crate::types::{PubKeyCredParam, RelyingParty, UserAccount, UserVerification};

/// Inputs for one registration ceremony.
#[derive(Debug, Clone)]
pub struct MakeCredentialArgs {
    pub rp: RelyingParty,
    pub user: UserAccount,
    /// SHA-256 of the exact clientDataJSON bytes; signed together with the
    /// authenticator data.
    pub client_data_hash: [u8; 32],
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub require_resident_key: bool,
    pub user_verification: UserVerification,
    pub exclude_list: Vec<Vec<u8>>,
    pub timeout: Option<Duration>,
}

/// What a successful registration hands back.
#[derive(Debug, Clone)]
pub struct MadeCredential {
    pub credential_id: Vec<u8>,
    pub attestation: AttestationObject,
}

impl InternalAuthenticator {
    /// Run a registration ceremony end to end.
    ///
    /// Consent always comes first: the exclude list and the algorithm list
    /// are only inspected after the user approves, so a silent caller
    /// cannot probe for registered credentials or supported algorithms.
    pub async fn make_credential(
        &mut self,
        args: MakeCredentialArgs,
    ) -> Result<MadeCredential, WebAuthnError> {
        self.transition(CeremonyState::Idle);

        // 1. User consent
        self.transition(CeremonyState::AwaitingConsent);
        let consent = self.consent.clone();
        let decision = race_timeout(
            args.timeout,
            consent.request_creation_consent(&args.rp, &args.user),
        )
        .await
        .map_err(|e| self.fail(e))?;
        match decision {
            ConsentDecision::Approved => {}
            ConsentDecision::Denied => return Err(self.fail(WebAuthnError::Denied)),
            ConsentDecision::TimedOut => return Err(self.fail(WebAuthnError::TimedOut)),
        }
        tracing::info!(rp_id = %args.rp.id, "Creation consent granted");

        // 2. Exclude list, scoped to this rp
        for excluded in &args.exclude_list {
            if self.store.lookup(&args.rp.id, excluded).is_some() {
                return Err(self.fail(WebAuthnError::CredentialExcluded));
            }
        }

        // 3. Algorithm negotiation
        let Some(algorithm) = self.select_algorithm(&args.pub_key_cred_params) else {
            return Err(self.fail(WebAuthnError::NoSupportedAlgorithm));
        };

        // 4. Key pair + credential id
        self.transition(CeremonyState::KeyGenerating);
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let point = signing_key.verifying_key().to_encoded_point(false);
        let (Some(x), Some(y)) = (point.x(), point.y()) else {
            return Err(self.fail(WebAuthnError::Crypto(
                "public key has no affine coordinates".into(),
            )));
        };
        let mut pub_x = [0u8; 32];
        let mut pub_y = [0u8; 32];
        pub_x.copy_from_slice(x);
        pub_y.copy_from_slice(y);

        let credential_id: [u8; 32] = rand::thread_rng().r#gen();

        // 5. Persist before anything is signed over it
        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let record = CredentialSource {
            version: 1,
            credential_id: credential_id.to_vec(),
            rp_id: args.rp.id.clone(),
            rp_name: (!args.rp.name.is_empty()).then(|| args.rp.name.clone()),
            user_handle: args.user.id.clone(),
            user_name: args.user.name.clone(),
            user_display: args.user.display_name.clone(),
            algorithm,
            private_key: signing_key.to_bytes().to_vec(),
            public_key_x: pub_x.to_vec(),
            public_key_y: pub_y.to_vec(),
            sign_counter: 0,
            is_resident: args.require_resident_key,
            created_at,
        };
        self.store.save(record).map_err(|e| self.fail(e.into()))?;

        let cred_id_hex: String = credential_id.iter().map(|b| format!("{b:02x}")).collect();
        tracing::info!(cred_id = cred_id_hex, rp_id = %args.rp.id, "Credential stored");

        // 6. Authenticator data + packed self-attestation
        self.transition(CeremonyState::Signing);
        let rp_id_hash: [u8; 32] = Sha256::digest(args.rp.id.as_bytes()).into();
        let flags = data::presence_flags(args.user_verification);
        let cose_key = CoseKey::es256(pub_x, pub_y);
        let auth_data = data::build_attested_data(
            &rp_id_hash,
            flags,
            0,
            &self.aaguid,
            &credential_id,
            &cose_key,
        )
        .map_err(|e| self.fail(e))?;

        let mut to_sign = auth_data.clone();
        to_sign.extend_from_slice(&args.client_data_hash);
        let signature: Signature = signing_key
            .try_sign(&to_sign)
            .map_err(|e| self.fail(WebAuthnError::Crypto(e.to_string())))?;
        let attestation =
            AttestationObject::packed(algorithm, auth_data, signature.to_der().as_bytes().to_vec());

        self.transition(CeremonyState::Done);
        Ok(MadeCredential {
            credential_id: credential_id.to_vec(),
            attestation,
        })
    }
}
