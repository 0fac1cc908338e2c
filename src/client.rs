use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use url::Url;

use crate::authenticator::{CeremonyState, InternalAuthenticator, MakeCredentialArgs};
use crate::cbor::AttestationObject;
use crate::error::WebAuthnError;
use crate::types::{AttestationConveyance, CollectedClientData, CreateResponse, CreationOptions};

/// Value of `clientDataJSON.type` for registration.
pub const CLIENT_DATA_TYPE_CREATE: &str = "webauthn.create";

/// Client side of the ceremony: validates options, binds them to the
/// configured origin and drives the authenticator.
///
/// One client runs one ceremony at a time (`create` takes `&mut self`);
/// independent clients may share a credential store.
pub struct WebAuthnClient {
    origin: String,
    host: String,
    authenticator: InternalAuthenticator,
}

impl WebAuthnClient {
    /// `origin` is the web origin the client acts for, e.g.
    /// `https://example.org`. https is required, except for localhost.
    pub fn new(
        origin: &str,
        authenticator: InternalAuthenticator,
    ) -> Result<Self, WebAuthnError> {
        let (origin, host) = parse_origin(origin)?;
        Ok(Self {
            origin,
            host,
            authenticator,
        })
    }

    /// Watch the authenticator's ceremony state.
    pub fn ceremony_state(&self) -> watch::Receiver<CeremonyState> {
        self.authenticator.state()
    }

    /// Run a registration ceremony and package the result the way a
    /// relying party expects it.
    pub async fn create(
        &mut self,
        options: &CreationOptions,
    ) -> Result<CreateResponse, WebAuthnError> {
        // 1. Validate and bind to the origin. Nothing may reach the
        // authenticator (or the user) for an unrelated rp id.
        options.validate()?;
        let rp_id = options.rp.id.to_ascii_lowercase();
        if !rp_id_matches_host(&self.host, &rp_id) {
            return Err(WebAuthnError::Security(format!(
                "rp id {rp_id:?} is not a registrable suffix of origin host {:?}",
                self.host
            )));
        }

        // 2. clientDataJSON is fixed before the authenticator runs; its
        // hash is what ends up signed.
        let client_data_json =
            build_client_data(CLIENT_DATA_TYPE_CREATE, &options.challenge, &self.origin);
        let client_data_hash: [u8; 32] = Sha256::digest(&client_data_json).into();

        // 3. Drive the authenticator
        let made = self
            .authenticator
            .make_credential(MakeCredentialArgs {
                rp: options.rp.clone(),
                user: options.user.clone(),
                client_data_hash,
                pub_key_cred_params: options.pub_key_cred_params.clone(),
                require_resident_key: options.authenticator_selection.require_resident_key,
                user_verification: options.authenticator_selection.user_verification,
                exclude_list: options.exclude_credentials.clone(),
                timeout: options.timeout_millis.map(std::time::Duration::from_millis),
            })
            .await?;

        // 4. Apply the conveyance preference. "none" keeps the same
        // authenticator data and drops the statement; "indirect" is served
        // as direct since there is no anonymization CA.
        let attestation = match options.attestation {
            AttestationConveyance::None => {
                AttestationObject::none(made.attestation.auth_data.clone())
            }
            AttestationConveyance::Indirect | AttestationConveyance::Direct => made.attestation,
        };

        Ok(CreateResponse {
            id: URL_SAFE_NO_PAD.encode(&made.credential_id),
            raw_id: made.credential_id,
            client_data_json,
            attestation_object: attestation.encode(),
        })
    }
}

/// Normalize an origin string to its ASCII serialization and host.
pub(crate) fn parse_origin(origin: &str) -> Result<(String, String), WebAuthnError> {
    let url =
        Url::parse(origin).map_err(|e| WebAuthnError::Security(format!("invalid origin: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| WebAuthnError::Security("origin has no host".into()))?
        .to_ascii_lowercase();
    match url.scheme() {
        "https" => {}
        "http" if host == "localhost" || host == "127.0.0.1" => {}
        scheme => {
            return Err(WebAuthnError::Security(format!(
                "origin scheme {scheme:?} is not allowed"
            )));
        }
    }
    Ok((url.origin().ascii_serialization(), host))
}

/// An rp id matches when it equals the host or is a dot-separated suffix
/// of it. Inputs are expected lowercased.
pub(crate) fn rp_id_matches_host(host: &str, rp_id: &str) -> bool {
    host == rp_id || host.ends_with(&format!(".{rp_id}"))
}

/// Serialize clientDataJSON. Field order is fixed by the struct; the bytes
/// must never be re-serialized downstream.
pub(crate) fn build_client_data(kind: &str, challenge: &[u8], origin: &str) -> Vec<u8> {
    let data = CollectedClientData {
        kind: kind.to_string(),
        challenge: URL_SAFE_NO_PAD.encode(challenge),
        origin: origin.to_string(),
    };
    serde_json::to_vec(&data).expect("client data serialization is infallible")
}
