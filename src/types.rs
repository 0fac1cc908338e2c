use serde::{Deserialize, Serialize};

use crate::config::MAX_USER_HANDLE_LEN;
use crate::error::WebAuthnError;

/// Party a credential is created for. `id` must be the client origin's host
/// or a parent domain of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelyingParty {
    pub id: String,
    pub name: String,
}

/// Account the credential belongs to. `id` is the opaque user handle the
/// relying party chose, at most 64 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

/// One entry of `pubKeyCredParams`. The credential type is always
/// "public-key" and is not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PubKeyCredParam {
    pub alg: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserVerification {
    Required,
    #[default]
    Preferred,
    Discouraged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttestationConveyance {
    #[default]
    None,
    Indirect,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthenticatorSelection {
    pub require_resident_key: bool,
    pub user_verification: UserVerification,
}

/// Options for a registration ceremony, mirroring
/// `PublicKeyCredentialCreationOptions`.
#[derive(Debug, Clone)]
pub struct CreationOptions {
    pub rp: RelyingParty,
    pub user: UserAccount,
    pub challenge: Vec<u8>,
    /// Accepted algorithms in the relying party's preference order.
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub authenticator_selection: AuthenticatorSelection,
    pub attestation: AttestationConveyance,
    /// Credential ids the relying party already holds for this user.
    pub exclude_credentials: Vec<Vec<u8>>,
    pub timeout_millis: Option<u64>,
}

impl CreationOptions {
    pub fn new(rp: RelyingParty, user: UserAccount, challenge: Vec<u8>) -> Self {
        Self {
            rp,
            user,
            challenge,
            pub_key_cred_params: Vec::new(),
            authenticator_selection: AuthenticatorSelection::default(),
            attestation: AttestationConveyance::default(),
            exclude_credentials: Vec::new(),
            timeout_millis: None,
        }
    }

    /// Append an algorithm to `pubKeyCredParams`, preserving caller order.
    pub fn add_pub_key_cred_param(&mut self, alg: i64) {
        self.pub_key_cred_params.push(PubKeyCredParam { alg });
    }

    /// Check required fields, naming the first one that is missing or out
    /// of bounds.
    pub(crate) fn validate(&self) -> Result<(), WebAuthnError> {
        if self.challenge.is_empty() {
            return Err(WebAuthnError::InvalidOptions("challenge"));
        }
        if self.rp.id.is_empty() {
            return Err(WebAuthnError::InvalidOptions("rp.id"));
        }
        if self.user.id.is_empty() || self.user.id.len() > MAX_USER_HANDLE_LEN {
            return Err(WebAuthnError::InvalidOptions("user.id"));
        }
        if self.pub_key_cred_params.is_empty() {
            return Err(WebAuthnError::InvalidOptions("pubKeyCredParams"));
        }
        Ok(())
    }
}

/// The clientDataJSON payload. Field order is fixed because the serialized
/// bytes are hashed and signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedClientData {
    #[serde(rename = "type")]
    pub kind: String,
    /// base64url (no padding) form of the challenge bytes.
    pub challenge: String,
    pub origin: String,
}

/// What a successful registration hands back to the caller.
#[derive(Debug, Clone)]
pub struct CreateResponse {
    /// Raw credential id bytes.
    pub raw_id: Vec<u8>,
    /// base64url (no padding) form of `raw_id`.
    pub id: String,
    /// Exact bytes that were hashed into the attestation signature.
    pub client_data_json: Vec<u8>,
    /// CBOR-encoded attestation object.
    pub attestation_object: Vec<u8>,
}

impl CreateResponse {
    /// Hex form of the raw credential id.
    pub fn raw_id_hex(&self) -> String {
        self.raw_id.iter().map(|b| format!("{b:02x}")).collect()
    }
}
