use ciborium::value::Value;

use super::canonical::canonical_map;
use super::{as_bytes, as_text, map_get_text, parse_map};
use crate::error::WebAuthnError;

pub const FMT_PACKED: &str = "packed";
pub const FMT_NONE: &str = "none";

/// A WebAuthn attestation object: format identifier, raw authenticator
/// data and the format-specific attestation statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AttestationObject {
    pub fmt: String,
    pub auth_data: Vec<u8>,
    pub att_stmt: Value,
}

impl AttestationObject {
    /// Packed self-attestation: `attStmt = { alg, sig }` with the signature
    /// made by the credential key itself.
    pub fn packed(alg: i64, auth_data: Vec<u8>, der_sig: Vec<u8>) -> Self {
        let att_stmt = canonical_map(vec![
            (Value::Text("alg".to_string()), Value::Integer(alg.into())),
            (Value::Text("sig".to_string()), Value::Bytes(der_sig)),
        ]);
        Self {
            fmt: FMT_PACKED.to_string(),
            auth_data,
            att_stmt,
        }
    }

    /// The "none" format: same authenticator data, empty statement.
    pub fn none(auth_data: Vec<u8>) -> Self {
        Self {
            fmt: FMT_NONE.to_string(),
            auth_data,
            att_stmt: Value::Map(Vec::new()),
        }
    }

    /// Encode as a canonical CBOR map (fmt, attStmt, authData).
    pub fn encode(&self) -> Vec<u8> {
        let map = canonical_map(vec![
            (Value::Text("fmt".to_string()), Value::Text(self.fmt.clone())),
            (Value::Text("attStmt".to_string()), self.att_stmt.clone()),
            (
                Value::Text("authData".to_string()),
                Value::Bytes(self.auth_data.clone()),
            ),
        ]);
        let mut buf = Vec::new();
        ciborium::into_writer(&map, &mut buf).expect("attestation encoding is infallible");
        buf
    }

    /// Decode from CBOR bytes; the reverse of [`AttestationObject::encode`].
    pub fn decode(data: &[u8]) -> Result<Self, WebAuthnError> {
        let map = parse_map(data)?;
        let fmt = map_get_text(&map, "fmt")
            .and_then(as_text)
            .ok_or_else(|| WebAuthnError::MalformedInput("attestation: fmt missing".into()))?
            .to_string();
        let auth_data = map_get_text(&map, "authData")
            .and_then(as_bytes)
            .ok_or_else(|| WebAuthnError::MalformedInput("attestation: authData missing".into()))?
            .to_vec();
        let att_stmt = map_get_text(&map, "attStmt")
            .filter(|v| matches!(v, Value::Map(_)))
            .cloned()
            .ok_or_else(|| WebAuthnError::MalformedInput("attestation: attStmt missing".into()))?;
        Ok(Self {
            fmt,
            auth_data,
            att_stmt,
        })
    }
}
