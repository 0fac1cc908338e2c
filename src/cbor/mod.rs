pub mod attestation;
pub mod canonical;
pub mod cose;

pub use attestation::AttestationObject;
pub use cose::CoseKey;

use ciborium::value::Value;

use crate::error::WebAuthnError;

/// Decode one CBOR item and require it to be a map.
pub(crate) fn parse_map(data: &[u8]) -> Result<Vec<(Value, Value)>, WebAuthnError> {
    let value: Value = ciborium::from_reader(data)
        .map_err(|e| WebAuthnError::MalformedInput(e.to_string()))?;
    match value {
        Value::Map(map) => Ok(map),
        _ => Err(WebAuthnError::MalformedInput("expected a CBOR map".into())),
    }
}

pub(crate) fn map_get<'a>(map: &'a [(Value, Value)], key: i64) -> Option<&'a Value> {
    map.iter().find_map(|(k, v)| match k {
        Value::Integer(i) if i128::from(*i) == i128::from(key) => Some(v),
        _ => None,
    })
}

pub(crate) fn map_get_text<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    map.iter().find_map(|(k, v)| match k {
        Value::Text(t) if t == key => Some(v),
        _ => None,
    })
}

pub(crate) fn as_bytes(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Bytes(b) => Some(b),
        _ => None,
    }
}

pub(crate) fn as_text(value: &Value) -> Option<&str> {
    match value {
        Value::Text(t) => Some(t),
        _ => None,
    }
}

pub(crate) fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => i64::try_from(i128::from(*i)).ok(),
        _ => None,
    }
}
