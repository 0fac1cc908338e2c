use ciborium::value::Value;

use super::canonical::canonical_map;
use super::{as_bytes, as_int, map_get, parse_map};
use crate::error::WebAuthnError;

/// ECDSA with SHA-256 over P-256 (ES256).
pub const ALG_ES256: i64 = -7;
/// RSASSA-PKCS1-v1_5 with SHA-256 (RS256). Recognized during negotiation,
/// never generated.
pub const ALG_RS256: i64 = -257;

const KTY_EC2: i64 = 2;
const CRV_P256: i64 = 1;

const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_CRV: i64 = -1;
const LABEL_X: i64 = -2;
const LABEL_Y: i64 = -3;

/// An EC2 P-256 public key in COSE_Key form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoseKey {
    pub alg: i64,
    pub x: [u8; 32],
    pub y: [u8; 32],
}

impl CoseKey {
    pub fn es256(x: [u8; 32], y: [u8; 32]) -> Self {
        Self { alg: ALG_ES256, x, y }
    }

    /// Encode as a canonical CBOR map (kty, alg, crv, x, y).
    pub fn encode(&self) -> Result<Vec<u8>, WebAuthnError> {
        if self.alg != ALG_ES256 {
            return Err(WebAuthnError::UnsupportedAlgorithm(self.alg));
        }
        let map = canonical_map(vec![
            (Value::Integer(LABEL_KTY.into()), Value::Integer(KTY_EC2.into())),
            (Value::Integer(LABEL_ALG.into()), Value::Integer(self.alg.into())),
            (Value::Integer(LABEL_CRV.into()), Value::Integer(CRV_P256.into())),
            (Value::Integer(LABEL_X.into()), Value::Bytes(self.x.to_vec())),
            (Value::Integer(LABEL_Y.into()), Value::Bytes(self.y.to_vec())),
        ]);
        let mut buf = Vec::new();
        ciborium::into_writer(&map, &mut buf).expect("COSE key encoding is infallible");
        Ok(buf)
    }

    /// Decode from CBOR bytes; the reverse of [`CoseKey::encode`].
    pub fn decode(data: &[u8]) -> Result<Self, WebAuthnError> {
        let map = parse_map(data)?;
        let kty = map_get(&map, LABEL_KTY)
            .and_then(as_int)
            .ok_or_else(|| WebAuthnError::MalformedInput("cose: kty missing".into()))?;
        if kty != KTY_EC2 {
            return Err(WebAuthnError::MalformedInput(format!(
                "cose: kty {kty} is not EC2"
            )));
        }
        let alg = map_get(&map, LABEL_ALG)
            .and_then(as_int)
            .ok_or_else(|| WebAuthnError::MalformedInput("cose: alg missing".into()))?;
        if alg != ALG_ES256 {
            return Err(WebAuthnError::UnsupportedAlgorithm(alg));
        }
        let crv = map_get(&map, LABEL_CRV)
            .and_then(as_int)
            .ok_or_else(|| WebAuthnError::MalformedInput("cose: crv missing".into()))?;
        if crv != CRV_P256 {
            return Err(WebAuthnError::MalformedInput(format!(
                "cose: crv {crv} is not P-256"
            )));
        }
        let x = coordinate(&map, LABEL_X, "x")?;
        let y = coordinate(&map, LABEL_Y, "y")?;
        Ok(Self { alg, x, y })
    }
}

fn coordinate(
    map: &[(Value, Value)],
    label: i64,
    name: &str,
) -> Result<[u8; 32], WebAuthnError> {
    map_get(map, label)
        .and_then(as_bytes)
        .ok_or_else(|| WebAuthnError::MalformedInput(format!("cose: {name} missing")))?
        .try_into()
        .map_err(|_| WebAuthnError::MalformedInput(format!("cose: {name} is not 32 bytes")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cose_key_is_cbor_map() {
        let encoded = CoseKey::es256([0x11; 32], [0x22; 32]).encode().unwrap();
        let val: Value = ciborium::from_reader(encoded.as_slice()).expect("must be valid CBOR");
        assert!(matches!(val, Value::Map(_)), "COSE key must be a CBOR map");
    }

    #[test]
    fn test_cose_key_fields() {
        let encoded = CoseKey::es256([0xAA; 32], [0xBB; 32]).encode().unwrap();
        let map = parse_map(&encoded).unwrap();

        // kty = 2 (EC2)
        assert_eq!(map_get(&map, 1).and_then(as_int), Some(2));
        // alg = -7 (ES256)
        assert_eq!(map_get(&map, 3).and_then(as_int), Some(-7));
        // crv = 1 (P-256)
        assert_eq!(map_get(&map, -1).and_then(as_int), Some(1));
        assert_eq!(map_get(&map, -2).and_then(as_bytes), Some(&[0xAAu8; 32][..]));
        assert_eq!(map_get(&map, -3).and_then(as_bytes), Some(&[0xBBu8; 32][..]));
    }

    #[test]
    fn test_cose_key_canonical_byte_order() {
        let encoded = CoseKey::es256([0x01; 32], [0x02; 32]).encode().unwrap();
        // map(5), then kty=2, alg=-7, crv=1 with one-byte keys in order.
        assert_eq!(encoded[0], 0xa5);
        assert_eq!(&encoded[1..3], &[0x01, 0x02]);
        assert_eq!(&encoded[3..5], &[0x03, 0x26]);
        assert_eq!(&encoded[5..7], &[0x20, 0x01]);
    }

    #[test]
    fn test_cose_key_roundtrip() {
        let key = CoseKey::es256([0x0F; 32], [0xF0; 32]);
        let decoded = CoseKey::decode(&key.encode().unwrap()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_encode_rejects_unknown_algorithm() {
        let key = CoseKey {
            alg: ALG_RS256,
            x: [0; 32],
            y: [0; 32],
        };
        assert!(matches!(
            key.encode(),
            Err(WebAuthnError::UnsupportedAlgorithm(ALG_RS256))
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_kty() {
        let map = canonical_map(vec![
            (Value::Integer(1i64.into()), Value::Integer(3i64.into())),
            (Value::Integer(3i64.into()), Value::Integer((-7i64).into())),
        ]);
        let mut buf = Vec::new();
        ciborium::into_writer(&map, &mut buf).unwrap();
        assert!(matches!(
            CoseKey::decode(&buf),
            Err(WebAuthnError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_decode_rejects_short_coordinate() {
        let map = canonical_map(vec![
            (Value::Integer(1i64.into()), Value::Integer(2i64.into())),
            (Value::Integer(3i64.into()), Value::Integer((-7i64).into())),
            (Value::Integer((-1i64).into()), Value::Integer(1i64.into())),
            (Value::Integer((-2i64).into()), Value::Bytes(vec![0u8; 31])),
            (Value::Integer((-3i64).into()), Value::Bytes(vec![0u8; 32])),
        ]);
        let mut buf = Vec::new();
        ciborium::into_writer(&map, &mut buf).unwrap();
        assert!(matches!(
            CoseKey::decode(&buf),
            Err(WebAuthnError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            CoseKey::decode(&[0xff, 0x00]),
            Err(WebAuthnError::MalformedInput(_))
        ));
    }
}
