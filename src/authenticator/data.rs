use crate::cbor::CoseKey;
use crate::error::WebAuthnError;
use crate::types::UserVerification;

pub(crate) const FLAG_UP: u8 = 0x01;
pub(crate) const FLAG_UV: u8 = 0x04;
pub(crate) const FLAG_AT: u8 = 0x40;

/// Build authenticator data carrying attested credential data (AT set).
pub(crate) fn build_attested_data(
    rp_id_hash: &[u8; 32],
    flags: u8,
    sign_count: u32,
    aaguid: &[u8; 16],
    credential_id: &[u8],
    cose_key: &CoseKey,
) -> Result<Vec<u8>, WebAuthnError> {
    let key_bytes = cose_key.encode()?;
    let cred_id_len = credential_id.len() as u16;
    let mut data = Vec::new();
    data.extend_from_slice(rp_id_hash);
    data.push(flags | FLAG_AT);
    data.extend_from_slice(&sign_count.to_be_bytes());
    data.extend_from_slice(aaguid);
    data.extend_from_slice(&cred_id_len.to_be_bytes());
    data.extend_from_slice(credential_id);
    data.extend_from_slice(&key_bytes);
    Ok(data)
}

/// Build assertion authenticator data (37 bytes, no attested credential
/// data).
pub(crate) fn build_assertion_data(rp_id_hash: &[u8; 32], flags: u8, sign_count: u32) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(rp_id_hash);
    data.push(flags);
    data.extend_from_slice(&sign_count.to_be_bytes());
    data
}

/// Flags for the requested verification policy. UP is always set once the
/// user has answered a dialog; UV reflects the pinentry confirmation unless
/// the relying party discouraged it.
pub(crate) fn presence_flags(user_verification: UserVerification) -> u8 {
    match user_verification {
        UserVerification::Discouraged => FLAG_UP,
        UserVerification::Required | UserVerification::Preferred => FLAG_UP | FLAG_UV,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_data_layout() {
        let rp_id_hash = [0xABu8; 32];
        let auth_data = build_assertion_data(&rp_id_hash, FLAG_UP, 42);

        assert_eq!(auth_data.len(), 37, "assertion authData must be exactly 37 bytes");
        assert_eq!(&auth_data[0..32], &rp_id_hash, "rpIdHash mismatch");
        assert_eq!(auth_data[32], 0x01, "flags must be 0x01 (UP only)");
        let count = u32::from_be_bytes([auth_data[33], auth_data[34], auth_data[35], auth_data[36]]);
        assert_eq!(count, 42, "signCount must be big-endian encoded");
    }

    #[test]
    fn test_attested_data_layout() {
        let rp_id_hash = [0x55u8; 32];
        let aaguid = crate::config::AAGUID;
        let cred_id = [0x77u8; 32];
        let cose_key = CoseKey::es256([0x11; 32], [0x22; 32]);
        let auth_data = build_attested_data(
            &rp_id_hash,
            FLAG_UP | FLAG_UV,
            0,
            &aaguid,
            &cred_id,
            &cose_key,
        )
        .unwrap();

        // 32 + 1 + 4 + 16 + 2 + 32 + cose_key_len
        assert!(auth_data.len() > 87, "attested authData must be at least 87 bytes");
        assert_eq!(&auth_data[0..32], &rp_id_hash, "rpIdHash mismatch");
        assert_eq!(auth_data[32], 0x45, "flags must be UP|UV|AT");
        assert_eq!(&auth_data[33..37], &[0, 0, 0, 0], "signCount must be 0 for a new credential");
        assert_eq!(&auth_data[37..53], &aaguid, "AAGUID mismatch");
        let cred_id_len = u16::from_be_bytes([auth_data[53], auth_data[54]]) as usize;
        assert_eq!(cred_id_len, 32, "credIdLen must be 32");
        assert_eq!(&auth_data[55..87], &cred_id, "credId mismatch");

        let key = CoseKey::decode(&auth_data[87..]).unwrap();
        assert_eq!(key, cose_key, "trailing bytes must decode back to the COSE key");
    }

    #[test]
    fn test_attested_data_always_sets_at() {
        let cose_key = CoseKey::es256([0x11; 32], [0x22; 32]);
        let auth_data =
            build_attested_data(&[0; 32], FLAG_UP, 0, &[0; 16], &[1, 2, 3], &cose_key).unwrap();
        assert_eq!(auth_data[32] & FLAG_AT, FLAG_AT);
    }

    #[test]
    fn test_presence_flags_policy() {
        assert_eq!(presence_flags(UserVerification::Required), FLAG_UP | FLAG_UV);
        assert_eq!(presence_flags(UserVerification::Preferred), FLAG_UP | FLAG_UV);
        assert_eq!(presence_flags(UserVerification::Discouraged), FLAG_UP);
    }
}
