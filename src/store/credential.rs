use serde::{Deserialize, Serialize};

/// A stored credential: everything needed to sign for its relying party
/// again. Records live encrypted on disk and decrypted copies are handed
/// to ceremonies by value.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialSource {
    pub version:       u8,
    pub credential_id: Vec<u8>,       // 32 bytes random
    pub rp_id:         String,
    pub rp_name:       Option<String>,
    pub user_handle:   Vec<u8>,
    pub user_name:     String,
    pub user_display:  String,
    pub algorithm:     i64,           // COSE identifier, -7 = ES256
    pub private_key:   Vec<u8>,       // P-256 scalar, 32 bytes
    pub public_key_x:  Vec<u8>,       // ECC P-256 x, 32 bytes
    pub public_key_y:  Vec<u8>,       // ECC P-256 y, 32 bytes
    pub sign_counter:  u32,
    pub is_resident:   bool,
    pub created_at:    u64,           // Unix timestamp
}

// Hand-written so the private scalar never reaches a log line.
impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id: String = self.credential_id.iter().map(|b| format!("{b:02x}")).collect();
        f.debug_struct("CredentialSource")
            .field("credential_id", &id)
            .field("rp_id", &self.rp_id)
            .field("user_name", &self.user_name)
            .field("algorithm", &self.algorithm)
            .field("private_key", &"<redacted>")
            .field("sign_counter", &self.sign_counter)
            .field("is_resident", &self.is_resident)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_private_key() {
        let record = CredentialSource {
            version: 1,
            credential_id: vec![0xAB; 4],
            rp_id: "example.org".into(),
            rp_name: None,
            user_handle: vec![1],
            user_name: "alice".into(),
            user_display: "Alice".into(),
            algorithm: -7,
            private_key: vec![0x5E; 32],
            public_key_x: vec![0; 32],
            public_key_y: vec![0; 32],
            sign_counter: 0,
            is_resident: true,
            created_at: 0,
        };
        let printed = format!("{record:?}");
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("94"), "scalar bytes must not be printed");
        assert!(printed.contains("abababab"), "credential id stays readable");
    }
}
