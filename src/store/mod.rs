pub mod credential;
pub mod disk;
pub mod index;

pub use credential::CredentialSource;
pub use index::CredentialStore;

/// Size of the at-rest encryption key. Callers must supply a securely
/// generated key; a compiled-in value would defeat the encryption.
pub const STORE_KEY_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialize: {0}")]
    Serialization(String),
    #[error("Encrypt: {0}")]
    Encryption(String),
    #[error("Corrupt: {0}")]
    Corrupt(String),
    #[error("Duplicate credential id")]
    Duplicate,
    #[error("Not found")]
    NotFound,
}
