/// Everything a ceremony can fail with. Variants cross the client boundary
/// unchanged so callers can distinguish outcomes (denial vs. timeout in
/// particular).
#[derive(Debug, thiserror::Error)]
pub enum WebAuthnError {
    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
    #[error("security: {0}")]
    Security(String),
    #[error("excluded credential already registered")]
    CredentialExcluded,
    #[error("none of the requested algorithms is supported")]
    NoSupportedAlgorithm,
    #[error("user denied the request")]
    Denied,
    #[error("ceremony timed out")]
    TimedOut,
    #[error("no usable credentials")]
    NoCredentials,
    #[error("store: {0}")]
    Storage(#[from] crate::store::StoreError),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(i64),
    #[error("crypto: {0}")]
    Crypto(String),
}

pub type Result<T, E = WebAuthnError> = std::result::Result<T, E>;
