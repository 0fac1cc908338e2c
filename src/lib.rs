pub mod authenticator;
pub mod cbor;
pub mod client;
pub mod config;
pub mod consent;
pub mod error;
pub mod store;
pub mod types;

pub use authenticator::InternalAuthenticator;
pub use client::WebAuthnClient;
pub use error::{Result, WebAuthnError};

use std::sync::Arc;

pub fn wipe(cfg: config::Config) -> anyhow::Result<()> {
    let data_dir = data_dir(&cfg)?;

    let creds_dir = data_dir.join("credentials");
    let mut count = 0usize;
    if creds_dir.exists() {
        for entry in std::fs::read_dir(&creds_dir)? {
            std::fs::remove_file(entry?.path())?;
            count += 1;
        }
    }
    println!("Deleted {count} credential(s) from {}", creds_dir.display());

    let key_path = data_dir.join("store.key");
    if key_path.exists() {
        std::fs::remove_file(&key_path)?;
        println!("Store key deleted (a fresh one is generated on next run)");
    }

    Ok(())
}

pub async fn run(cfg: config::Config) -> anyhow::Result<()> {
    use base64::Engine as _;
    use rand::Rng as _;
    use tracing_subscriber::EnvFilter;

    let level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .init();

    tracing::info!("Starting keyrium");

    // Preflight: the consent dialog is load-bearing, fail early if absent.
    if !cfg.headless {
        std::process::Command::new(&cfg.pinentry)
            .arg("--version")
            .output()
            .map_err(|e| {
                anyhow::anyhow!(
                    "pinentry binary not usable: '{}': {e}\n  → install pinentry or pass --headless",
                    cfg.pinentry
                )
            })?;
    }

    let data_dir = data_dir(&cfg)?;
    std::fs::create_dir_all(&data_dir)?;

    // Load or create the at-rest key
    let store_key = load_or_create_store_key(&data_dir.join("store.key"))?;
    tracing::info!("Store key ready");

    // Initialize credential store
    let creds_dir = data_dir.join("credentials");
    std::fs::create_dir_all(&creds_dir)?;
    let store = Arc::new(
        store::CredentialStore::open(store_key, creds_dir)
            .map_err(|e| anyhow::anyhow!("Failed to open credential store: {e}"))?,
    );
    tracing::info!(count = store.credential_count(), "Credential store loaded");

    let consent: Arc<dyn consent::UserConsent> = if cfg.headless {
        Arc::new(consent::HeadlessConsent::approving())
    } else {
        Arc::new(consent::PinentryConsent::new(&cfg.pinentry))
    };

    let authenticator = InternalAuthenticator::new(consent, store);
    let mut client = WebAuthnClient::new(&cfg.origin, authenticator)?;

    // One registration ceremony against the configured origin
    let challenge: [u8; 32] = rand::thread_rng().r#gen();
    let mut options = types::CreationOptions::new(
        types::RelyingParty {
            id: cfg.rp_id.clone(),
            name: cfg.rp_name.clone(),
        },
        types::UserAccount {
            id: cfg.user_id.clone().into_bytes(),
            name: cfg.user_name.clone(),
            display_name: cfg.display_name.clone(),
        },
        challenge.to_vec(),
    );
    options.add_pub_key_cred_param(cbor::cose::ALG_ES256);
    options.authenticator_selection.require_resident_key = cfg.resident;
    options.authenticator_selection.user_verification = types::UserVerification::Required;
    options.attestation = types::AttestationConveyance::Direct;
    options.timeout_millis = cfg.timeout_ms;

    let credential = client.create(&options).await?;

    println!("credential.id:     {}", credential.id);
    println!("credential.rawId:  {}", credential.raw_id_hex());
    println!(
        "clientDataJSON:    {}",
        String::from_utf8_lossy(&credential.client_data_json)
    );
    println!(
        "attestationObject: {}",
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&credential.attestation_object)
    );

    Ok(())
}

fn data_dir(cfg: &config::Config) -> anyhow::Result<std::path::PathBuf> {
    if let Some(dir) = &cfg.data_dir {
        return Ok(dir.clone());
    }
    Ok(directories::ProjectDirs::from("", "", "keyrium")
        .ok_or_else(|| anyhow::anyhow!("cannot determine XDG data dir"))?
        .data_dir()
        .to_path_buf())
}

/// The at-rest key is generated once and kept next to the credentials. It
/// must never be compiled in; a fixed key would make the encryption
/// decorative.
fn load_or_create_store_key(
    path: &std::path::Path,
) -> anyhow::Result<[u8; store::STORE_KEY_LEN]> {
    use rand::Rng as _;

    if path.exists() {
        let bytes = std::fs::read(path)?;
        let key: [u8; store::STORE_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            anyhow::anyhow!(
                "{} is not a {}-byte key",
                path.display(),
                store::STORE_KEY_LEN
            )
        })?;
        Ok(key)
    } else {
        let key: [u8; store::STORE_KEY_LEN] = rand::thread_rng().r#gen();
        std::fs::write(path, key)?;
        Ok(key)
    }
}
