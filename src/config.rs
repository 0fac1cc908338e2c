pub const AAGUID: [u8; 16] = [
    0x4b, 0x59, 0x52, 0x6d, 0x8a, 0x01, 0x47, 0xd3, 0x9e, 0x5c, 0x21, 0xaf, 0x00, 0x00, 0x00, 0x01,
];
pub const MAX_USER_HANDLE_LEN: usize = 64;
pub const CONSENT_DIALOG_TIMEOUT_SECS: u64 = 30;

#[derive(clap::Parser, Debug, Clone)]
pub struct Config {
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Web origin the client acts for.
    #[arg(long, default_value = "https://example.org")]
    pub origin: String,
    /// Relying party id; the origin host or a parent domain of it.
    #[arg(long, default_value = "example.org")]
    pub rp_id: String,
    #[arg(long, default_value = "Example")]
    pub rp_name: String,
    #[arg(long, default_value = "john")]
    pub user_name: String,
    #[arg(long, default_value = "John")]
    pub display_name: String,
    /// User handle, stored as raw bytes.
    #[arg(long, default_value = "12345")]
    pub user_id: String,
    /// Ask for a discoverable (resident) credential.
    #[arg(long)]
    pub resident: bool,
    /// Ceremony timeout in milliseconds. Unset means wait forever.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Approve consent automatically instead of showing a pinentry dialog.
    #[arg(long)]
    pub headless: bool,
    #[arg(long, default_value = "pinentry")]
    pub pinentry: String,
    /// Override the data directory (defaults to the platform data dir).
    #[arg(long)]
    pub data_dir: Option<std::path::PathBuf>,
    /// Delete all stored credentials and the store key, then exit.
    #[arg(long)]
    pub wipe: bool,
}
