use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    // --- Auth Args ---
    /// Secret used to sign and verify session tokens.
    #[arg(long, env = "JWT_SECRET", default_value = "your-secret-key-for-development")]
    pub jwt_secret: String,

    /// Session token lifetime in seconds (default 7 days).
    #[arg(long, env = "TOKEN_TTL_SECS", default_value = "604800")]
    pub token_ttl_secs: i64,

    // --- Streaming Simulator Args ---
    /// Fixed delay before the first streamed token, in milliseconds.
    #[arg(long, env = "STREAM_PREROLL_MS", default_value = "200")]
    pub stream_preroll_ms: u64,

    /// Base inter-token delay in milliseconds.
    #[arg(long, env = "STREAM_DELAY_MS", default_value = "50")]
    pub stream_delay_ms: u64,

    /// Upper bound of the random jitter added to each inter-token delay, in milliseconds.
    #[arg(long, env = "STREAM_JITTER_MS", default_value = "100")]
    pub stream_jitter_ms: u64,

    // --- TLS Args ---
    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
