use anyhow::{anyhow, Result};
use std::env;

/// Everything read from the environment (a `.env` file is folded in by
/// `dotenvy` before this runs). Immutable after construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub imap_host: String,
    pub imap_port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub user: String,
    pub password: String,

    pub use_mic: bool,
    pub tts_rate: u32,
    pub stt_lang: String,
    pub primary_only: bool,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Missing credentials are fatal; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let user = env::var("EMAIL_USER")
            .map_err(|_| anyhow!("EMAIL_USER not set; add it to your environment or .env"))?;
        let password = env::var("EMAIL_PASS")
            .map_err(|_| anyhow!("EMAIL_PASS not set; add it to your environment or .env"))?;

        Ok(Self {
            imap_host: var_or("IMAP_HOST", "imap.gmail.com"),
            imap_port: parse_var("IMAP_PORT", 993),
            smtp_host: var_or("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: parse_var("SMTP_PORT", 465),
            user,
            password,
            use_mic: var_or("USE_MIC", "1") == "1",
            tts_rate: parse_var("TTS_RATE", 180),
            stt_lang: var_or("STT_LANG", "en-US"),
            primary_only: var_or("PRIMARY_ONLY", "1") == "1",
        })
    }
}
