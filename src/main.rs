mod command;
mod config;
mod contacts;
mod domain;
mod error;
mod mail;
mod session;
mod voice;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::contacts::ContactBook;
use crate::mail::{ConnectionConfig, MailGateway, Mailer};
use crate::session::SessionController;
use crate::voice::ConsoleVoice;

/// Voice-assisted email client: spoken inbox, spoken commands.
#[derive(Parser)]
#[command(name = "voxmail", version, about)]
struct Cli {
    /// Messages per inbox or search listing
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// List everything, not just primary-looking mail
    #[arg(long)]
    all: bool,

    /// Contact list: two-column CSV of name,email
    #[arg(long, default_value = "contacts.csv")]
    contacts: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = Config::from_env()?;
    if cfg.use_mic {
        // the speech engines are external; until one is wired into the
        // VoiceChannel seam, audio capture is unavailable
        log::warn!(
            "USE_MIC is set but no speech engine is linked; falling back to keyboard \
             (TTS_RATE={}, STT_LANG={})",
            cfg.tts_rate,
            cfg.stt_lang
        );
    }

    let gateway = MailGateway::new(ConnectionConfig {
        host: cfg.imap_host.clone(),
        port: cfg.imap_port,
        user: cfg.user.clone(),
        password: cfg.password.clone(),
    });
    let mailer = Mailer::new(&cfg.smtp_host, cfg.smtp_port, &cfg.user, &cfg.password)?;

    let contacts = ContactBook::load(&cli.contacts)?;
    if contacts.is_empty() {
        log::info!("no contacts loaded; compose will take spelled-out addresses only");
    } else {
        log::info!("loaded {} contacts", contacts.len());
    }

    let primary_only = cfg.primary_only && !cli.all;
    let mut session = SessionController::new(
        gateway,
        mailer,
        contacts,
        ConsoleVoice::new(),
        cli.limit,
        primary_only,
    );
    session.run();
    Ok(())
}
