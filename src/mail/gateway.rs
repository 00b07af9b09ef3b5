use chrono::{Duration, Utc};
use native_tls::TlsConnector;
use std::net::TcpStream;

use crate::domain::{FullMessage, Listing, Uid};
use crate::error::{MailError, MailResult};
use crate::mail::acquire::{
    assemble_listing, stage_cap, Candidate, RECENT_CAP_FLOOR, UNSEEN_CAP_FLOOR,
};
use crate::mail::decoders::{extract_body, header_value};
use crate::mail::primary::is_primary;

type ImapSession = imap::Session<native_tls::TlsStream<TcpStream>>;

/// Messages older than this are ignored by the recent fallback stage.
const RECENT_WINDOW_DAYS: i64 = 60;

/// IMAP endpoint and credentials. Immutable once built; owned by the
/// gateway.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// IMAP read path: inbox listing, search, fetch, and flagging.
///
/// One lazily established session, reused across calls. Not designed
/// for concurrent use; callers run at most one operation at a time.
/// After a transport failure the session is dropped so the next
/// user-initiated call reconnects; nothing is retried automatically.
pub struct MailGateway {
    config: ConnectionConfig,
    session: Option<ImapSession>,
}

impl MailGateway {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    fn connect(&self) -> MailResult<ImapSession> {
        log::info!("connecting to {}:{}", self.config.host, self.config.port);
        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;
        let client = imap::connect(
            (self.config.host.as_str(), self.config.port),
            self.config.host.as_str(),
            &tls,
        )
        .map_err(|e| MailError::Transport(e.to_string()))?;
        client
            .login(&self.config.user, &self.config.password)
            .map_err(|(e, _client)| MailError::Auth(e.to_string()))
    }

    fn session(&mut self) -> MailResult<&mut ImapSession> {
        if self.session.is_none() {
            let session = self.connect()?;
            self.session = Some(session);
        }
        self.session
            .as_mut()
            .ok_or_else(|| MailError::Transport("no session".to_string()))
    }

    /// Run one operation against the live session, dropping the session
    /// on failure so the next call starts from a fresh connection.
    fn run<T>(&mut self, op: impl FnOnce(&mut ImapSession) -> MailResult<T>) -> MailResult<T> {
        let result = op(self.session()?);
        if result.is_err() {
            self.session = None;
        }
        result
    }

    /// Tiered inbox listing: unseen messages first; when there are
    /// none, anything from the last 60 days; when that query fails or
    /// comes back empty, the whole mailbox. Candidates are newest
    /// first; the primary filter and truncation happen in
    /// [`assemble_listing`].
    pub fn list_inbox(&mut self, limit: usize, primary_only: bool) -> MailResult<Listing> {
        self.run(|session| {
            session.select("INBOX").map_err(transport)?;

            let mut uids: Vec<Uid> = match session.uid_search("UNSEEN") {
                Ok(set) => set.into_iter().collect(),
                Err(e) => {
                    log::warn!("UNSEEN search failed: {e}");
                    Vec::new()
                }
            };

            let cap = if uids.is_empty() {
                let since = (Utc::now() - Duration::days(RECENT_WINDOW_DAYS)).format("%d-%b-%Y");
                uids = match session.uid_search(format!("SINCE {since}")) {
                    Ok(set) if !set.is_empty() => set.into_iter().collect(),
                    _ => session
                        .uid_search("ALL")
                        .map_err(transport)?
                        .into_iter()
                        .collect(),
                };
                log::debug!("no unseen mail, falling back to {} recent messages", uids.len());
                stage_cap(limit, RECENT_CAP_FLOOR)
            } else {
                log::debug!("listing from {} unseen messages", uids.len());
                stage_cap(limit, UNSEEN_CAP_FLOOR)
            };

            uids.sort_unstable_by(|a, b| b.cmp(a));
            uids.truncate(cap);

            let candidates = fetch_candidates(session, &uids);
            Ok(assemble_listing(candidates, limit, primary_only))
        })
    }

    /// Subject-or-sender substring search, newest first, capped at
    /// `limit`. No matches is an empty listing, not an error.
    pub fn search(&mut self, query: &str, limit: usize) -> MailResult<Listing> {
        // double quotes would break the quoted search atoms
        let query = query.replace('"', "");
        self.run(move |session| {
            session.select("INBOX").map_err(transport)?;
            let criteria = format!("OR SUBJECT \"{query}\" FROM \"{query}\"");
            let mut uids: Vec<Uid> = session
                .uid_search(criteria)
                .map_err(transport)?
                .into_iter()
                .collect();
            uids.sort_unstable_by(|a, b| b.cmp(a));
            uids.truncate(limit);
            let candidates = fetch_candidates(session, &uids);
            Ok(assemble_listing(candidates, limit, false))
        })
    }

    /// Fetch sender, subject, and best-effort body for one message.
    /// Missing data yields empty fields; only connection failures err.
    pub fn fetch(&mut self, uid: Uid) -> MailResult<FullMessage> {
        self.run(move |session| {
            session.select("INBOX").map_err(transport)?;
            let fetches = match session.uid_fetch(uid.to_string(), "BODY.PEEK[]") {
                Ok(f) => f,
                Err(e) => {
                    log::warn!("fetch of UID {uid} failed: {e}");
                    return Ok(FullMessage::default());
                }
            };
            let Some(raw) = fetches.iter().next().and_then(|f| f.body()) else {
                log::warn!("UID {uid}: server returned no body data");
                return Ok(FullMessage::default());
            };
            let Ok(mail) = mailparse::parse_mail(raw) else {
                return Ok(FullMessage::default());
            };
            Ok(FullMessage {
                from: header_value(&mail, "From"),
                subject: header_value(&mail, "Subject"),
                body: extract_body(&mail),
            })
        })
    }

    /// Add `\Seen` to a message. Adding a flag the message already
    /// carries is a server-side no-op, so this is idempotent.
    pub fn mark_seen(&mut self, uid: Uid) -> MailResult<()> {
        self.run(move |session| {
            session.select("INBOX").map_err(transport)?;
            session
                .uid_store(uid.to_string(), "+FLAGS (\\Seen)")
                .map_err(transport)?;
            Ok(())
        })
    }
}

impl Drop for MailGateway {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            let _ = session.logout();
        }
    }
}

fn transport(e: imap::Error) -> MailError {
    MailError::Transport(e.to_string())
}

/// Fetch and decode headers for each candidate UID, skipping any whose
/// fetch or parse fails. Order of `uids` is preserved.
fn fetch_candidates(session: &mut ImapSession, uids: &[Uid]) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(uids.len());
    for &uid in uids {
        let fetches = match session.uid_fetch(uid.to_string(), "RFC822.HEADER") {
            Ok(f) => f,
            Err(e) => {
                log::warn!("header fetch for UID {uid} failed: {e}");
                continue;
            }
        };
        let Some(raw) = fetches.iter().next().and_then(|f| f.header()) else {
            continue;
        };
        let Ok(mail) = mailparse::parse_mail(raw) else {
            continue;
        };
        out.push(Candidate {
            uid,
            from: header_value(&mail, "From"),
            subject: header_value(&mail, "Subject"),
            date: header_value(&mail, "Date"),
            primary: is_primary(&mail),
        });
    }
    out
}
