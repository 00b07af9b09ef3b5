use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::error::{MailError, MailResult};

/// Spoken subject default when the user dictates nothing.
pub const DEFAULT_SUBJECT: &str = "(no subject)";

/// SMTP write path: one plain-text message per call over an implicit-TLS
/// submission channel. Nothing is retried; a failed send surfaces as
/// [`MailError::Send`] and the caller recomposes.
pub struct Mailer {
    transport: SmtpTransport,
    from: String,
}

impl Mailer {
    pub fn new(host: &str, port: u16, user: &str, password: &str) -> MailResult<Self> {
        let creds = Credentials::new(user.to_string(), password.to_string());
        let transport = SmtpTransport::relay(host)
            .map_err(|e| MailError::Send(e.to_string()))?
            .credentials(creds)
            .port(port)
            .build();
        Ok(Self {
            transport,
            from: user.to_string(),
        })
    }

    pub fn send(&self, to: &str, subject: &str, body: &str) -> MailResult<()> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::Send(e.to_string()))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::Send(e.to_string()))?;

        let subject = if subject.trim().is_empty() {
            DEFAULT_SUBJECT
        } else {
            subject
        };

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Send(e.to_string()))?;

        self.transport
            .send(&message)
            .map_err(|e| MailError::Send(e.to_string()))?;
        Ok(())
    }
}
