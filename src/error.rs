use thiserror::Error;

/// Failures crossing the mail boundary. Decode and format problems never
/// surface here; they are absorbed with fallback values at the point of
/// decoding. Only transport, authentication, and submission failures are
/// worth a typed error, because the session layer speaks them differently.
#[derive(Error, Debug)]
pub enum MailError {
    /// Connection or protocol failure talking to the IMAP server.
    #[error("mail server error: {0}")]
    Transport(String),

    /// Login rejected by the server.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// SMTP submission failure; the composed message is not lost, the
    /// caller may recompose and retry.
    #[error("sending failed: {0}")]
    Send(String),
}

pub type MailResult<T> = std::result::Result<T, MailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_cause() {
        let err = MailError::Transport("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
        let err = MailError::Send("relay rejected".to_string());
        assert!(err.to_string().contains("sending failed"));
    }
}
