//! Heuristic stand-in for the mail provider's "Primary" tab.
//!
//! The real tab assignment is not exposed over plain IMAP, so this
//! classifies on standard bulk-mail markers only. Transactional mail
//! without any of the markers will pass as primary; that is accepted.

use mailparse::ParsedMail;

use crate::mail::decoders::header_value;

/// `X-Mailer` fingerprints of common bulk-sending platforms.
const BULK_MAILERS: &[&str] = &["sendgrid", "mailchimp", "postmark"];

/// True when the message looks like personal or transactional mail
/// rather than a newsletter, list post, or auto-generated notice.
/// Pure function of the headers.
pub fn is_primary(mail: &ParsedMail) -> bool {
    if !header_value(mail, "List-Unsubscribe").is_empty() {
        return false;
    }
    if !header_value(mail, "List-Id").is_empty() {
        return false;
    }
    let precedence = header_value(mail, "Precedence").to_lowercase();
    if matches!(precedence.as_str(), "bulk" | "list" | "auto_reply") {
        return false;
    }
    let auto_submitted = header_value(mail, "Auto-Submitted").to_lowercase();
    if !auto_submitted.is_empty() && auto_submitted != "no" {
        return false;
    }
    let mailer = header_value(mail, "X-Mailer").to_lowercase();
    if BULK_MAILERS.iter().any(|m| mailer.contains(m)) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(headers: &str) -> bool {
        let raw = format!("{headers}\r\n\r\nbody\r\n");
        is_primary(&mailparse::parse_mail(raw.as_bytes()).expect("test message parses"))
    }

    #[test]
    fn plain_personal_mail_is_primary() {
        assert!(classify(
            "From: alice@example.com\r\nSubject: lunch?"
        ));
    }

    #[test]
    fn unsubscribe_header_means_bulk() {
        assert!(!classify(
            "From: news@shop.com\r\nList-Unsubscribe: <mailto:u@shop.com>"
        ));
    }

    #[test]
    fn list_id_means_bulk() {
        assert!(!classify("From: dev@l.org\r\nList-Id: <dev.l.org>"));
    }

    #[test]
    fn precedence_values() {
        assert!(!classify("Precedence: Bulk"));
        assert!(!classify("Precedence: list"));
        assert!(!classify("Precedence: auto_reply"));
        assert!(classify("Precedence: first-class"));
    }

    #[test]
    fn auto_submitted_values() {
        assert!(!classify("Auto-Submitted: auto-generated"));
        assert!(classify("Auto-Submitted: no"));
        assert!(classify("Auto-Submitted: No"));
    }

    #[test]
    fn bulk_mailer_fingerprint() {
        assert!(!classify("X-Mailer: SendGrid v7"));
        assert!(!classify("X-Mailer: MailChimp Mailer"));
        assert!(classify("X-Mailer: Thunderbird 128"));
    }

    #[test]
    fn deterministic_for_same_headers() {
        let headers = "From: a@b.c\r\nList-Unsubscribe: <mailto:x@y.z>";
        assert_eq!(classify(headers), classify(headers));
    }
}
