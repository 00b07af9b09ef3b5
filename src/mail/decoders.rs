use mailparse::{DispositionType, MailHeaderMap, ParsedMail};

/// Literal body placeholder when no part of a message could be read.
pub const NO_READABLE_BODY: &str = "(no readable body)";

/// Decoded value of the first header with the given name, or an empty
/// string when absent. `mailparse` decodes RFC 2047 encoded words in
/// `get_value`; undecodable input comes back as the raw header text,
/// which is exactly the fallback we want.
pub fn header_value(mail: &ParsedMail, name: &str) -> String {
    mail.headers
        .get_first_value(name)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Best-effort plain-text body of a parsed message.
///
/// Scans parts in document order for the first `text/plain` part that is
/// not an attachment; failing that, the first `text/html` part with tags
/// stripped; failing that, the `"(no readable body)"` marker. A part
/// whose transfer decoding fails is skipped and the scan continues.
pub fn extract_body(mail: &ParsedMail) -> String {
    let mut parts = Vec::new();
    collect_parts(mail, &mut parts);

    for part in &parts {
        if part.ctype.mimetype.eq_ignore_ascii_case("text/plain")
            && part.get_content_disposition().disposition != DispositionType::Attachment
        {
            if let Ok(text) = part.get_body() {
                return text;
            }
        }
    }

    for part in &parts {
        if part.ctype.mimetype.eq_ignore_ascii_case("text/html") {
            if let Ok(html) = part.get_body() {
                return strip_tags(&html);
            }
        }
    }

    NO_READABLE_BODY.to_string()
}

fn collect_parts<'a, 'b>(part: &'b ParsedMail<'a>, out: &mut Vec<&'b ParsedMail<'a>>) {
    out.push(part);
    for sub in &part.subparts {
        collect_parts(sub, out);
    }
}

/// Non-semantic tag strip: drops everything between `<` and `>`.
/// Entities are left alone, scripts and styles are not special-cased.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> mailparse::ParsedMail<'_> {
        mailparse::parse_mail(raw.as_bytes()).expect("test message parses")
    }

    #[test]
    fn strip_tags_basic() {
        assert_eq!(strip_tags("<p>Hi</p>"), "Hi");
        assert_eq!(strip_tags("a <b>bold</b> move"), "a bold move");
        assert_eq!(strip_tags("no markup"), "no markup");
    }

    #[test]
    fn single_part_plain() {
        let raw = "From: a@example.com\r\nContent-Type: text/plain\r\n\r\nhello there\r\n";
        assert_eq!(extract_body(&parse(raw)).trim(), "hello there");
    }

    #[test]
    fn html_only_is_stripped() {
        let raw = "Content-Type: text/html\r\n\r\n<p>Hi</p>\r\n";
        assert_eq!(extract_body(&parse(raw)).trim(), "Hi");
    }

    #[test]
    fn multipart_prefers_plain_over_html() {
        let raw = concat!(
            "Content-Type: multipart/alternative; boundary=\"b\"\r\n\r\n",
            "--b\r\nContent-Type: text/html\r\n\r\n<b>rich</b>\r\n",
            "--b\r\nContent-Type: text/plain\r\n\r\nplain wins\r\n",
            "--b--\r\n",
        );
        assert_eq!(extract_body(&parse(raw)).trim(), "plain wins");
    }

    #[test]
    fn attachment_plain_part_is_skipped() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"b\"\r\n\r\n",
            "--b\r\nContent-Type: text/plain\r\n",
            "Content-Disposition: attachment; filename=\"notes.txt\"\r\n\r\n",
            "attached text\r\n",
            "--b\r\nContent-Type: text/html\r\n\r\n<p>inline html</p>\r\n",
            "--b--\r\n",
        );
        assert_eq!(extract_body(&parse(raw)).trim(), "inline html");
    }

    #[test]
    fn no_readable_part_yields_marker() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"b\"\r\n\r\n",
            "--b\r\nContent-Type: application/pdf\r\n",
            "Content-Disposition: attachment\r\n\r\nBINARY\r\n",
            "--b--\r\n",
        );
        assert_eq!(extract_body(&parse(raw)), NO_READABLE_BODY);
    }

    #[test]
    fn header_value_decodes_encoded_words() {
        let raw =
            "From: =?utf-8?q?Caf=C3=A9?= <cafe@example.com>\r\nSubject: =?utf-8?q?hello?=\r\n\r\n";
        let mail = parse(raw);
        assert_eq!(header_value(&mail, "Subject"), "hello");
        assert!(header_value(&mail, "From").contains("Café"));
        assert_eq!(header_value(&mail, "Reply-To"), "");
    }
}
