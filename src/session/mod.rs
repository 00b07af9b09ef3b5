//! Session orchestration: owns the current listing, routes intents to
//! the mail gateway and voice channel, and runs the confirmation flows
//! for anything that sends or mutates.

use crate::command::{interpret, Intent};
use crate::contacts::ContactBook;
use crate::domain::{Listing, Uid};
use crate::error::MailError;
use crate::mail::decoders::NO_READABLE_BODY;
use crate::mail::smtp::DEFAULT_SUBJECT;
use crate::mail::{MailGateway, Mailer};
use crate::voice::{VoiceChannel, LISTEN_TIMEOUT};

/// Re-prompts for a missing utterance before an action is cancelled.
const CAPTURE_RETRIES: usize = 2;

/// Consecutive silent captures that end a dictation.
const MAX_DICTATION_SILENCE: usize = 3;

/// Longest stretch of a message body read aloud in one go.
const SPOKEN_BODY_LIMIT: usize = 1200;

pub struct SessionController<V: VoiceChannel> {
    gateway: MailGateway,
    mailer: Mailer,
    contacts: ContactBook,
    voice: V,
    limit: usize,
    primary_only: bool,

    listing: Listing,
    /// Next position for "read next"; reset on every new listing.
    cursor: usize,
    /// Most recently read message, the target of reply / mark as read.
    selected: Option<Uid>,
}

impl<V: VoiceChannel> SessionController<V> {
    pub fn new(
        gateway: MailGateway,
        mailer: Mailer,
        contacts: ContactBook,
        voice: V,
        limit: usize,
        primary_only: bool,
    ) -> Self {
        Self {
            gateway,
            mailer,
            contacts,
            voice,
            limit,
            primary_only,
            listing: Listing::default(),
            cursor: 0,
            selected: None,
        }
    }

    /// Command loop: capture, interpret, dispatch, until quit.
    pub fn run(&mut self) {
        self.voice.speak(
            "Welcome to your voice email. Say a command: check inbox, compose, search, help, or quit.",
        );
        loop {
            let heard = self.voice.listen(None, LISTEN_TIMEOUT);
            if heard.trim().is_empty() {
                self.voice.speak("I didn't catch that. Say help for options.");
                continue;
            }
            let intent = interpret(&heard, !self.listing.is_empty());
            log::debug!("utterance {heard:?} -> {intent:?}");
            if !self.dispatch(intent) {
                break;
            }
        }
        self.voice.stop();
    }

    /// Returns false when the session should end.
    fn dispatch(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::Help => self.voice.speak(
                "Commands are: check inbox, read number N, read next, compose, \
                 search for words, reply, mark as read, or quit.",
            ),
            Intent::Quit => {
                self.voice.speak("Goodbye.");
                return false;
            }
            Intent::CheckInbox => self.check_inbox(),
            Intent::ReadByIndex(n) => self.read_by_index(n),
            Intent::ReadNext => self.read_next(),
            Intent::Search(query) => self.search(&query),
            Intent::Compose => self.compose(),
            Intent::Reply => self.reply(),
            Intent::MarkRead => self.mark_read(),
            Intent::Unknown => self
                .voice
                .speak("Sorry, I don't know that command yet. Say help to hear options."),
        }
        true
    }

    /// Swap in a new listing; old display indices die here.
    fn replace_listing(&mut self, listing: Listing) {
        self.listing = listing;
        self.cursor = 0;
        self.selected = None;
    }

    fn check_inbox(&mut self) {
        match self.gateway.list_inbox(self.limit, self.primary_only) {
            Ok(listing) => {
                self.replace_listing(listing);
                if self.listing.is_empty() {
                    self.voice.speak(
                        "I didn't find any messages in your inbox. You can say compose \
                         to send a new email, or search for something.",
                    );
                    return;
                }
                self.voice.speak(&format!(
                    "I found {} messages. Say read number 1, or just say the number.",
                    self.listing.len()
                ));
                let summary = summarize(&self.listing);
                self.voice.speak(&summary);
            }
            Err(e) => self.report(&e),
        }
    }

    fn search(&mut self, query: &str) {
        if query.trim().is_empty() {
            self.voice.speak("Say search for, then a keyword.");
            return;
        }
        match self.gateway.search(query, self.limit) {
            Ok(listing) => {
                self.replace_listing(listing);
                if self.listing.is_empty() {
                    self.voice
                        .speak(&format!("I didn't find any messages for {query}."));
                    return;
                }
                self.voice.speak(&format!(
                    "Search found {} messages. Say read number 1, or just say the number.",
                    self.listing.len()
                ));
                let summary = summarize(&self.listing);
                self.voice.speak(&summary);
            }
            Err(e) => self.report(&e),
        }
    }

    fn read_by_index(&mut self, index: Option<usize>) {
        if self.listing.is_empty() {
            self.voice.speak("No list yet. Say check inbox or search first.");
            return;
        }
        let Some(index) = index else {
            self.voice
                .speak("Please say the message number, like read number two.");
            return;
        };
        let Some(uid) = self.listing.uid_at(index) else {
            self.voice.speak(
                "That number isn't in the current list. Say check inbox or search first.",
            );
            return;
        };
        self.read_message(uid);
    }

    fn read_next(&mut self) {
        if self.listing.is_empty() {
            self.voice.speak("No list yet. Say check inbox first.");
            return;
        }
        let Some(entry) = self.listing.get(self.cursor) else {
            self.voice.speak("No more messages.");
            return;
        };
        let uid = entry.uid;
        self.cursor += 1;
        self.read_message(uid);
    }

    fn read_message(&mut self, uid: Uid) {
        let msg = match self.gateway.fetch(uid) {
            Ok(msg) => msg,
            Err(e) => {
                self.report(&e);
                return;
            }
        };
        self.selected = Some(uid);

        let subject = if msg.subject.is_empty() {
            "no subject"
        } else {
            &msg.subject
        };
        self.voice.speak(&format!(
            "From {}. Subject: {}. Here is the message:",
            msg.from, subject
        ));
        let body = if msg.body.is_empty() {
            NO_READABLE_BODY
        } else {
            &msg.body
        };
        let excerpt = excerpt(body, SPOKEN_BODY_LIMIT);
        self.voice.speak(&excerpt);

        if self.confirm("Mark this as read?") {
            match self.gateway.mark_seen(uid) {
                Ok(()) => self.voice.speak("Marked as read."),
                Err(e) => {
                    log::error!("mark_seen failed for UID {uid}: {e}");
                    self.voice.speak("Could not mark as read.");
                }
            }
        }
    }

    fn mark_read(&mut self) {
        let Some(uid) = self.current_uid() else {
            self.voice
                .speak("No current message to mark. Say read number N first.");
            return;
        };
        match self.gateway.mark_seen(uid) {
            Ok(()) => self.voice.speak("Marked as read."),
            Err(e) => {
                log::error!("mark_seen failed for UID {uid}: {e}");
                self.voice.speak("Could not mark as read.");
            }
        }
    }

    fn compose(&mut self) {
        let Some(who) = self.hear_or_retry(
            "Who do you want to email? You can say a name in your contacts or spell an address.",
        ) else {
            return;
        };

        let mut to = if who.contains('@') {
            normalize_address(&who)
        } else {
            self.contacts.resolve(&who).map(String::from).unwrap_or_default()
        };
        if to.is_empty() {
            let Some(heard) =
                self.hear_or_retry("I could not find that contact. Please say the email address.")
            else {
                return;
            };
            to = normalize_address(&heard);
        }
        if !to.contains('@') {
            let Some(heard) = self.hear_or_retry(
                "I need a full email address. Please say it, like alex at gmail dot com.",
            ) else {
                return;
            };
            to = normalize_address(&heard);
            if !to.contains('@') {
                self.voice.speak("Still not a valid email. Cancelled.");
                return;
            }
        }

        let subject = self
            .hear_or_retry("What is the subject?")
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
        self.voice.speak(&format!("You said subject: {subject}."));

        self.voice
            .speak("Speak your message. Say stop message when you are done.");
        let Some(body) = self.dictate() else {
            return;
        };
        self.voice.speak("Here is your message:");
        let readback = excerpt(&body, 1000);
        self.voice.speak(&readback);

        if self.confirm(&format!("Send to {to}?")) {
            match self.mailer.send(&to, &subject, &body) {
                Ok(()) => self.voice.speak("Sent."),
                Err(e) => {
                    log::error!("send to {to} failed: {e}");
                    self.voice.speak("Sending failed. Check your SMTP settings.");
                }
            }
        } else {
            self.voice.speak("Cancelled.");
        }
    }

    fn reply(&mut self) {
        let Some(uid) = self.current_uid() else {
            self.voice.speak("No message selected. Say read number N first.");
            return;
        };
        let msg = match self.gateway.fetch(uid) {
            Ok(msg) => msg,
            Err(e) => {
                self.report(&e);
                return;
            }
        };
        let to = reply_address(&msg.from);
        if !to.contains('@') {
            self.voice.speak("I couldn't detect a reply address. Cancelled.");
            return;
        }
        self.voice.speak(&format!(
            "Replying to {to}. Speak your message; say stop message when done."
        ));
        let Some(body) = self.dictate() else {
            return;
        };
        let base = if msg.subject.is_empty() {
            DEFAULT_SUBJECT
        } else {
            &msg.subject
        };
        let subject = format!("Re: {base}");

        if self.confirm(&format!("Send reply to {to}?")) {
            match self.mailer.send(&to, &subject, &body) {
                Ok(()) => self.voice.speak("Reply sent."),
                Err(e) => {
                    log::error!("reply to {to} failed: {e}");
                    self.voice.speak("Sending failed.");
                }
            }
        } else {
            self.voice.speak("Cancelled.");
        }
    }

    /// Target for reply / mark as read: the last message read aloud,
    /// else the first entry of the current listing.
    fn current_uid(&self) -> Option<Uid> {
        self.selected.or_else(|| self.listing.get(0).map(|e| e.uid))
    }

    /// Prompt until something is heard, with a bounded number of
    /// retries; `None` means the whole action is cancelled.
    fn hear_or_retry(&mut self, prompt: &str) -> Option<String> {
        for attempt in 0..=CAPTURE_RETRIES {
            let full;
            let p = if attempt == 0 {
                prompt
            } else {
                full = format!("Sorry, I didn't catch that. {prompt}");
                &full
            };
            let heard = self.voice.listen(Some(p), LISTEN_TIMEOUT);
            if !heard.trim().is_empty() {
                return Some(heard.trim().to_string());
            }
        }
        self.voice.speak("I couldn't hear you. Cancelled.");
        None
    }

    /// Explicit affirmative gate before anything destructive or sent.
    fn confirm(&mut self, phrase: &str) -> bool {
        let prompt = format!("{phrase} Say yes or no.");
        let Some(answer) = self.hear_or_retry(&prompt) else {
            return false;
        };
        let answer = answer.to_lowercase();
        answer.contains("yes") || answer.trim() == "y"
    }

    /// Capture a message body line by line until a stop phrase.
    /// Sustained silence cancels rather than looping forever.
    fn dictate(&mut self) -> Option<String> {
        let mut lines = Vec::new();
        let mut silent = 0;
        loop {
            let line = self.voice.listen(None, LISTEN_TIMEOUT);
            if line.trim().is_empty() {
                silent += 1;
                if silent >= MAX_DICTATION_SILENCE {
                    self.voice.speak("I couldn't hear you. Cancelled.");
                    return None;
                }
                continue;
            }
            silent = 0;
            let lower = line.to_lowercase();
            if lower.contains("stop message") || lower.contains("full stop") {
                break;
            }
            lines.push(line);
        }
        Some(lines.join("\n"))
    }

    fn report(&mut self, err: &MailError) {
        log::error!("{err}");
        let spoken = match err {
            MailError::Transport(_) => "I couldn't reach your mail server. Please try again.",
            MailError::Auth(_) => "Your email login was rejected. Please check your credentials.",
            MailError::Send(_) => "Sending failed. Check your SMTP settings.",
        };
        self.voice.speak(spoken);
    }
}

/// Spoken one-line inbox summary: "1. sender: subject | 2. ...".
fn summarize(listing: &Listing) -> String {
    let lines: Vec<String> = listing
        .entries()
        .iter()
        .map(|e| {
            let subject = if e.subject.is_empty() {
                DEFAULT_SUBJECT
            } else {
                &e.subject
            };
            format!("{}. {}: {}", e.index, e.from, subject)
        })
        .collect();
    if lines.is_empty() {
        "No messages found.".to_string()
    } else {
        lines.join(" | ")
    }
}

/// Turn a spoken address into something sendable:
/// "alex at gmail dot com" -> "alex@gmail.com".
fn normalize_address(spoken: &str) -> String {
    spoken
        .trim()
        .replace(" at ", "@")
        .replace(" dot ", ".")
        .replace(' ', "")
}

/// Bare address out of a From header: the angle-bracket form when
/// present, else the last whitespace-separated token.
fn reply_address(from: &str) -> String {
    if let Some(start) = from.find('<') {
        if let Some(len) = from[start + 1..].find('>') {
            return from[start + 1..start + 1 + len].to_string();
        }
    }
    from.split_whitespace().last().unwrap_or("").to_string()
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::ConnectionConfig;
    use crate::voice::ScriptedVoice;

    fn controller(replies: &[&str]) -> SessionController<ScriptedVoice> {
        let gateway = MailGateway::new(ConnectionConfig {
            host: "imap.example.com".to_string(),
            port: 993,
            user: "me@example.com".to_string(),
            password: "pw".to_string(),
        });
        let mailer = Mailer::new("smtp.example.com", 465, "me@example.com", "pw").unwrap();
        SessionController::new(
            gateway,
            mailer,
            ContactBook::default(),
            ScriptedVoice::new(replies),
            10,
            true,
        )
    }

    #[test]
    fn normalize_spoken_addresses() {
        assert_eq!(normalize_address("alex at gmail dot com"), "alex@gmail.com");
        assert_eq!(normalize_address(" bob@host.org "), "bob@host.org");
        assert_eq!(normalize_address("a b at c dot d"), "ab@c.d");
    }

    #[test]
    fn reply_address_prefers_angle_brackets() {
        assert_eq!(reply_address("Alice <alice@example.com>"), "alice@example.com");
        assert_eq!(reply_address("bob@example.com"), "bob@example.com");
        assert_eq!(reply_address("Mr. Bob bob@example.com"), "bob@example.com");
    }

    #[test]
    fn excerpt_truncates_by_chars() {
        assert_eq!(excerpt("hello", 3), "hel");
        assert_eq!(excerpt("héllo", 2), "hé");
    }

    #[test]
    fn confirm_accepts_yes_variants() {
        let mut c = controller(&["yes please"]);
        assert!(c.confirm("Send it?"));
        let mut c = controller(&["y"]);
        assert!(c.confirm("Send it?"));
        let mut c = controller(&["no way"]);
        assert!(!c.confirm("Send it?"));
    }

    #[test]
    fn confirm_cancels_after_bounded_silence() {
        let mut c = controller(&["", "", ""]);
        assert!(!c.confirm("Send it?"));
        assert!(c.voice.spoken.iter().any(|s| s.contains("Cancelled")));
    }

    #[test]
    fn hear_or_retry_reprompts_then_succeeds() {
        let mut c = controller(&["", "second try"]);
        assert_eq!(c.hear_or_retry("Speak."), Some("second try".to_string()));
        assert!(c.voice.spoken.iter().any(|s| s.contains("didn't catch")));
    }

    #[test]
    fn dictation_ends_on_stop_phrase() {
        let mut c = controller(&["line one", "line two", "stop message"]);
        assert_eq!(c.dictate(), Some("line one\nline two".to_string()));
        let mut c = controller(&["only line", "full stop please"]);
        assert_eq!(c.dictate(), Some("only line".to_string()));
    }

    #[test]
    fn dictation_cancels_on_sustained_silence() {
        let mut c = controller(&["", "", ""]);
        assert_eq!(c.dictate(), None);
    }

    #[test]
    fn read_without_listing_is_a_spoken_error() {
        let mut c = controller(&[]);
        c.read_by_index(Some(1));
        assert!(c.voice.spoken.iter().any(|s| s.contains("No list yet")));
    }

    #[test]
    fn empty_search_query_reprompts_without_searching() {
        let mut c = controller(&[]);
        c.search("   ");
        assert!(c
            .voice
            .spoken
            .iter()
            .any(|s| s.contains("Say search for, then a keyword")));
    }

    #[test]
    fn summarize_lists_by_display_index() {
        use crate::domain::MessageSummary;
        let listing = Listing::from_summaries(vec![
            MessageSummary {
                index: 0,
                uid: 42,
                from: "Alice".to_string(),
                subject: "lunch".to_string(),
                date: String::new(),
            },
            MessageSummary {
                index: 0,
                uid: 41,
                from: "Bob".to_string(),
                subject: String::new(),
                date: String::new(),
            },
        ]);
        let spoken = summarize(&listing);
        assert_eq!(spoken, "1. Alice: lunch | 2. Bob: (no subject)");
    }
}
