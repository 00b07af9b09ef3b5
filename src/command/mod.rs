//! Rule-based command interpretation.
//!
//! Utterances are loosely structured: numbers arrive as digits, words,
//! or ordinals, and every intent has synonyms. The grammar is a fixed
//! keyword priority list plus two number tables; table order is part of
//! the contract (first match wins), so both are plain const data rather
//! than anything cleverer.

/// Structured meaning of one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CheckInbox,
    /// Read a specific message; `None` when the user asked to read but
    /// no number could be extracted.
    ReadByIndex(Option<usize>),
    ReadNext,
    Compose,
    Search(String),
    Reply,
    MarkRead,
    Help,
    Quit,
    Unknown,
}

const ORDINALS: [(&str, i32); 21] = [
    ("zeroth", 0),
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("sixth", 6),
    ("seventh", 7),
    ("eighth", 8),
    ("ninth", 9),
    ("tenth", 10),
    ("eleventh", 11),
    ("twelfth", 12),
    ("thirteenth", 13),
    ("fourteenth", 14),
    ("fifteenth", 15),
    ("sixteenth", 16),
    ("seventeenth", 17),
    ("eighteenth", 18),
    ("nineteenth", 19),
    ("twentieth", 20),
];

const CARDINALS: [(&str, i32); 21] = [
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
];

/// Extract a message number from free text: the first digit run wins,
/// then ordinal words, then cardinal words, each matched whole-word in
/// table order. -1 when nothing matches.
pub fn extract_index(text: &str) -> i32 {
    let t = text.to_lowercase();

    let mut digits = String::new();
    for ch in t.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else if !digits.is_empty() {
            break;
        }
    }
    if !digits.is_empty() {
        if let Ok(n) = digits.parse::<i32>() {
            return n;
        }
    }

    for (word, n) in ORDINALS {
        if contains_word(&t, word) {
            return n;
        }
    }
    for (word, n) in CARDINALS {
        if contains_word(&t, word) {
            return n;
        }
    }
    -1
}

fn contains_word(text: &str, word: &str) -> bool {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(pos) = text[start..].find(word) {
        let begin = start + pos;
        let end = begin + word.len();
        let left_ok = begin == 0 || !bytes[begin - 1].is_ascii_alphanumeric();
        let right_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if left_ok && right_ok {
            return true;
        }
        start = begin + 1;
    }
    false
}

/// Map one utterance onto an [`Intent`].
///
/// Keywords are checked in fixed priority order; `has_listing` enables
/// the bare-number shortcut ("two" alone reads message two) once a
/// listing is on screen.
pub fn interpret(utterance: &str, has_listing: bool) -> Intent {
    let cmd = utterance.to_lowercase();
    let cmd = cmd.trim();

    if cmd.contains("help") || cmd.contains("what can") {
        return Intent::Help;
    }
    if cmd.contains("quit") || cmd.contains("exit") || cmd.contains("close") {
        return Intent::Quit;
    }
    if cmd.contains("check inbox") || cmd.contains("check my inbox") || cmd.contains("unread") {
        return Intent::CheckInbox;
    }
    if cmd.contains("read next") || cmd == "next" {
        return Intent::ReadNext;
    }
    if wants_read_by_number(cmd) {
        let n = extract_index(cmd);
        return Intent::ReadByIndex(if n < 0 { None } else { Some(n as usize) });
    }
    if cmd.contains("compose") || cmd.contains("new email") || cmd.contains("send email") {
        return Intent::Compose;
    }
    if cmd.contains("search for") || cmd.starts_with("search ") {
        return Intent::Search(search_query(cmd));
    }
    if cmd.contains("reply") {
        return Intent::Reply;
    }
    if cmd.contains("mark") && cmd.contains("read") {
        return Intent::MarkRead;
    }

    if has_listing {
        let n = extract_index(cmd);
        if n >= 0 {
            return Intent::ReadByIndex(Some(n as usize));
        }
    }

    Intent::Unknown
}

fn wants_read_by_number(cmd: &str) -> bool {
    cmd.contains("read number")
        || cmd.contains("read message")
        || cmd.contains("open number")
        || read_followed_by_digit(cmd)
}

fn read_followed_by_digit(cmd: &str) -> bool {
    let words: Vec<&str> = cmd
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .collect();
    words
        .windows(2)
        .any(|w| w[0] == "read" && w[1].starts_with(|c: char| c.is_ascii_digit()))
}

/// Text after the first "search", with standalone "for" words removed.
/// Whole-word removal on purpose: "search forward mail" must keep
/// "forward" intact.
fn search_query(cmd: &str) -> String {
    let rest = match cmd.split_once("search") {
        Some((_, rest)) => rest,
        None => return String::new(),
    };
    rest.split_whitespace()
        .filter(|w| *w != "for")
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
