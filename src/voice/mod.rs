//! Voice boundary: spoken output, captured input, keyboard fallback.
//!
//! The speech engines themselves are external; this trait is the seam
//! they plug into. The console channel ships in-tree so the client is
//! usable anywhere: it renders speech as prefixed text and takes
//! utterances from stdin.

use std::io::{BufRead, Write};
use std::time::Duration;

/// Capture window for one utterance.
pub const LISTEN_TIMEOUT: Duration = Duration::from_secs(7);

pub trait VoiceChannel {
    /// Render `text` audibly; no-op on empty text. Returns when
    /// playback is done.
    fn speak(&mut self, text: &str);

    /// Speak `prompt` if given, then capture one utterance within
    /// `timeout`. Empty string means nothing usable was heard; that is
    /// never an error.
    fn listen(&mut self, prompt: Option<&str>, timeout: Duration) -> String;

    /// Interrupt any in-progress speech.
    fn stop(&mut self);
}

/// Keyboard-backed channel: speech is printed, utterances are typed.
/// `listen` blocks on stdin rather than honoring the timeout; that is
/// the documented behavior of keyboard fallback.
pub struct ConsoleVoice;

impl ConsoleVoice {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleVoice {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceChannel for ConsoleVoice {
    fn speak(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        println!("[voice] {text}");
    }

    fn listen(&mut self, prompt: Option<&str>, _timeout: Duration) -> String {
        if let Some(p) = prompt {
            self.speak(p);
        }
        print!("you> ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => String::new(), // EOF reads as "nothing heard"
            Ok(_) => line.trim().to_string(),
        }
    }

    fn stop(&mut self) {}
}

/// Scripted channel for exercising session flows in tests: replies are
/// served in order, spoken lines are recorded.
#[cfg(test)]
pub struct ScriptedVoice {
    pub replies: std::collections::VecDeque<String>,
    pub spoken: Vec<String>,
}

#[cfg(test)]
impl ScriptedVoice {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            spoken: Vec::new(),
        }
    }
}

#[cfg(test)]
impl VoiceChannel for ScriptedVoice {
    fn speak(&mut self, text: &str) {
        if !text.is_empty() {
            self.spoken.push(text.to_string());
        }
    }

    fn listen(&mut self, prompt: Option<&str>, _timeout: Duration) -> String {
        if let Some(p) = prompt {
            self.speak(p);
        }
        self.replies.pop_front().unwrap_or_default()
    }

    fn stop(&mut self) {}
}
