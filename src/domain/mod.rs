pub mod message;

pub use message::{FullMessage, Listing, MessageSummary, Uid};
