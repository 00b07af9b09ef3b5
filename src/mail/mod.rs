pub mod acquire;
pub mod decoders;
pub mod gateway;
pub mod primary;
pub mod smtp;

pub use gateway::{ConnectionConfig, MailGateway};
pub use smtp::Mailer;
