//! Outbound email contracts and value objects.

mod email_address;
mod message;

pub mod errors;
pub mod mailer;

pub use email_address::{EmailAddress, EmailAddressError};
pub use mailer::Mailer;
pub use message::OutboundEmail;
