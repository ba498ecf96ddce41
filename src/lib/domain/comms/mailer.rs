//! Mail transport client module

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::comms::{errors::MailerError, OutboundEmail};

/// Mail transport client
#[async_trait]
pub trait Mailer: Clone + Send + Sync + 'static {
    /// Check that the transport can reach and authenticate with its server.
    ///
    /// # Returns
    /// `true` when the connection handshake succeeds, `false` otherwise.
    async fn verify(&self) -> bool;

    /// Send an email.
    ///
    /// # Arguments
    /// * `email` - The [`OutboundEmail`] to deliver.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the message id assigned to the
    /// email, or an [`Err`] containing a [`MailerError`] if it could not be sent.
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    impl Clone for Mailer {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl Mailer for Mailer {
        async fn verify(&self) -> bool;
        async fn send(&self, email: &OutboundEmail) -> Result<String, MailerError>;
    }
}
