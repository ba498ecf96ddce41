use anyhow::Result;
use bulk_mailer::{
    domain::comms::{EmailAddress, Mailer, OutboundEmail},
    infrastructure::email::smtp::{SmtpConfig, SmtpMailer},
};
use clap::Parser;

#[derive(Parser)]
pub struct Args {
    #[clap(flatten)]
    pub smtp: SmtpConfig,

    /// The recipient address
    #[clap(long)]
    pub to: String,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mailer = SmtpMailer::new(args.smtp);

    let email = OutboundEmail::new(
        EmailAddress::new(&args.to)?,
        "Test email",
        "<p>Hello from the command line.</p>",
    )?;

    let message_id = mailer.send(&email).await.expect("Failed to send the email");

    println!("Sent message: {message_id}");

    Ok(())
}
