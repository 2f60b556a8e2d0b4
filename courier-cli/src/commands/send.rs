//! Send command - dispatch one message with failover.

use anyhow::Result;
use clap::Args;
use courier_core::{MessagePayload, MessageType, OutgoingMessage, Recipient};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::runtime::Runtime;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the send command.
#[derive(Args)]
pub struct SendArgs {
    /// Message type: verification, password_reset, or a custom name.
    #[arg(long = "type", short = 't')]
    pub message_type: String,

    /// Recipient address.
    #[arg(long)]
    pub to: String,

    /// Subject line.
    #[arg(long, short)]
    pub subject: String,

    /// Plain-text body.
    #[arg(long)]
    pub text: Option<String>,

    /// HTML body.
    #[arg(long)]
    pub html: Option<String>,
}

impl SendArgs {
    /// Validates the arguments into a message.
    pub fn message(&self) -> Result<OutgoingMessage> {
        let message_type = MessageType::parse(&self.message_type)?;
        let recipient = Recipient::parse(&self.to)?;

        let mut payload = MessagePayload::new(self.subject.clone());
        if let Some(text) = &self.text {
            payload = payload.with_text(text.clone());
        }
        if let Some(html) = &self.html {
            payload = payload.with_html(html.clone());
        }
        if payload.is_empty() {
            anyhow::bail!("a message needs --text, --html or both");
        }

        Ok(OutgoingMessage::new(message_type, recipient, payload))
    }
}

/// Runs the send command.
///
/// Exits with [`ExitCode::DeliveryFailed`] when every provider was exhausted
/// or failing; the failure is still recorded in the delivery log.
pub async fn run(args: &SendArgs, cli: &Cli) -> Result<ExitCode> {
    let message = args.message()?;
    let runtime = Runtime::load(cli).await?;

    info!(
        message_type = %message.message_type,
        recipient = %message.recipient,
        "Dispatching message"
    );
    let result = runtime.dispatcher().dispatch(&message).await;

    if !cli.quiet || cli.format == OutputFormat::Json {
        match cli.format {
            OutputFormat::Text => {
                println!("{}", TextFormatter::new(!cli.no_color).format_dispatch(&result));
            }
            OutputFormat::Json => {
                println!("{}", JsonFormatter::new(cli.pretty).format_dispatch(&result)?);
            }
        }
    }

    Ok(if result.is_sent() {
        ExitCode::Success
    } else {
        ExitCode::DeliveryFailed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(text: Option<&str>, html: Option<&str>) -> SendArgs {
        SendArgs {
            message_type: "password_reset".into(),
            to: "member@example.org".into(),
            subject: "Reset".into(),
            text: text.map(String::from),
            html: html.map(String::from),
        }
    }

    #[test]
    fn test_message_from_args() {
        let message = args(Some("link"), None).message().unwrap();
        assert_eq!(message.message_type, MessageType::PasswordReset);
        assert_eq!(message.recipient.as_str(), "member@example.org");
        assert_eq!(message.payload.text.as_deref(), Some("link"));
    }

    #[test]
    fn test_body_required() {
        assert!(args(None, None).message().is_err());
    }

    #[test]
    fn test_bad_recipient_rejected() {
        let mut bad = args(Some("x"), None);
        bad.to = "not-an-address".into();
        assert!(bad.message().is_err());
    }
}
