//! Minimal message renderer used when replaying failed deliveries.
//!
//! Builds subject and bodies around the configured links; the full
//! templates belong to the application that owns the accounts.

use courier_core::{CoreError, MessagePayload, MessageRenderer, MessageType, RenderContext};
use courier_store::LinkConfig;

/// Renders verification and password reset messages from link templates.
#[derive(Debug, Clone)]
pub struct LinkRenderer {
    links: LinkConfig,
}

impl LinkRenderer {
    /// Creates a renderer over the given link templates.
    pub fn new(links: LinkConfig) -> Self {
        Self { links }
    }

    fn fill(template: &str, ctx: &RenderContext) -> String {
        let token = ctx.reset_token.as_ref().map_or("", |t| t.token.as_str());
        template
            .replace("{account}", &ctx.account.id)
            .replace("{email}", ctx.account.recipient.as_str())
            .replace("{token}", token)
    }

    fn greeting(ctx: &RenderContext) -> String {
        match &ctx.account.display_name {
            Some(name) if !name.trim().is_empty() => format!("Hi {},", name.trim()),
            _ => "Hi,".to_string(),
        }
    }
}

impl MessageRenderer for LinkRenderer {
    fn render(
        &self,
        message_type: &MessageType,
        ctx: &RenderContext,
    ) -> Result<MessagePayload, CoreError> {
        let greeting = Self::greeting(ctx);
        match message_type {
            MessageType::Verification => {
                let link = Self::fill(&self.links.verify_url, ctx);
                Ok(MessagePayload::new("Confirm your email address")
                    .with_text(format!(
                        "{greeting}\n\nConfirm your email address by opening:\n{link}\n"
                    ))
                    .with_html(format!(
                        "<p>{greeting}</p><p><a href=\"{link}\">Confirm your email address</a></p>"
                    )))
            }
            MessageType::PasswordReset => {
                if ctx.reset_token.is_none() {
                    return Err(CoreError::Render(
                        "password reset requires a reset token".to_string(),
                    ));
                }
                let link = Self::fill(&self.links.reset_url, ctx);
                Ok(MessagePayload::new("Reset your password")
                    .with_text(format!(
                        "{greeting}\n\nReset your password by opening:\n{link}\n\n\
                         If you did not ask for this, ignore this message.\n"
                    ))
                    .with_html(format!(
                        "<p>{greeting}</p><p><a href=\"{link}\">Reset your password</a></p>\
                         <p>If you did not ask for this, ignore this message.</p>"
                    )))
            }
            MessageType::Other(name) => Err(CoreError::Render(format!(
                "no template for message type {name}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use courier_core::{Account, Recipient, ResetToken};

    fn ctx(token: Option<&str>) -> RenderContext {
        RenderContext {
            account: Account {
                id: "acct-7".into(),
                recipient: Recipient::parse("member@example.org").unwrap(),
                display_name: Some("Sam".into()),
            },
            reset_token: token.map(|t| ResetToken {
                token: t.into(),
                issued_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_verification_link() {
        let renderer = LinkRenderer::new(LinkConfig::default());
        let payload = renderer.render(&MessageType::Verification, &ctx(None)).unwrap();
        assert_eq!(payload.subject, "Confirm your email address");
        let text = payload.text.unwrap();
        assert!(text.starts_with("Hi Sam,"));
        assert!(text.contains("https://example.org/verify?account=acct-7"));
    }

    #[test]
    fn test_reset_uses_token() {
        let renderer = LinkRenderer::new(LinkConfig {
            verify_url: String::new(),
            reset_url: "https://portal.example.org/reset/{token}?u={email}".into(),
        });
        let payload = renderer
            .render(&MessageType::PasswordReset, &ctx(Some("tok-2")))
            .unwrap();
        assert!(
            payload
                .html
                .unwrap()
                .contains("https://portal.example.org/reset/tok-2?u=member@example.org")
        );
    }

    #[test]
    fn test_reset_without_token_fails() {
        let renderer = LinkRenderer::new(LinkConfig::default());
        assert!(matches!(
            renderer.render(&MessageType::PasswordReset, &ctx(None)),
            Err(CoreError::Render(_))
        ));
    }

    #[test]
    fn test_unknown_type_fails() {
        let renderer = LinkRenderer::new(LinkConfig::default());
        let result = renderer.render(&MessageType::Other("digest".into()), &ctx(None));
        assert!(result.is_err());
    }
}
