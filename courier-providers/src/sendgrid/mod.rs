//! Twilio SendGrid provider implementation.
//!
//! SendGrid takes a JSON body on `/v3/mail/send` with a bearer token and
//! answers `202 Accepted` with an empty body; the message id comes back in
//! the `X-Message-Id` header.

mod api;
mod descriptor;
mod transport;

pub use api::{SendGridAddress, SendGridContent, SendGridPersonalization, SendGridSendRequest};
pub use descriptor::sendgrid_descriptor;
pub use transport::{SENDGRID_API_BASE, SendGridTransport};
