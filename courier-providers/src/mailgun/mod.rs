//! Mailgun provider implementation.
//!
//! Mailgun takes a form body on `/v3/{domain}/messages` with basic auth
//! (`api` and the key). Both the key and the sending domain are required.

mod api;
mod descriptor;
mod transport;

pub use api::{MailgunSendForm, MailgunSendResponse};
pub use descriptor::mailgun_descriptor;
pub use transport::{MAILGUN_API_BASE, MailgunTransport};
