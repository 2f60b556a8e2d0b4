//! Brevo (formerly Sendinblue) provider implementation.
//!
//! Brevo takes a JSON body on `/v3/smtp/email`, authenticated with an
//! `api-key` header.

mod api;
mod descriptor;
mod transport;

pub use api::{BrevoAddress, BrevoSendRequest, BrevoSendResponse};
pub use descriptor::brevo_descriptor;
pub use transport::{BREVO_API_BASE, BrevoTransport};
