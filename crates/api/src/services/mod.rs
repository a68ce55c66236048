//! Application services.

pub mod email;
pub mod pass_mailer;
pub mod qr;

pub use email::{EmailError, EmailMessage, EmailService};
pub use pass_mailer::{PassDeliveryError, PassMailer};
