//! WhatsApp Cloud API integration
//!
//! Inbound payload extraction and the outbound send path.

pub mod client;
pub mod notifier;
pub mod payload;

pub use client::{SendOutcome, WhatsAppClient};
pub use notifier::Notifier;
pub use payload::{InboundMessage, PayloadError};
