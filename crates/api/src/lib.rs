// Test code patterns:
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! VersaBot API Library
//!
//! HTTP surface of the auto-reply backend: WhatsApp webhooks, keyword
//! replies, outbound sends and the Stripe subscription webhook.

pub mod config;
pub mod error;
pub mod replies;
pub mod routes;
pub mod state;
pub mod whatsapp;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
