// Test code patterns:
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! VersaBot Shared Module
//!
//! Domain models, connection pool and queries shared by the API server and
//! the billing crate.

pub mod db;
pub mod models;
pub mod queries;


pub use db::{create_pool, init_schema};
pub use models::{
    AutoReplyRule, ConversationLogEntry, ModelError, NewConversation, SubscriptionStatus, Tenant,
    TenantCredentials,
};
