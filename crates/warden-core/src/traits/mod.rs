//! Collaborator traits defined in `warden-core` and implemented by other crates.

pub mod broker;
pub mod cache;
pub mod mailer;

pub use broker::{Delivery, MessageBroker};
pub use cache::CacheProvider;
pub use mailer::{Mailer, OutboundEmail};
