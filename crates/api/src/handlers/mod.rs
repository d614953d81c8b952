//! HTTP handlers, one module per surface.

pub mod config;
pub mod moderation;
pub mod payments;
pub mod posts;
