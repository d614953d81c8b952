//! Pure domain logic for the gigboard platform.
//!
//! This crate has no internal dependencies and no I/O. It defines the
//! entity status machines, the moderation decision table, order-id and
//! payment-payload codecs, pricing arithmetic, and the free-tier week
//! calculation. Persistence lives in `gigboard-db`; wiring lives in
//! `gigboard-api`.

pub mod error;
pub mod free_week;
pub mod moderation;
pub mod order;
pub mod post_rules;
pub mod pricing;
pub mod status;
pub mod types;
