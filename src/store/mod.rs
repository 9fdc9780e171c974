//! Seed storage module.
//!
//! Holds the one active seed per deployment behind an injectable store
//! interface, with atomic replacement on write.

pub mod seed_store;
pub mod types;
pub mod vault;

pub use seed_store::*;
pub use types::*;
pub use vault::*;
