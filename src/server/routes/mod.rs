//! Route handlers module.

pub mod health;
pub mod seed;
pub mod totp;
