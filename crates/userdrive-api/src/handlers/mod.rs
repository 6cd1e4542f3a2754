//! Route handlers.

pub mod files;
pub mod health;
pub mod public;
