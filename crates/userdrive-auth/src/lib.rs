//! # userdrive-auth
//!
//! Identity provider for UserDrive. Requests carry an HS256 JWT whose
//! claims name the caller's user id and admin flag; this crate issues and
//! validates those tokens.
//!
//! ## Modules
//!
//! - `jwt`: claims, token issuance and validation

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
