//! Credential handling for the Chattingo gateway.
//!
//! - `identity`: the validator seam the request gate depends on
//! - `jwt`: HS256 bearer tokens, the shipped validator
//! - `users`: configured accounts for the login endpoint

mod identity;
mod jwt;
mod users;

pub use identity::*;
pub use jwt::*;
pub use users::*;
