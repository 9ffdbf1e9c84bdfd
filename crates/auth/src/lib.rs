//! `shelfwatch-auth`: boundary to the external identity collaborator.
//!
//! Accounts, passwords and sessions live elsewhere. All this crate knows is how
//! to turn a bearer token into the `AccountId` that every catalog and ledger
//! operation is scoped to. It is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod token;

pub use claims::{AccountClaims, TokenValidationError, validate_claims};
pub use token::{Hs256JwtValidator, JwtValidator};
