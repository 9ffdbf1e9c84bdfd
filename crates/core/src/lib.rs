//! `shelfwatch-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the account boundary, the date-only calendar value, and the error model.

pub mod date;
pub mod error;
pub mod id;

pub use date::CalendarDate;
pub use error::{DomainError, DomainResult};
pub use id::AccountId;
