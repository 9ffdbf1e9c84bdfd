//! Expiry date math and status classification.
//!
//! This crate is the single authority for "how many days are left" and
//! "is this batch normal, nearly expired, or expired". Every listing, filter
//! and client-facing annotation goes through it so the numbers never drift.
//!
//! Everything here is a pure function of its inputs; "today" is always a
//! parameter.

pub mod calculator;
pub mod status;

pub use calculator::{ExpiryWindow, expiry_date, reminder_date, remaining_days};
pub use status::{ExpiryStatus, SortKey, classify};
