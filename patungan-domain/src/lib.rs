//! Core model and rules for splitting shared bills.
//!
//! Everything in this crate is pure: bills are built and settled by value,
//! with persistence and balance movements left to the callers. Amounts are
//! exact decimals quantized to the currency's minor unit at construction
//! time, so a stored bill always satisfies `total == sum(amounts due)`.
#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;
