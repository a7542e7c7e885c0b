//! Read models definitions.

pub mod user;
