//! Command implementations.

pub mod session;
