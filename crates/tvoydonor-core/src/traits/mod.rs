//! Core traits for storage, host and navigation behavior.

mod host;
mod navigator;
mod store;

pub use host::{HostAdapter, RefreshCarrier};
pub use navigator::Navigator;
pub use store::KeyValueStore;
