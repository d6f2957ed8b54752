//! Session marker storage.

mod credential;
mod memory;

pub use credential::{CredentialStore, Namespace};
pub use memory::MemoryStore;
