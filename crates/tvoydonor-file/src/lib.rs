//! tvoydonor-file - filesystem-backed storage for the Tvoy Donor client.
//!
//! [`FileStore`] implements [`tvoydonor_core::KeyValueStore`] over a single
//! JSON file; [`CookieFile`] keeps the transport cookie jar between runs.

mod cookies;
mod store;

pub use cookies::CookieFile;
pub use store::FileStore;
