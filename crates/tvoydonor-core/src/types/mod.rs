//! Core session types.
//!
//! These types enforce their invariants at construction time.

mod api_url;
mod host;
mod user;

pub use api_url::ApiUrl;
pub use host::{HostKind, detect_host};
pub use user::{UserProfile, UserType};
