//! tvoydonor-http - reqwest transport and session manager for the Tvoy
//! Donor client.
//!
//! [`SessionManager`] holds the access credential in memory, refreshes it
//! through a single shared refresh call, and wraps authenticated requests
//! with one retry after a 401. Host differences (cookie jar vs. explicit
//! refresh credential in a cloud store) live behind
//! [`tvoydonor_core::HostAdapter`]; see [`select_host`].

mod client;
pub mod endpoints;
mod host;
mod request;
mod session;

pub use client::{ApiClient, ClientConfig, RevokeScope};
pub use host::{BrowserHost, EmbeddedHost, select_host};
pub use request::ApiRequest;
pub use reqwest::{Method, Response, StatusCode};
pub use session::{SessionConfig, SessionManager};
