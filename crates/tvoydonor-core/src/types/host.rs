//! Runtime host detection.

use std::fmt;

/// Which environment the session layer runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// Regular browser-like host: device storage plus an HTTP-only cookie jar.
    StandardBrowser,
    /// In-app host (Telegram Mini App) with its own cloud key-value store
    /// and signed identity data injected at startup.
    EmbeddedHost,
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostKind::StandardBrowser => f.write_str("standard browser"),
            HostKind::EmbeddedHost => f.write_str("embedded host"),
        }
    }
}

/// Pick the host from the identity data injected at load time.
///
/// Non-blank init data means an embedded host launched us.
pub fn detect_host(init_data: Option<&str>) -> HostKind {
    match init_data {
        Some(data) if !data.trim().is_empty() => HostKind::EmbeddedHost,
        _ => HostKind::StandardBrowser,
    }
}
