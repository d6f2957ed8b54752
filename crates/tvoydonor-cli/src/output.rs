//! Terminal rendering of sessions, tokens and outcomes.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use tvoydonor_core::{AccessToken, HostKind, UserProfile, UserType};

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Non-fatal conditions go to stderr so stdout stays pipeable.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

fn field(label: &str, value: &str) {
    println!("  {:<10} {}", format!("{label}:").dimmed(), value);
}

/// Who the session belongs to. `host` is omitted for login output, where
/// the user just picked it.
pub fn identity(host: Option<HostKind>, user_type: UserType, profile: &UserProfile) {
    if let Some(host) = host {
        field("Host", &host.to_string());
    }
    field("User type", user_type.as_str());

    let label = match user_type {
        UserType::Donor => "Name",
        UserType::MedicalCenter => "Center",
    };
    if let Some(name) = profile.display_name() {
        field(label, name);
    }
}

/// Expiry of `token` with the time left, or a warning if it has none.
pub fn expiry(token: &AccessToken) {
    let Some(at) = token.expires_at() else {
        warning("Token carries no readable expiry");
        return;
    };
    let left = at - Utc::now();
    let remaining = if left.num_seconds() <= 0 {
        "expired".red().to_string()
    } else {
        format!("in {}m {}s", left.num_minutes(), left.num_seconds() % 60)
    };
    field("Expires", &format!("{} ({remaining})", at.to_rfc3339()));
}

/// The raw profile document, pretty-printed.
pub fn profile_json(profile: &UserProfile) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(profile.as_value())?);
    Ok(())
}
