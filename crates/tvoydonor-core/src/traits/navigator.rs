//! Login surface navigation.

/// Sends the user to the login surface after the session ends.
///
/// Implementations must not block; a page would change location, a CLI
/// prints a hint.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}
