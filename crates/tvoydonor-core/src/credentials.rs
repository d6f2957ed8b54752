//! Login credential types.

use std::fmt;

use serde::Serialize;

/// Donor login: donors identify by name, birth year and their medical center.
///
/// The password is never exposed in Debug output.
///
/// # Example
///
/// ```
/// use tvoydonor_core::DonorCredentials;
///
/// let creds = DonorCredentials::new("Anna Ivanova", 1990, 3, "secret");
/// assert_eq!(creds.full_name(), "Anna Ivanova");
/// ```
#[derive(Clone, Serialize)]
pub struct DonorCredentials {
    full_name: String,
    birth_year: i32,
    medical_center_id: i64,
    password: String,
}

impl DonorCredentials {
    /// Create new donor credentials.
    pub fn new(
        full_name: impl Into<String>,
        birth_year: i32,
        medical_center_id: i64,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            birth_year,
            medical_center_id,
            password: password.into(),
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn birth_year(&self) -> i32 {
        self.birth_year
    }

    pub fn medical_center_id(&self) -> i64 {
        self.medical_center_id
    }
}

impl fmt::Debug for DonorCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DonorCredentials")
            .field("full_name", &self.full_name)
            .field("birth_year", &self.birth_year)
            .field("medical_center_id", &self.medical_center_id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Medical center staff login.
#[derive(Clone, Serialize)]
pub struct MedicalCenterCredentials {
    medical_center_id: i64,
    password: String,
}

impl MedicalCenterCredentials {
    /// Create new medical center credentials.
    pub fn new(medical_center_id: i64, password: impl Into<String>) -> Self {
        Self {
            medical_center_id,
            password: password.into(),
        }
    }

    pub fn medical_center_id(&self) -> i64 {
        self.medical_center_id
    }
}

impl fmt::Debug for MedicalCenterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MedicalCenterCredentials")
            .field("medical_center_id", &self.medical_center_id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Signed identity data injected by an embedded host (Telegram `initData`).
///
/// The backend verifies the signature and exchanges it for a session.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityPayload(String);

impl IdentityPayload {
    pub fn new(init_data: impl Into<String>) -> Self {
        Self(init_data.into())
    }

    /// Raw payload, for the exchange request body only.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IdentityPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityPayload")
            .field("len", &self.0.len())
            .finish()
    }
}
