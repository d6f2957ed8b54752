//! Account kinds and profile snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// The kind of account a session belongs to.
///
/// The backend and the persisted markers spell these `donor` and
/// `medcenter`; `medical_center` is accepted when parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    #[serde(rename = "donor")]
    Donor,
    #[serde(rename = "medcenter", alias = "medical_center")]
    MedicalCenter,
}

impl UserType {
    /// Wire and storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Donor => "donor",
            UserType::MedicalCenter => "medcenter",
        }
    }

    /// Profile endpoint for this account kind, relative to the API base.
    pub fn profile_path(self) -> &'static str {
        match self {
            UserType::Donor => "/donor/profile",
            UserType::MedicalCenter => "/medcenter/profile",
        }
    }

    /// All account kinds, in a fixed order.
    pub fn all() -> [UserType; 2] {
        [UserType::Donor, UserType::MedicalCenter]
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "donor" => Ok(UserType::Donor),
            "medcenter" | "medical_center" => Ok(UserType::MedicalCenter),
            other => Err(InvalidInputError::UserType {
                value: other.to_string(),
            }
            .into()),
        }
    }
}

/// Opaque JSON snapshot of the signed-in account, as the backend returned it.
///
/// Used only to rebuild UI state across reloads; never authoritative.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(serde_json::Value);

impl UserProfile {
    /// Wrap a JSON value.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// An empty JSON object.
    pub fn empty() -> Self {
        Self(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Borrow the underlying JSON.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consume into the underlying JSON.
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    /// Look up a string field, e.g. `full_name` or `name`.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }

    /// Best-effort display name: `full_name` for donors, `name` for centers.
    pub fn display_name(&self) -> Option<&str> {
        self.str_field("full_name").or_else(|| self.str_field("name"))
    }
}

impl From<serde_json::Value> for UserProfile {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_type_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&UserType::MedicalCenter).unwrap(),
            "\"medcenter\""
        );
        let parsed: UserType = serde_json::from_str("\"medical_center\"").unwrap();
        assert_eq!(parsed, UserType::MedicalCenter);
        assert_eq!("donor".parse::<UserType>().unwrap(), UserType::Donor);
        assert!("admin".parse::<UserType>().is_err());
    }

    #[test]
    fn profile_display_name() {
        let donor = UserProfile::new(json!({"id": 1, "full_name": "Anna"}));
        assert_eq!(donor.display_name(), Some("Anna"));

        let center = UserProfile::new(json!({"id": 3, "name": "RNPC Transfusiology"}));
        assert_eq!(center.display_name(), Some("RNPC Transfusiology"));

        assert_eq!(UserProfile::empty().display_name(), None);
    }
}
