//! User entity, its enumerated attributes and the write-side inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declares a closed string enumeration.
///
/// Generates `ALL`, `as_str`, `FromStr`, `Display` and serde impls that use the
/// wire spelling, so stored documents and JSON bodies agree on one form.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(|_| {
                    serde::de::Error::custom(format!("{raw} is not supported"))
                })
            }
        }
    };
}

string_enum! {
    /// Account role. `super-admin` is the canonical spelling.
    pub enum Role {
        SuperAdmin => "super-admin",
        Admin => "admin",
        Customer => "customer",
        Guest => "guest",
        Partner => "partner",
    }
}

impl Role {
    /// Parses role input, accepting the legacy `super admin` spelling.
    pub fn parse_input(raw: &str) -> Option<Role> {
        match raw {
            "super admin" => Some(Role::SuperAdmin),
            other => other.parse().ok(),
        }
    }
}

string_enum! {
    /// Capability that can be granted to a user.
    pub enum Permission {
        AddStay => "addStay",
        EditStay => "editStay",
        DeleteStay => "deleteStay",
        AddRoom => "addRoom",
        EditRoom => "editRoom",
        DeleteRoom => "deleteRoom",
        AddBooking => "addBooking",
        EditBooking => "editBooking",
        DeleteBooking => "deleteBooking",
        AddLocation => "addLocation",
        EditLocation => "editLocation",
        DeleteLocation => "deleteLocation",
        AddTours => "addTours",
        EditTours => "editTours",
        DeleteTours => "deleteTours",
        AddCars => "addCars",
        EditCars => "editCars",
        DeleteCars => "deleteCars",
        AddRentals => "addRentals",
        EditRentals => "editRentals",
        DeleteRentals => "deleteRentals",
    }
}

string_enum! {
    /// Yes/no flag used by `is_admin`.
    pub enum YesNo {
        Yes => "yes",
        No => "no",
    }
}

impl Default for YesNo {
    fn default() -> Self {
        YesNo::No
    }
}

string_enum! {
    /// Account status flag. `Unset` is stored as a single space.
    pub enum Status {
        Yes => "yes",
        No => "no",
        Unset => " ",
    }
}

/// Application a partner submitted, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFor {
    pub applied_for: Option<String>,
    pub name: Option<String>,
}

/// Descriptive and relational attributes of a user.
///
/// Stored as a single document next to the identity columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub title: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub guest_full_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub fax: Option<String>,
    pub postal_code: Option<String>,
    pub passport: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub central_name: Option<String>,
    pub provider: Option<String>,
    pub facebook_id: Option<String>,
    pub is_admin: YesNo,
    pub status: Option<Status>,
    pub permissions: Vec<Permission>,
    pub commission: Option<f64>,
    pub applied_for: AppliedFor,
    /// Stays the user marked as favourite.
    pub favourites: Vec<Uuid>,
    pub recent_stays: Vec<Uuid>,
    /// Stays a partner or admin manages.
    pub assign_stays: Vec<Uuid>,
    pub customer_created_by: Option<Uuid>,
    pub guest_created_by: Option<Uuid>,
    pub partner_created_by: Option<Uuid>,
    pub verified: bool,
    pub verified_date: Option<DateTime<Utc>>,
}

/// A stored user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    /// Argon2 PHC string. Never the plaintext.
    pub password_hash: Option<String>,
    pub verification_token: Option<String>,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Validated, hashed record handed to the store for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub role: Role,
    pub password_hash: Option<String>,
    pub verification_token: Option<String>,
    pub profile: UserProfile,
}

/// What happens to the stored password hash on update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PasswordChange {
    /// Leave the stored hash untouched.
    #[default]
    Keep,
    /// Replace the stored hash with a freshly computed one.
    Replace(String),
}

/// Profile keys a patch sets, in their stored (camelCase) form.
///
/// Stores merge these onto the current profile document inside the same
/// write, so concurrent patches touching different keys do not overwrite
/// each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges(serde_json::Map<String, serde_json::Value>);

impl ProfileChanges {
    pub fn new(changes: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(changes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }

    /// Returns `profile` with every changed key overwritten.
    ///
    /// # Errors
    ///
    /// Fails when a changed value does not fit the profile document.
    pub fn apply_to(&self, profile: &UserProfile) -> Result<UserProfile, serde_json::Error> {
        let mut document = match serde_json::to_value(profile)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        document.extend(self.0.clone());
        serde_json::from_value(serde_json::Value::Object(document))
    }
}

/// Mutable part of a stored user touched by an update.
///
/// `None` and empty profile changes leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: PasswordChange,
    pub profile: ProfileChanges,
}

/// Raw profile fields as submitted by a client.
///
/// Enumerations and references stay as strings here so that bad values are
/// reported as validation violations rather than body decoding failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileInput {
    pub title: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub guest_full_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub fax: Option<String>,
    pub postal_code: Option<String>,
    pub passport: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub central_name: Option<String>,
    pub provider: Option<String>,
    pub facebook_id: Option<String>,
    pub is_admin: Option<String>,
    pub status: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub commission: Option<f64>,
    pub applied_for: Option<AppliedFor>,
    pub favourites: Option<Vec<String>>,
    pub recent_stays: Option<Vec<String>>,
    pub assign_stays: Option<Vec<String>>,
    pub customer_created_by: Option<String>,
    pub guest_created_by: Option<String>,
    pub partner_created_by: Option<String>,
    pub verified: Option<bool>,
    pub verified_date: Option<DateTime<Utc>>,
}

/// Unsaved candidate record submitted for registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileInput,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileInput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(*role));
        }
    }

    #[test]
    fn test_role_accepts_legacy_super_admin() {
        assert_eq!(Role::parse_input("super admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse_input("super-admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse_input("root"), None);
        assert_eq!(Role::SuperAdmin.to_string(), "super-admin");
    }

    #[test]
    fn test_permission_serializes_camel_case() {
        let json = serde_json::to_string(&Permission::DeleteRentals).unwrap();
        assert_eq!(json, "\"deleteRentals\"");
        assert_eq!(Permission::ALL.len(), 21);
    }

    #[test]
    fn test_unknown_enum_value_fails_to_deserialize() {
        let err = serde_json::from_str::<Role>("\"owner\"").unwrap_err();
        assert!(err.to_string().contains("owner is not supported"));
    }

    #[test]
    fn test_status_unset_is_a_space() {
        assert_eq!(" ".parse::<Status>(), Ok(Status::Unset));
        assert_eq!(Status::Unset.as_str(), " ");
    }

    #[test]
    fn test_profile_defaults() {
        let profile = UserProfile::default();

        assert_eq!(profile.is_admin, YesNo::No);
        assert!(!profile.verified);
        assert!(profile.permissions.is_empty());
        assert!(profile.status.is_none());
    }

    #[test]
    fn test_profile_document_tolerates_missing_keys() {
        let profile: UserProfile = serde_json::from_str(r#"{"firstName":"Ram"}"#).unwrap();

        assert_eq!(profile.first_name.as_deref(), Some("Ram"));
        assert_eq!(profile.is_admin, YesNo::No);
    }

    #[test]
    fn test_draft_reads_camel_case_body() {
        let draft: UserDraft = serde_json::from_str(
            r#"{"email":"a@b.com","role":"customer","firstName":"Sita","recentStays":["x"]}"#,
        )
        .unwrap();

        assert_eq!(draft.email.as_deref(), Some("a@b.com"));
        assert_eq!(draft.role.as_deref(), Some("customer"));
        assert_eq!(draft.profile.first_name.as_deref(), Some("Sita"));
        assert_eq!(draft.profile.recent_stays, Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_profile_changes_overwrite_only_their_keys() {
        let current = UserProfile {
            first_name: Some("Ram".to_string()),
            city: Some("Kathmandu".to_string()),
            ..Default::default()
        };
        let mut changes = serde_json::Map::new();
        changes.insert("city".to_string(), serde_json::json!("Pokhara"));
        changes.insert("isAdmin".to_string(), serde_json::json!("yes"));

        let merged = ProfileChanges::new(changes).apply_to(&current).unwrap();

        assert_eq!(merged.first_name.as_deref(), Some("Ram"));
        assert_eq!(merged.city.as_deref(), Some("Pokhara"));
        assert_eq!(merged.is_admin, YesNo::Yes);
    }

    #[test]
    fn test_profile_changes_reject_ill_typed_values() {
        let mut changes = serde_json::Map::new();
        changes.insert("verified".to_string(), serde_json::json!("maybe"));

        assert!(ProfileChanges::new(changes).apply_to(&UserProfile::default()).is_err());
    }

    #[test]
    fn test_password_change_defaults_to_keep() {
        assert_eq!(PasswordChange::default(), PasswordChange::Keep);
    }
}
