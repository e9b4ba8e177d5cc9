//! Field-level validation rules for user writes.
//!
//! Each rule is a plain function returning `Result<T, Violation>`; the record
//! validators [`validate_draft`] and [`validate_patch`] run every applicable
//! rule and accumulate all violations instead of stopping at the first one.
//! Nothing here touches storage.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{ValidateEmail, ValidateLength};

use crate::domain::entities::{
    Permission, ProfileChanges, ProfileInput, Role, Status, UserDraft, UserPatch, UserProfile,
    YesNo,
};
use crate::error::Violation;

pub const NAME_MIN_LEN: u64 = 3;
pub const NAME_MAX_LEN: u64 = 50;
pub const FULL_NAME_MAX_LEN: u64 = 50;
pub const GUEST_FULL_NAME_MAX_LEN: u64 = 20;
pub const PHONE_MIN_LEN: u64 = 10;

/// Draft that passed every rule. The password is still plaintext.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub email: String,
    pub role: Role,
    pub password: Option<String>,
    pub profile: UserProfile,
}

/// Patch that passed every rule.
///
/// `password` is `Some` only when the patch carried a new plaintext.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPatch {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
    pub profile: ProfileChanges,
}

/// Collects violations while rules run.
#[derive(Default)]
struct Report {
    violations: Vec<Violation>,
}

impl Report {
    fn check<T>(&mut self, outcome: Result<T, Violation>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(violation) => {
                self.violations.push(violation);
                None
            }
        }
    }

    fn check_all<T>(&mut self, outcomes: Vec<Result<T, Violation>>) -> Option<Vec<T>> {
        let before = self.violations.len();
        let values: Vec<T> = outcomes
            .into_iter()
            .filter_map(|outcome| self.check(outcome))
            .collect();

        (self.violations.len() == before).then_some(values)
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<Violation>> {
        if self.violations.is_empty() {
            Ok(value)
        } else {
            Err(self.violations)
        }
    }
}

/// Requires a non-blank email with valid syntax. Returns the trimmed address.
pub fn email(raw: Option<&str>) -> Result<String, Violation> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(Violation::new("email", "Please provide email"));
    }
    email_syntax("email", trimmed)
}

/// Checks email syntax only.
pub fn email_syntax(field: &str, raw: &str) -> Result<String, Violation> {
    let candidate = raw.trim().to_string();
    if candidate.validate_email() {
        Ok(candidate)
    } else {
        Err(Violation::new(field, format!("Please provide a valid {field}")))
    }
}

/// Requires a role from the fixed enumeration.
pub fn role(raw: Option<&str>) -> Result<Role, Violation> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(Violation::new("role", "Please provide a role"));
    }
    Role::parse_input(trimmed).ok_or_else(|| unsupported("role", trimmed))
}

/// Checks a length bound, counted in characters.
pub fn length_between(
    field: &str,
    value: &str,
    min: Option<u64>,
    max: Option<u64>,
) -> Result<(), Violation> {
    if value.validate_length(min, max, None) {
        return Ok(());
    }

    let count = value.chars().count() as u64;
    match (min, max) {
        (Some(min), _) if count < min => Err(Violation::new(
            field,
            format!("{field} must be at least {min} characters"),
        )),
        (_, Some(max)) => Err(Violation::new(
            field,
            format!("{field} must be at most {max} characters"),
        )),
        _ => Ok(()),
    }
}

/// Parses a value of a closed enumeration.
pub fn one_of<T: FromStr>(field: &str, raw: &str) -> Result<T, Violation> {
    raw.parse().map_err(|_| unsupported(field, raw))
}

/// Parses a reference to another record.
pub fn id(field: &str, raw: &str) -> Result<Uuid, Violation> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| Violation::new(field, format!("{raw} is not a valid id")))
}

fn unsupported(field: &str, value: &str) -> Violation {
    Violation::new(field, format!("{value} is not supported"))
}

/// Trims and bounds a string field.
fn bounded(
    report: &mut Report,
    field: &str,
    raw: &str,
    min: Option<u64>,
    max: Option<u64>,
) -> Option<String> {
    let value = raw.trim();
    report
        .check(length_between(field, value, min, max))
        .map(|()| value.to_string())
}

fn ids(report: &mut Report, field: &str, raw: &[String]) -> Option<Vec<Uuid>> {
    report.check_all(raw.iter().map(|r| id(field, r)).collect())
}

fn permissions(report: &mut Report, raw: &[String]) -> Option<Vec<Permission>> {
    let parsed = report.check_all(
        raw.iter()
            .map(|r| one_of::<Permission>("permissions", r))
            .collect(),
    )?;

    let mut unique = Vec::with_capacity(parsed.len());
    for permission in parsed {
        if !unique.contains(&permission) {
            unique.push(permission);
        }
    }
    Some(unique)
}

/// Checks every present profile field and writes accepted values into `profile`.
fn apply_profile(report: &mut Report, input: &ProfileInput, profile: &mut UserProfile) {
    macro_rules! assign {
        ($field:ident, $value:expr) => {
            if let Some(value) = $value {
                profile.$field = value;
            }
        };
    }

    let plain = |v: &Option<String>| v.clone().map(Some);

    assign!(title, plain(&input.title));
    assign!(phone, plain(&input.phone));
    assign!(gender, plain(&input.gender));
    assign!(nationality, plain(&input.nationality));
    assign!(postal_code, plain(&input.postal_code));
    assign!(passport, plain(&input.passport));
    assign!(website, plain(&input.website));
    assign!(image, plain(&input.image));
    assign!(dob, plain(&input.dob));
    assign!(address, plain(&input.address));
    assign!(address1, plain(&input.address1));
    assign!(address2, plain(&input.address2));
    assign!(city, plain(&input.city));
    assign!(state, plain(&input.state));
    assign!(country, plain(&input.country));
    assign!(central_name, plain(&input.central_name));
    assign!(provider, plain(&input.provider));
    assign!(facebook_id, plain(&input.facebook_id));

    if let Some(raw) = &input.full_name {
        assign!(
            full_name,
            bounded(report, "fullName", raw, None, Some(FULL_NAME_MAX_LEN)).map(Some)
        );
    }
    for (field, raw, slot) in [
        ("firstName", &input.first_name, &mut profile.first_name),
        ("lastName", &input.last_name, &mut profile.last_name),
        ("displayName", &input.display_name, &mut profile.display_name),
    ] {
        if let Some(raw) = raw
            && let Some(value) =
                bounded(report, field, raw, Some(NAME_MIN_LEN), Some(NAME_MAX_LEN))
        {
            *slot = Some(value);
        }
    }
    if let Some(raw) = &input.guest_full_name {
        assign!(
            guest_full_name,
            bounded(report, "guestFullName", raw, None, Some(GUEST_FULL_NAME_MAX_LEN)).map(Some)
        );
    }
    if let Some(raw) = &input.guest_email {
        assign!(
            guest_email,
            report.check(email_syntax("guestEmail", raw)).map(Some)
        );
    }
    if let Some(raw) = &input.guest_phone {
        assign!(
            guest_phone,
            report
                .check(length_between("guestPhone", raw, Some(PHONE_MIN_LEN), None))
                .map(|()| Some(raw.clone()))
        );
    }
    if let Some(raw) = &input.fax {
        assign!(
            fax,
            report
                .check(length_between("fax", raw, Some(PHONE_MIN_LEN), None))
                .map(|()| Some(raw.clone()))
        );
    }

    if let Some(raw) = &input.is_admin {
        assign!(is_admin, report.check(one_of::<YesNo>("isAdmin", raw)));
    }
    if let Some(raw) = &input.status {
        assign!(status, report.check(one_of::<Status>("status", raw)).map(Some));
    }
    if let Some(raw) = &input.permissions {
        assign!(permissions, permissions(report, raw));
    }

    assign!(commission, input.commission.map(Some));
    assign!(applied_for, input.applied_for.clone());

    if let Some(raw) = &input.favourites {
        assign!(favourites, ids(report, "favourites", raw));
    }
    if let Some(raw) = &input.recent_stays {
        assign!(recent_stays, ids(report, "recentStays", raw));
    }
    if let Some(raw) = &input.assign_stays {
        assign!(assign_stays, ids(report, "assignStays", raw));
    }
    if let Some(raw) = &input.customer_created_by {
        assign!(
            customer_created_by,
            report.check(id("customerCreatedBy", raw)).map(Some)
        );
    }
    if let Some(raw) = &input.guest_created_by {
        assign!(
            guest_created_by,
            report.check(id("guestCreatedBy", raw)).map(Some)
        );
    }
    if let Some(raw) = &input.partner_created_by {
        assign!(
            partner_created_by,
            report.check(id("partnerCreatedBy", raw)).map(Some)
        );
    }

    assign!(verified, input.verified);
    assign!(verified_date, input.verified_date.map(Some));
}

/// Validates a registration draft.
///
/// # Errors
///
/// Returns every violated rule, in field order.
pub fn validate_draft(draft: &UserDraft) -> Result<ValidDraft, Vec<Violation>> {
    let mut report = Report::default();

    let email = report.check(email(draft.email.as_deref()));
    let role = report.check(role(draft.role.as_deref()));

    let mut profile = UserProfile::default();
    apply_profile(&mut report, &draft.profile, &mut profile);

    match (email, role) {
        (Some(email), Some(role)) => report.finish(ValidDraft {
            email,
            role,
            password: draft.password.clone(),
            profile,
        }),
        _ => Err(report.violations),
    }
}

/// Validates a patch.
///
/// Only fields present in the patch are checked. The returned profile changes
/// hold exactly the accepted keys, ready to merge onto whatever profile is
/// stored at write time.
///
/// # Errors
///
/// Returns every violated rule, in field order.
pub fn validate_patch(patch: &UserPatch) -> Result<ValidPatch, Vec<Violation>> {
    let mut report = Report::default();

    let email = match &patch.email {
        Some(raw) => report.check(email(Some(raw.as_str()))),
        None => None,
    };
    let role = match &patch.role {
        Some(raw) => report.check(role(Some(raw.as_str()))),
        None => None,
    };

    let mut profile = UserProfile::default();
    apply_profile(&mut report, &patch.profile, &mut profile);

    let touched = json_object(&patch.profile);
    let mut changes = json_object(&profile);
    changes.retain(|key, _| touched.get(key).is_some_and(|value| !value.is_null()));

    report.finish(ValidPatch {
        email,
        role,
        password: patch.password.clone(),
        profile: ProfileChanges::new(changes),
    })
}

fn json_object<T: Serialize>(value: &T) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
