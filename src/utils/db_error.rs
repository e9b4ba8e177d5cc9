//! Helpers for turning PostgreSQL constraint violations into field names.

/// Table prefix used by every constraint in the schema.
const TABLE_PREFIX: &str = "users_";

/// Extracts the offending field from a constraint name.
///
/// Constraints follow PostgreSQL's default naming, `<table>_<column>_<suffix>`,
/// so `users_email_key` yields `email` and `users_role_check` yields `role`.
/// Unknown shapes fall back to the raw constraint name, and a missing name to
/// `"value"`.
pub fn constraint_field(constraint: Option<&str>) -> String {
    let Some(name) = constraint else {
        return "value".to_string();
    };

    let without_table = name.strip_prefix(TABLE_PREFIX).unwrap_or(name);

    ["_key", "_check", "_idx"]
        .iter()
        .find_map(|suffix| without_table.strip_suffix(suffix))
        .filter(|field| !field.is_empty())
        .unwrap_or(name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_constraint() {
        assert_eq!(constraint_field(Some("users_email_key")), "email");
    }

    #[test]
    fn test_check_constraint() {
        assert_eq!(constraint_field(Some("users_role_check")), "role");
    }

    #[test]
    fn test_unrecognised_constraint_is_returned_verbatim() {
        assert_eq!(constraint_field(Some("custom_rule")), "custom_rule");
    }

    #[test]
    fn test_missing_constraint() {
        assert_eq!(constraint_field(None), "value");
    }
}
