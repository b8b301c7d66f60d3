//! Field rules shared by every entry point.
//!
//! Both API surfaces go through the services, so these checks run exactly
//! once per operation and always before the store is touched.

use crate::domain::Patch;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 200;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_ADDRESS_FIELD_LEN: usize = 100;

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn too_long(field: &str, max: usize) -> String {
    format!(
        "The {} field must not be greater than {max} characters.",
        label(field)
    )
}

fn missing(field: &str) -> String {
    format!("The {} field is required.", label(field))
}

pub fn required<'a>(field: &str, value: Option<&'a str>, max: usize) -> Result<&'a str, String> {
    match value {
        Some(v) if !v.trim().is_empty() => {
            if v.chars().count() > max {
                Err(too_long(field, max))
            } else {
                Ok(v)
            }
        }
        _ => Err(missing(field)),
    }
}

pub fn optional(field: &str, value: Option<&str>, max: usize) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > max => Err(too_long(field, max)),
        _ => Ok(()),
    }
}

/// Empty strings pass; anything else needs one `@` with text on both sides.
pub fn email(field: &str, value: Option<&str>) -> Result<(), String> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };

    let valid = match v.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !v.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(format!("The {} field must be a valid email address.", label(field)))
    }
}

/// A required column may be left out of a patch, but not nulled or blanked.
pub fn required_patch(field: &str, value: &Patch<String>, max: usize) -> Result<(), String> {
    match value {
        Patch::Missing => Ok(()),
        Patch::Null => Err(missing(field)),
        Patch::Value(v) => required(field, Some(v), max).map(|_| ()),
    }
}

pub fn optional_patch(field: &str, value: &Patch<String>, max: usize) -> Result<(), String> {
    optional(field, value.as_value().map(String::as_str), max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(required("name", Some("Ann"), 10), Ok("Ann"));
        assert_eq!(
            required("first_name", None, 10),
            Err("The first name field is required.".to_string())
        );
        assert!(required("name", Some("   "), 10).is_err());
        assert!(required("name", Some("abcdef"), 5).is_err());
    }

    #[test]
    fn test_optional_counts_chars_not_bytes() {
        assert!(optional("city", Some("Zürich"), 6).is_ok());
        assert!(optional("city", Some("Zürich!"), 6).is_err());
        assert!(optional("city", None, 1).is_ok());
    }

    #[test]
    fn test_email() {
        assert!(email("email", Some("john@x.com")).is_ok());
        assert!(email("email", Some("")).is_ok());
        assert!(email("email", None).is_ok());
        assert!(email("email", Some("john")).is_err());
        assert!(email("email", Some("@x.com")).is_err());
        assert!(email("email", Some("a@b@c")).is_err());
        assert!(email("email", Some("a b@c.d")).is_err());
    }

    #[test]
    fn test_patch_rules() {
        assert!(required_patch("country", &Patch::Missing, 10).is_ok());
        assert!(required_patch("country", &Patch::Null, 10).is_err());
        assert!(required_patch("country", &Patch::Value(String::new()), 10).is_err());
        assert!(optional_patch("street", &Patch::Null, 3).is_ok());
        assert!(optional_patch("street", &Patch::Value("abcd".into()), 3).is_err());
    }
}
