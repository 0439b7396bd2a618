//! Validation and normalization of user payloads
//!
//! Checks run in field order (name, email, age) and every violation is
//! collected; callers that report a single message use
//! [`ValidationErrors::first_message`].

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;

use crate::userdb::{NewUser, UserChanges};

pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const AGE_MIN: i64 = 0;
pub const AGE_MAX: i64 = 150;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Raw user fields as received from a client
///
/// Every field is optional here; whether absence is allowed depends on the
/// operation. A JSON `null` is treated the same as an absent field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<serde_json::Number>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Message of the first rule that failed
    pub fn first_message(&self) -> &'static str {
        self.violations
            .first()
            .map(|v| v.message)
            .unwrap_or("Invalid input")
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first_message())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a payload for creating a user; name and email are required
pub fn validate_create(payload: &UserPayload) -> Result<NewUser, ValidationErrors> {
    let mut violations = Vec::new();

    let name = match payload.name.as_deref() {
        Some(raw) => collect(check_name(raw), &mut violations),
        None => {
            violations.push(violation("name", "Name is required"));
            None
        }
    };
    let email = match payload.email.as_deref() {
        Some(raw) => collect(check_email(raw), &mut violations),
        None => {
            violations.push(violation("email", "Email is required"));
            None
        }
    };
    let age = match &payload.age {
        Some(raw) => collect(check_age(raw), &mut violations),
        None => None,
    };

    match (name, email) {
        (Some(name), Some(email)) if violations.is_empty() => Ok(NewUser { name, email, age }),
        _ => Err(ValidationErrors { violations }),
    }
}

/// Validate a partial update; only present fields are checked
pub fn validate_update(payload: &UserPayload) -> Result<UserChanges, ValidationErrors> {
    let mut violations = Vec::new();

    let changes = UserChanges {
        name: payload
            .name
            .as_deref()
            .and_then(|raw| collect(check_name(raw), &mut violations)),
        email: payload
            .email
            .as_deref()
            .and_then(|raw| collect(check_email(raw), &mut violations)),
        age: payload
            .age
            .as_ref()
            .and_then(|raw| collect(check_age(raw), &mut violations)),
    };

    if violations.is_empty() {
        Ok(changes)
    } else {
        Err(ValidationErrors { violations })
    }
}

/// Trim, collapse inner whitespace and capitalize each word
///
/// `"  jOHN   doe "` becomes `"John Doe"`.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn check_name(raw: &str) -> Result<String, Violation> {
    let name = normalize_name(raw);
    let len = name.chars().count();

    if len == 0 {
        return Err(violation("name", "Name is required"));
    }
    if len > NAME_MAX_CHARS {
        return Err(violation("name", "Name must be 100 characters or less"));
    }
    Ok(name)
}

// Limits apply to the stored form; lowercasing can lengthen some characters.
fn check_email(raw: &str) -> Result<String, Violation> {
    let email = raw.trim().to_lowercase();

    if !EMAIL_PATTERN.is_match(&email) {
        return Err(violation("email", "Invalid email format"));
    }
    if email.chars().count() > EMAIL_MAX_CHARS {
        return Err(violation("email", "Email must be 255 characters or less"));
    }
    Ok(email)
}

fn check_age(raw: &serde_json::Number) -> Result<i32, Violation> {
    let value = if let Some(n) = raw.as_i64() {
        n
    } else if raw.is_u64() {
        // Larger than i64::MAX, certainly out of range
        return Err(age_range());
    } else {
        match raw.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 => {
                if f < AGE_MIN as f64 || f > AGE_MAX as f64 {
                    return Err(age_range());
                }
                f as i64
            }
            _ => return Err(violation("age", "Age must be an integer")),
        }
    };

    if !(AGE_MIN..=AGE_MAX).contains(&value) {
        return Err(age_range());
    }
    i32::try_from(value).map_err(|_| age_range())
}

fn age_range() -> Violation {
    violation("age", "Age must be between 0 and 150")
}

fn violation(field: &'static str, message: &'static str) -> Violation {
    Violation { field, message }
}

fn collect<T>(result: Result<T, Violation>, violations: &mut Vec<Violation>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(v) => {
            violations.push(v);
            None
        }
    }
}
