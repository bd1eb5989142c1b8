//! Schema check shared by the create and update flows. Both require the full
//! `{nombre, email, password}` triple.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::dto::UserPayload;

pub const NOMBRE_MAX: usize = 100;
pub const EMAIL_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetail {
    pub message: String,
    pub path: Vec<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ValidationDetail {
    fn new(field: &str, kind: &'static str, message: String) -> Self {
        Self {
            message,
            path: vec![field.to_string()],
            kind,
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, "any.required", format!("\"{}\" is required", field))
    }

    fn not_string(field: &str) -> Self {
        Self::new(field, "string.base", format!("\"{}\" must be a string", field))
    }

    fn empty(field: &str) -> Self {
        Self::new(field, "string.empty", format!("\"{}\" is not allowed to be empty", field))
    }

    fn too_short(field: &str, min: usize) -> Self {
        Self::new(
            field,
            "string.min",
            format!("\"{}\" length must be at least {} characters long", field, min),
        )
    }

    fn too_long(field: &str, max: usize) -> Self {
        Self::new(
            field,
            "string.max",
            format!("\"{}\" length must be less than or equal to {} characters long", field, max),
        )
    }

    fn bad_email(field: &str) -> Self {
        Self::new(field, "string.email", format!("\"{}\" must be a valid email", field))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}", summary(.details))]
pub struct ValidationError {
    pub details: Vec<ValidationDetail>,
}

fn summary(details: &[ValidationDetail]) -> String {
    details
        .iter()
        .map(|d| d.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Normalized candidate: trimmed name, trimmed lowercase email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUser {
    pub nombre: String,
    pub email: String,
    pub password: String,
}

/// The raw value as text. Absent and non-string values record their detail
/// and yield `None`.
fn text<'a>(
    field: &str,
    value: Option<&'a Value>,
    details: &mut Vec<ValidationDetail>,
) -> Option<&'a str> {
    match value {
        None => {
            details.push(ValidationDetail::required(field));
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            details.push(ValidationDetail::not_string(field));
            None
        }
    }
}

fn non_blank<'a>(
    field: &str,
    value: Option<&'a str>,
    details: &mut Vec<ValidationDetail>,
) -> Option<&'a str> {
    match value {
        Some(v) if v.trim().is_empty() => {
            details.push(ValidationDetail::empty(field));
            None
        }
        other => other,
    }
}

pub fn validate_user(candidate: &UserPayload) -> Result<ValidUser, ValidationError> {
    let mut details = Vec::new();

    let nombre = text("nombre", candidate.nombre.as_ref(), &mut details);
    let nombre = non_blank("nombre", nombre, &mut details).map(str::trim);
    if let Some(n) = nombre {
        if n.chars().count() > NOMBRE_MAX {
            details.push(ValidationDetail::too_long("nombre", NOMBRE_MAX));
        }
    }

    let email = text("email", candidate.email.as_ref(), &mut details);
    let email = non_blank("email", email, &mut details).map(|e| e.trim().to_lowercase());
    if let Some(e) = &email {
        if e.chars().count() > EMAIL_MAX {
            details.push(ValidationDetail::too_long("email", EMAIL_MAX));
        } else if !is_valid_email(e) {
            details.push(ValidationDetail::bad_email("email"));
        }
    }

    // passwords are taken verbatim, surrounding whitespace included
    let password = match text("password", candidate.password.as_ref(), &mut details) {
        None => None,
        Some("") => {
            details.push(ValidationDetail::empty("password"));
            None
        }
        Some(p) => {
            let len = p.chars().count();
            if len < PASSWORD_MIN {
                details.push(ValidationDetail::too_short("password", PASSWORD_MIN));
            } else if len > PASSWORD_MAX {
                details.push(ValidationDetail::too_long("password", PASSWORD_MAX));
            }
            Some(p)
        }
    };

    match (nombre, email, password) {
        (Some(nombre), Some(email), Some(password)) if details.is_empty() => Ok(ValidUser {
            nombre: nombre.to_string(),
            email,
            password: password.to_string(),
        }),
        _ => Err(ValidationError { details }),
    }
}
