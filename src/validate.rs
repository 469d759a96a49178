//! Input normalization shared by the services.

use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};

use crate::error::{AppError, AppResult};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }
    Ok(email)
}

/// Trimmed value, or a validation error naming `field` when blank.
pub(crate) fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Trimmed value; blank collapses to `None`.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_date(field: &str, value: Option<String>) -> AppResult<Option<Date>> {
    let Some(raw) = optional(value) else {
        return Ok(None);
    };
    Date::parse(&raw, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| AppError::validation(format!("{field} must be YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn email_is_trimmed_lowercased_and_checked() {
        assert_eq!(normalize_email("  Ana@City.GOV ").unwrap(), "ana@city.gov");
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a b@c.d").is_err());
    }

    #[test]
    fn required_rejects_blank() {
        assert_eq!(required("title", "  Pothole ").unwrap(), "Pothole");
        let err = required("title", "   ").unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn optional_collapses_blank() {
        assert_eq!(optional(Some("  ".into())), None);
        assert_eq!(optional(None), None);
        assert_eq!(optional(Some(" Recife ".into())).as_deref(), Some("Recife"));
    }

    #[test]
    fn dates_parse_iso_calendar_form() {
        let d = parse_date("birth_date", Some("1990-07-21".into())).unwrap().unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (1990, Month::July, 21));
        assert_eq!(parse_date("birth_date", Some(String::new())).unwrap(), None);
        assert!(parse_date("birth_date", Some("21/07/1990".into())).is_err());
    }
}
