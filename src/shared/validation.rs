//! Validation Utilities
//!
//! Bridges `validator` derive rules to `AppError` and hosts the custom
//! rules shared by request DTOs.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::error::{AppError, FieldError};

/// Run a DTO's validation rules.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request.validate().map_err(validation_error)
}

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors = Vec::new();
    collect(&errors, None, &mut field_errors);
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    AppError::Validation(field_errors)
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldError {
                    field: path.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, Some(&format!("{}[{}]", path, index)), out);
                }
            }
        }
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Shortest and longest name once surrounding whitespace is trimmed.
pub const NAME_LENGTH: (usize, usize) = (2, 50);

/// Names of groups, products, shops and lists: 2-50 characters after
/// trimming; letters, digits, spaces, `_`, `-`, `.`.
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error("name_blank", "Name cannot be blank"));
    }
    validate_name_length(trimmed)?;
    if trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.'))
    {
        Ok(())
    } else {
        Err(error(
            "name_charset",
            "Name may only contain letters, digits, spaces, '_', '-' and '.'",
        ))
    }
}

/// Display names of users: any characters, 2-50 of them once trimmed.
pub fn validate_name_length(value: &str) -> Result<(), ValidationError> {
    let (min, max) = NAME_LENGTH;
    if (min..=max).contains(&value.trim().chars().count()) {
        Ok(())
    } else {
        Err(error("name_length", "Name must be 2-50 characters"))
    }
}

/// Lists of IDs must not contain duplicates.
pub fn validate_unique_ids(ids: &[i64]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    if ids.iter().all(|id| seen.insert(*id)) {
        Ok(())
    } else {
        Err(error("ids_duplicated", "IDs must be unique"))
    }
}

/// Parse a comma separated list of IDs from a query string.
pub fn parse_id_list(field: &str, raw: &str) -> Result<Vec<i64>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            super::snowflake::parse_id(s)
                .ok_or_else(|| AppError::invalid(field, "Must be a comma separated list of IDs"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use test_case::test_case;

    #[derive(Debug, Deserialize, Validate)]
    struct Item {
        #[validate(range(min = 1, message = "Must be positive"))]
        amount: i32,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Request {
        #[validate(length(min = 2, message = "Too short"))]
        name: String,
        #[validate(nested)]
        items: Vec<Item>,
    }

    #[test_case("Groceries" ; "plain word")]
    #[test_case("My list 2" ; "digits and spaces")]
    #[test_case("a_b-c.d" ; "allowed punctuation")]
    #[test_case("Café" ; "unicode letters")]
    #[test_case("  Milk  " ; "surrounding spaces")]
    fn test_valid_names(name: &str) {
        assert!(validate_name(name).is_ok());
    }

    #[test_case("   " ; "blank")]
    #[test_case("a " ; "one character once trimmed")]
    #[test_case(&"n".repeat(51) ; "too long")]
    #[test_case("semi;colon" ; "semicolon")]
    #[test_case("<script>" ; "angle brackets")]
    fn test_invalid_names(name: &str) {
        assert!(validate_name(name).is_err());
    }

    #[test]
    fn test_unique_ids() {
        assert!(validate_unique_ids(&[1, 2, 3]).is_ok());
        assert!(validate_unique_ids(&[1, 2, 1]).is_err());
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("ids", "1, 2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("ids", "").unwrap(), Vec::<i64>::new());
        assert!(parse_id_list("ids", "1,x").is_err());
    }

    #[test]
    fn test_nested_errors_are_flattened_with_paths() {
        let request = Request {
            name: "a".into(),
            items: vec![Item { amount: 3 }, Item { amount: 0 }],
        };

        let err = validate_request(&request).unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(
                errors,
                vec![
                    FieldError::new("items[1].amount", "Must be positive"),
                    FieldError::new("name", "Too short"),
                ]
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
