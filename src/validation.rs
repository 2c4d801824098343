//! Collects field-level validation errors for request parameters and bodies.
//!
//! Handlers parse every field, recording a message for each invalid one, and
//! only act on the request once [ValidationErrors::into_result] succeeds. A
//! request is therefore either applied in full or rejected with every problem
//! listed at once.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use axum::extract::rejection::{JsonRejection, QueryRejection};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, money::Money};

/// The format for calendar dates in requests and responses, e.g. "2024-01-31".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Validation messages keyed by field name.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Record `message` against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Whether no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether at least one error has been recorded for `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// A one line description: the first message plus a count of the rest.
    pub fn summary(&self) -> String {
        let mut messages = self.0.values().flatten();

        let Some(first) = messages.next() else {
            return "The given data was invalid.".to_owned();
        };

        match messages.count() {
            0 => first.clone(),
            1 => format!("{first} (and 1 more error)"),
            remaining => format!("{first} (and {remaining} more errors)"),
        }
    }

    /// Turn the collected errors into a result, failing if any were recorded.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add("body", rejection.body_text());
        Error::Validation(errors)
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add("query", rejection.body_text());
        Error::Validation(errors)
    }
}

/// The name of a field as it appears in messages, e.g. "start date" for `start_date`.
pub(crate) fn display_name(field: &str) -> String {
    field.replace('_', " ")
}

/// Check that `value` is present and not blank, returning the trimmed value.
pub(crate) fn require<'a>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            errors.add(
                field,
                format!("The {} field is required.", display_name(field)),
            );
            None
        }
    }
}

/// Check that a required string is present and at most `max_chars` characters long.
pub(crate) fn require_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max_chars: usize,
) -> Option<String> {
    let value = require(errors, field, value)?;

    if value.chars().count() > max_chars {
        errors.add(
            field,
            format!(
                "The {} field must not be greater than {max_chars} characters.",
                display_name(field)
            ),
        );
        return None;
    }

    Some(value.to_owned())
}

/// Parse an ISO calendar date such as "2024-01-31".
pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw, DATE_FORMAT).ok()
}

/// Check that a required date is present and valid.
pub(crate) fn require_date(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<Date> {
    let value = require(errors, field, value)?;

    match parse_date(value) {
        Some(date) => Some(date),
        None => {
            errors.add(
                field,
                format!("The {} field must be a valid date.", display_name(field)),
            );
            None
        }
    }
}

/// Check that an optional date is valid when present.
pub(crate) fn optional_date(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<Date> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(_) => require_date(errors, field, value),
    }
}

/// The smallest amount accepted for an expense or saving.
pub const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Check that a required amount is present, at least [MIN_AMOUNT] and storable.
///
/// The minimum is checked against `value` as given, before it is rounded to cents.
pub(crate) fn require_amount(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Decimal>,
) -> Option<Money> {
    let Some(value) = value else {
        errors.add(
            field,
            format!("The {} field is required.", display_name(field)),
        );
        return None;
    };

    if value < MIN_AMOUNT {
        errors.add(
            field,
            format!(
                "The {} field must be at least {MIN_AMOUNT}.",
                display_name(field)
            ),
        );
        return None;
    }

    let amount = Money::new(value);

    if amount.cents().is_none() {
        errors.add(
            field,
            format!("The {} field is too large.", display_name(field)),
        );
        return None;
    }

    Some(amount)
}

/// Read a JSON number, or a string holding a number, as an amount of money.
///
/// Reports a missing value or one that is not numeric, then applies the same
/// checks as [require_amount].
pub(crate) fn require_amount_value(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&Value>,
) -> Option<Money> {
    let decimal = match value {
        None | Some(Value::Null) => return require_amount(errors, field, None),
        Some(Value::Number(number)) => parse_decimal(&number.to_string()),
        Some(Value::String(text)) => parse_decimal(text.trim()),
        Some(_) => None,
    };

    match decimal {
        Some(decimal) => require_amount(errors, field, Some(decimal)),
        None => {
            errors.add(
                field,
                format!("The {} field must be a number.", display_name(field)),
            );
            None
        }
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
