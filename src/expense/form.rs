//! Validation for the JSON bodies and query strings of the expense endpoints.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    Error,
    expense::{ExpenseFilter, NewExpense},
    pagination::{PageRequest, PaginationConfig},
    validation::{ValidationErrors, optional_date, require_amount_value, require_date, require_text},
};

const MAX_DESCRIPTION_LENGTH: usize = 255;
const MAX_CATEGORY_LENGTH: usize = 100;

/// The raw JSON body for creating or updating an expense.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseForm {
    /// A number, or a string holding a number.
    pub amount: Option<Value>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl ExpenseForm {
    /// Check every field, collecting all the problems before failing.
    ///
    /// # Errors
    /// Returns [Error::Validation] listing each invalid field.
    pub fn validate(&self) -> Result<NewExpense, Error> {
        let mut errors = ValidationErrors::default();

        let amount = require_amount_value(&mut errors, "amount", self.amount.as_ref());
        let description = require_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_LENGTH,
        );
        let category = require_text(
            &mut errors,
            "category",
            self.category.as_deref(),
            MAX_CATEGORY_LENGTH,
        );
        let date = require_date(&mut errors, "date", self.date.as_deref());

        errors.into_result()?;

        match (amount, description, category, date) {
            (Some(amount), Some(description), Some(category), Some(date)) => Ok(NewExpense {
                amount,
                description,
                category,
                date,
            }),
            _ => Err(ValidationErrors::default().into()),
        }
    }
}

/// The raw query string for listing expenses.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ExpenseListQuery {
    /// Parse the filter and page parameters.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a date or page parameter is invalid, or
    /// if `end_date` is before `start_date`.
    pub fn validate(
        &self,
        config: &PaginationConfig,
    ) -> Result<(ExpenseFilter, PageRequest), Error> {
        let mut errors = ValidationErrors::default();

        let start_date = optional_date(&mut errors, "start_date", self.start_date.as_deref());
        let end_date = optional_date(&mut errors, "end_date", self.end_date.as_deref());

        if matches!((start_date, end_date), (Some(start), Some(end)) if end < start) {
            errors.add(
                "end_date",
                "The end date field must be a date after or equal to start date.",
            );
        }

        let page = PageRequest::parse(
            &mut errors,
            self.page.as_deref(),
            self.per_page.as_deref(),
            config,
        );

        errors.into_result()?;

        let filter = ExpenseFilter {
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|category| !category.is_empty())
                .map(str::to_owned),
            start_date,
            end_date,
        };

        Ok((filter, page))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use crate::{
        Error,
        expense::form::{ExpenseForm, ExpenseListQuery},
        money::Money,
        pagination::PaginationConfig,
    };

    #[test]
    fn valid_form_is_accepted() {
        let form = ExpenseForm {
            amount: Some(json!(12.5)),
            description: Some(" Lunch ".to_owned()),
            category: Some("Food".to_owned()),
            date: Some("2024-01-15".to_owned()),
        };

        let expense = form.validate().expect("form should be valid");

        assert_eq!(expense.amount, Money::from_cents(1250));
        assert_eq!(expense.description, "Lunch");
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.date, date!(2024 - 01 - 15));
    }

    #[test]
    fn empty_form_reports_every_field() {
        let Err(Error::Validation(errors)) = ExpenseForm::default().validate() else {
            panic!("want validation error");
        };

        for field in ["amount", "description", "category", "date"] {
            assert!(errors.has(field), "want error for {field}");
        }
        assert_eq!(
            errors.summary(),
            "The amount field is required. (and 3 more errors)"
        );
    }

    #[test]
    fn long_category_is_rejected() {
        let form = ExpenseForm {
            amount: Some(json!(1)),
            description: Some("Lunch".to_owned()),
            category: Some("x".repeat(101)),
            date: Some("2024-01-15".to_owned()),
        };

        let Err(Error::Validation(errors)) = form.validate() else {
            panic!("want validation error");
        };

        assert_eq!(
            errors.summary(),
            "The category field must not be greater than 100 characters."
        );
    }

    #[test]
    fn list_query_rejects_reversed_dates() {
        let query = ExpenseListQuery {
            start_date: Some("2024-02-01".to_owned()),
            end_date: Some("2024-01-01".to_owned()),
            ..Default::default()
        };

        let Err(Error::Validation(errors)) = query.validate(&PaginationConfig::default()) else {
            panic!("want validation error");
        };

        assert!(errors.has("end_date"));
    }

    #[test]
    fn list_query_ignores_blank_category() {
        let query = ExpenseListQuery {
            category: Some("  ".to_owned()),
            ..Default::default()
        };

        let (filter, page) = query.validate(&PaginationConfig::default()).unwrap();

        assert_eq!(filter.category, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 15);
    }
}
