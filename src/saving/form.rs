use serde::Deserialize;
use serde_json::Value;

use crate::{
    Error,
    pagination::{PageRequest, PaginationConfig},
    saving::NewSaving,
    validation::{ValidationErrors, require_amount_value, require_date, require_text},
};

const MAX_DESCRIPTION_LENGTH: usize = 255;

/// The raw JSON body for creating or updating a saving.
#[derive(Debug, Default, Deserialize)]
pub struct SavingForm {
    /// A number, or a string holding a number.
    pub amount: Option<Value>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl SavingForm {
    /// Check every field, collecting all the problems before failing.
    ///
    /// # Errors
    /// Returns [Error::Validation] listing each invalid field.
    pub fn validate(&self) -> Result<NewSaving, Error> {
        let mut errors = ValidationErrors::default();

        let amount = require_amount_value(&mut errors, "amount", self.amount.as_ref());
        let description = require_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_LENGTH,
        );
        let date = require_date(&mut errors, "date", self.date.as_deref());

        errors.into_result()?;

        match (amount, description, date) {
            (Some(amount), Some(description), Some(date)) => Ok(NewSaving {
                amount,
                description,
                date,
            }),
            _ => Err(ValidationErrors::default().into()),
        }
    }
}

/// The raw query string for listing savings.
#[derive(Debug, Default, Deserialize)]
pub struct SavingListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl SavingListQuery {
    /// Parse the page parameters.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a page parameter is invalid.
    pub fn validate(&self, config: &PaginationConfig) -> Result<PageRequest, Error> {
        let mut errors = ValidationErrors::default();
        let page = PageRequest::parse(
            &mut errors,
            self.page.as_deref(),
            self.per_page.as_deref(),
            config,
        );
        errors.into_result()?;

        Ok(page)
    }
}
