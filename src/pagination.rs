//! This modules defines the common functionality for paging data.

use serde::Serialize;

use crate::validation::{ValidationErrors, display_name};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of records per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 15,
            max_page_size: 100,
        }
    }
}

/// A validated request for one page of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The number of records per page.
    pub per_page: u64,
}

impl PageRequest {
    /// Parse the raw `page` and `per_page` query parameters, falling back to
    /// the defaults in `config` for missing values.
    ///
    /// Invalid values are recorded in `errors` and replaced with the defaults.
    pub fn parse(
        errors: &mut ValidationErrors,
        page: Option<&str>,
        per_page: Option<&str>,
        config: &PaginationConfig,
    ) -> Self {
        let page = parse_bounded(errors, "page", page, 1, u64::MAX).unwrap_or(config.default_page);
        let per_page = parse_bounded(errors, "per_page", per_page, 1, config.max_page_size)
            .unwrap_or(config.default_page_size);

        Self { page, per_page }
    }

    /// The number of records to skip to reach this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// The page size as an SQL `LIMIT`.
    pub fn sql_limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }

    /// The offset as an SQL `OFFSET`.
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset()).unwrap_or(i64::MAX)
    }
}

fn parse_bounded(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    min: u64,
    max: u64,
) -> Option<u64> {
    let value = value.map(str::trim).filter(|value| !value.is_empty())?;
    let name = display_name(field);

    match value.parse::<u64>() {
        Ok(number) if number < min => {
            errors.add(field, format!("The {name} field must be at least {min}."));
            None
        }
        Ok(number) if number > max => {
            errors.add(
                field,
                format!("The {name} field must not be greater than {max}."),
            );
            None
        }
        Ok(number) => Some(number),
        Err(_) => {
            errors.add(field, format!("The {name} field must be an integer."));
            None
        }
    }
}

/// One page of records plus the information needed to fetch the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// The records on this page.
    pub data: Vec<T>,
    pub current_page: u64,
    pub per_page: u64,
    /// The number of records across all pages.
    pub total: u64,
    /// The number of the final page, which is 1 even when there are no records.
    pub last_page: u64,
}

impl<T> Page<T> {
    /// Wrap the records fetched for `request`.
    ///
    /// `total` is the row count from SQL, which is never negative.
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        let total = u64::try_from(total).unwrap_or_default();

        Self {
            data,
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page: total.div_ceil(request.per_page).max(1),
        }
    }
}
