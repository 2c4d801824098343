//! Savings: money a user has put aside.

mod core;
mod endpoints;
mod form;

pub use core::{
    NewSaving, Saving, create_saving, create_saving_table, delete_saving, get_owned_saving,
    list_savings, update_saving,
};
pub use endpoints::{
    SavingState, create_saving_endpoint, delete_saving_endpoint, get_saving_endpoint,
    list_savings_endpoint, update_saving_endpoint,
};
pub use form::{SavingForm, SavingListQuery};
