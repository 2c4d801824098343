//! Expenses: money a user has spent, grouped by category.

mod core;
mod endpoints;
mod form;

pub use core::{
    Expense, ExpenseFilter, NewExpense, create_expense, create_expense_table, delete_expense,
    get_expense, get_owned_expense, list_expenses, update_expense,
};
pub use endpoints::{
    ExpenseState, create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
    list_expenses_endpoint, update_expense_endpoint,
};
pub use form::{ExpenseForm, ExpenseListQuery};
