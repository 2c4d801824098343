use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, macros::date};

use pocket_ledger::{
    Money, NewExpense, NewSaving, NewUser, PasswordHash, ValidatedPassword, create_expense,
    create_saving, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of pocket_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Recurring expenses as (description, category, amount in cents, day of the month).
const MONTHLY_EXPENSES: [(&str, &str, i64, i64); 6] = [
    ("Rent", "Housing", 185_000, 0),
    ("Groceries", "Food", 14_350, 3),
    ("Bus pass", "Transport", 6_000, 5),
    ("Takeaways", "Food", 3_275, 12),
    ("Electricity", "Utilities", 11_820, 18),
    ("Cinema", "Entertainment", 2_400, 23),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: "test@example.com".to_owned(),
            password_hash,
        },
        &conn,
    )?;

    println!("Creating expenses and savings...");

    let mut month_start = date!(2024 - 01 - 01);

    for month in 0..12 {
        for (description, category, cents, day) in MONTHLY_EXPENSES {
            let expense = NewExpense {
                amount: Money::new(Decimal::new(cents + month * 100, 2)),
                description: description.to_owned(),
                category: category.to_owned(),
                date: month_start + Duration::days(day),
            };
            create_expense(user.id, &expense, &conn)?;
        }

        let saving = NewSaving {
            amount: Money::new(Decimal::new(50_000, 2)),
            description: "Monthly transfer".to_owned(),
            date: month_start + Duration::days(1),
        };
        create_saving(user.id, &saving, &conn)?;

        month_start = next_month(month_start);
    }

    println!("Log in as test@example.com with the password \"test\".");
    println!("Success!");

    Ok(())
}

fn next_month(date: Date) -> Date {
    let mut next = date;

    while next.month() == date.month() {
        next += Duration::days(1);
    }

    next
}
