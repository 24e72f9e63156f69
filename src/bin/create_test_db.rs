use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, Month, OffsetDateTime};

use family_budget::{
    Category, Frequency, RecurringTransaction, Transaction, TransactionType, create_goal,
    create_recurring_transaction, create_transaction, find_category_by_name, get_all_categories,
    initialize_db, set_budget, update_goal_progress,
};

/// A utility for creating a demo database for the family budget tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many months of transactions to create, ending with the current month.
    #[arg(long, default_value_t = 3)]
    months: u8,
}

/// Expenses repeated every month: day of month, description, amount, category.
const MONTHLY_EXPENSES: [(u8, &str, f64, &str); 9] = [
    (1, "Rent", 1800.0, "Housing"),
    (3, "Walmart Supercenter", 142.37, "Food & Groceries"),
    (6, "Shell Fuel", 61.2, "Transportation"),
    (9, "Netflix", 15.99, "Entertainment"),
    (12, "City Electric Co", 96.45, "Bills & Utilities"),
    (14, "Fresh Market Grocery", 88.1, "Food & Groceries"),
    (18, "Corner Pharmacy", 23.5, "Healthcare"),
    (21, "Amazon", 54.99, "Shopping"),
    (26, "Family dinner out", 72.0, "Food & Groceries"),
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
    let categories = get_all_categories(&conn)?;

    let today = OffsetDateTime::now_utc().date();
    let mut month_start = first_of_month(today);
    for _ in 1..args.months.max(1) {
        month_start = first_of_month(month_start - Duration::days(1));
    }

    println!("Creating transactions...");
    let mut transaction_count = 0;
    while month_start <= today {
        transaction_count += create_month_of_transactions(month_start, today, &categories, &conn)?;
        month_start = next_month(month_start);
    }

    println!("Creating budgets...");
    let current_year = today.year();
    let current_month = u8::from(today.month());
    for (name, amount) in [
        ("Food & Groceries", 600.0),
        ("Entertainment", 50.0),
        ("Transportation", 150.0),
        ("Shopping", 100.0),
    ] {
        set_budget(
            category_id(name, &categories)?,
            current_year,
            current_month,
            amount,
            &conn,
        )?;
    }

    println!("Creating goals...");
    let holiday = create_goal(
        "Family holiday",
        4000.0,
        Date::from_calendar_date(current_year + 1, Month::January, 15).ok(),
        "Summer trip to the beach",
        &conn,
    )?;
    update_goal_progress(holiday.id, 1250.0, &conn)?;
    create_goal("Emergency fund", 10000.0, None, "Three months of expenses", &conn)?;

    println!("Creating recurring transactions...");
    create_recurring_transaction(
        RecurringTransaction::build(1800.0, "Rent", Frequency::Monthly, first_of_month(today))
            .category_id(Some(category_id("Housing", &categories)?)),
        &conn,
    )?;
    create_recurring_transaction(
        RecurringTransaction::build(4200.0, "Salary", Frequency::Monthly, first_of_month(today))
            .category_id(Some(category_id("Income", &categories)?))
            .transaction_type(TransactionType::Income),
        &conn,
    )?;

    println!("Created {transaction_count} transactions.");
    println!("Success!");

    Ok(())
}

fn create_month_of_transactions(
    month_start: Date,
    today: Date,
    categories: &[Category],
    conn: &Connection,
) -> Result<usize, Box<dyn Error>> {
    create_transaction(
        Transaction::build(4200.0, month_start, "Salary")
            .category_id(Some(category_id("Income", categories)?))
            .transaction_type(TransactionType::Income)
            .account("Checking"),
        conn,
    )?;
    let mut count = 1;

    for (day, description, amount, category) in MONTHLY_EXPENSES {
        let Ok(date) = month_start.replace_day(day) else {
            continue;
        };

        if date > today {
            break;
        }

        create_transaction(
            Transaction::build(amount, date, description)
                .category_id(Some(category_id(category, categories)?))
                .account("Checking"),
            conn,
        )?;
        count += 1;
    }

    Ok(count)
}

fn category_id(name: &str, categories: &[Category]) -> Result<i64, Box<dyn Error>> {
    find_category_by_name(name, categories)
        .map(|category| category.id)
        .ok_or_else(|| format!("missing default category {name}").into())
}

fn first_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

fn next_month(month_start: Date) -> Date {
    let next = month_start.month().next();
    let year = if next == Month::January {
        month_start.year() + 1
    } else {
        month_start.year()
    };

    Date::from_calendar_date(year, next, 1).unwrap_or(Date::MAX)
}
