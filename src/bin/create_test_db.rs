use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use moneypenny::initialize_db;

/// A utility for creating a test database for the MoneyPenny web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const SAMPLE_ACCOUNTS: [(&str, Option<&str>); 3] = [
    ("Checking", Some("Everyday spending")),
    ("Savings", Some("Emergency fund")),
    ("Cash", None),
];

const SAMPLE_TRANSACTIONS: [(f64, &str, &str); 6] = [
    (2500.0, "Salary", "Checking"),
    (-64.2, "Groceries", "Checking"),
    (-12.5, "Lunch", "Checking"),
    (500.0, "Monthly transfer", "Savings"),
    (-20.0, "Taxi", "Cash"),
    (-3.75, "Coffee", "Cash"),
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

    println!("Creating test accounts...");
    for (name, description) in SAMPLE_ACCOUNTS {
        conn.execute(
            "INSERT INTO accounts (name, description) VALUES (?1, ?2)",
            (name, description),
        )?;
    }

    println!("Creating test transactions...");
    for (amount, description, account_name) in SAMPLE_TRANSACTIONS {
        conn.execute(
            "INSERT INTO transactions (amount, description, accountid)
            SELECT ?1, ?2, id FROM accounts WHERE name = ?3",
            (amount, description, account_name),
        )?;
    }

    println!("Success!");

    Ok(())
}
