pub mod add;
pub mod backup;
pub mod dashboard;
pub mod delete;
pub mod export;
pub mod history;
pub mod init;
pub mod receipt;
pub mod report;
pub mod status;
pub mod summary;

use std::io::Write;

use clap::{Args, Parser, Subcommand};

use crate::aggregate::{parse_category_filter, parse_month_filter, DateRange, ExpenseFilter};
use crate::db::{get_connection, DB_FILE};
use crate::error::Result;
use crate::models::parse_date;
use crate::settings::get_data_dir;
use crate::store::ExpenseStore;

/// Open the expense store in the configured data directory, creating the
/// directory and database on first use.
pub(crate) fn open_store() -> Result<ExpenseStore> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let conn = get_connection(&data_dir.join(DB_FILE))?;
    ExpenseStore::load(conn)
}

pub(crate) fn prompt(label: &str) -> String {
    print!("{label}");
    let _ = std::io::stdout().flush();
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input);
    input.trim().to_string()
}

pub(crate) fn confirm(label: &str) -> bool {
    matches!(prompt(&format!("{label} [y/N] ")).to_lowercase().as_str(), "y" | "yes")
}

#[derive(Parser)]
#[command(
    name = "penny",
    version,
    about = "Track your daily expenses and take control of your money."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Filters shared by history, report, and export. All given filters must match.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Text to find in the description or category name
    #[arg(long, short = 's')]
    pub search: Option<String>,
    /// Category name, or "All"
    #[arg(long, short = 'c')]
    pub category: Option<String>,
    /// Month: YYYY-MM, or "All"
    #[arg(long, short = 'm')]
    pub month: Option<String>,
    /// Start date (inclusive): YYYY-MM-DD
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date (inclusive): YYYY-MM-DD
    #[arg(long = "to")]
    pub to_date: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<ExpenseFilter> {
        Ok(ExpenseFilter {
            query: self.search.clone().filter(|s| !s.is_empty()),
            category: match self.category.as_deref() {
                Some(c) => parse_category_filter(c)?,
                None => None,
            },
            month: match self.month.as_deref() {
                Some(m) => parse_month_filter(m)?,
                None => None,
            },
            range: DateRange {
                start: self.from_date.as_deref().map(parse_date).transpose()?,
                end: self.to_date.as_deref().map(parse_date).transpose()?,
            },
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and create the expense database.
    Init {
        /// Path for Penny data (default: ~/Documents/penny)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Your name, used in the dashboard greeting
        #[arg(long)]
        name: Option<String>,
    },
    /// Log a new expense.
    Add {
        /// Amount spent, e.g. 12.50
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Food, Transport, Bills, Entertainment, Health, Shopping, Other
        #[arg(long, short = 'c', default_value = "Food")]
        category: String,
        /// Date of the expense: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// What the money went on
        #[arg(long, short = 'd')]
        description: Option<String>,
        /// Cash, Credit Card, Debit Card, UPI, Bank Transfer
        #[arg(long, short = 'p', default_value = "Cash")]
        payment: String,
        /// Image or PDF receipt to attach
        #[arg(long)]
        receipt: Option<String>,
    },
    /// Delete an expense by ID.
    Delete {
        /// Expense ID (shown in `penny history`)
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List expenses with search, filters, and sorting.
    History {
        #[command(flatten)]
        filters: FilterArgs,
        /// date-desc, date-asc, amount-desc, amount-asc
        #[arg(long, default_value = "date-desc")]
        sort: String,
    },
    /// List the months that have expenses, newest first.
    Months,
    /// Print this month's summary: totals, categories, weekly trend.
    Summary,
    /// Interactive dashboard.
    Dashboard,
    /// Expense report for a date range and category.
    Report {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Export a filtered report.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// View or save receipt attachments.
    Receipt {
        #[command(subcommand)]
        command: ReceiptCommands,
    },
    /// Back up the expense database.
    Backup {
        /// Output path (default: <data_dir>/backups/penny-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show data location and record counts.
    Status,
    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the report to PDF.
    #[cfg(feature = "pdf")]
    Pdf {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file path (default: <data_dir>/exports/expense-report-YYYY-MM-DD.pdf)
        #[arg(long)]
        output: Option<String>,
    },
    /// Export matching expenses to CSV.
    Csv {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file path (default: <data_dir>/exports/expenses-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReceiptCommands {
    /// Show an expense and its receipt details.
    Show {
        id: i64,
    },
    /// Write an expense's receipt to disk.
    Save {
        id: i64,
        /// File or directory (default: <data_dir>/receipts)
        #[arg(long)]
        output: Option<String>,
    },
}
