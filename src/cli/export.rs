use std::path::{Path, PathBuf};

use serde::Serialize;

use super::FilterArgs;
use crate::error::Result;
use crate::models::Expense;
use crate::reports;
use crate::settings::get_data_dir;

fn default_path(name: &str, ext: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    get_data_dir().join("exports").join(format!("{name}-{date}.{ext}"))
}

fn write_file(bytes: &[u8], path: &Path) -> Result<String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    let display = format!("{}", path.display());
    println!("Wrote {display}");
    Ok(display)
}

#[cfg(feature = "pdf")]
pub fn pdf(filters: &FilterArgs, output: Option<String>) -> Result<String> {
    let filter = filters.to_filter()?;
    let store = super::open_store()?;
    let report = reports::get_report(store.expenses(), &filter);
    let desc = reports::filter_description(&filter);
    let bytes = crate::pdf::render_report(&report, &desc, chrono::Local::now().naive_local())?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path("expense-report", "pdf"));
    tracing::info!(rows = report.count, path = %path.display(), "exporting pdf");
    write_file(&bytes, &path)
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    date: String,
    category: &'a str,
    amount: String,
    description: &'a str,
    payment_method: &'a str,
    has_receipt: bool,
}

impl<'a> From<&'a Expense> for CsvRow<'a> {
    fn from(e: &'a Expense) -> Self {
        Self {
            id: e.id,
            date: e.date.format("%Y-%m-%d").to_string(),
            category: e.category.name(),
            amount: format!("{:.2}", e.amount),
            description: &e.description,
            payment_method: e.payment_method.name(),
            has_receipt: e.has_receipt(),
        }
    }
}

pub fn write_csv<'a, W: std::io::Write>(
    rows: impl IntoIterator<Item = &'a Expense>,
    out: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for e in rows {
        wtr.serialize(CsvRow::from(e))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn csv(filters: &FilterArgs, output: Option<String>) -> Result<String> {
    let filter = filters.to_filter()?;
    let store = super::open_store()?;
    let report = reports::get_report(store.expenses(), &filter);
    let mut buf = Vec::new();
    write_csv(report.rows.iter().copied(), &mut buf)?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path("expenses", "csv"));
    tracing::info!(rows = report.count, path = %path.display(), "exporting csv");
    write_file(&buf, &path)
}
