use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use super::FilterArgs;
use crate::error::Result;
use crate::fmt::{long_date, money};
use crate::reports;

pub fn run(filters: &FilterArgs) -> Result<()> {
    let filter = filters.to_filter()?;
    let store = super::open_store()?;
    let data = reports::get_report(store.expenses(), &filter);

    println!("{}", "Expense Report".bold());
    let now = chrono::Local::now();
    println!(
        "Generated on {} at {}",
        long_date(now.date_naive()),
        now.format("%H:%M")
    );
    let desc = reports::filter_description(&filter);
    if !desc.is_empty() {
        println!("Filters: {desc}");
    }
    println!();

    if data.rows.is_empty() {
        println!("No expenses found. Try adjusting your filters.");
        return Ok(());
    }

    let mut summary = Table::new();
    summary.set_header(vec!["Total Expense", "Average Expense", "Total Transactions"]);
    summary.add_row(vec![
        Cell::new(money(data.total)),
        Cell::new(money(data.average)),
        Cell::new(data.count),
    ]);
    println!("{summary}");

    let mut cats = Table::new();
    cats.set_header(vec!["Category", "Count", "Amount"]);
    for item in &data.by_category {
        cats.add_row(vec![
            Cell::new(format!("{} {}", item.category.icon(), item.category)),
            Cell::new(item.count),
            Cell::new(money(item.total)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\nBy Category\n{cats}");

    let mut detail = Table::new();
    detail.set_header(vec!["Date", "Description", "Category", "Amount"]);
    for e in &data.rows {
        let desc = if e.description.trim().is_empty() { "-" } else { e.description.as_str() };
        detail.add_row(vec![
            Cell::new(long_date(e.date)),
            Cell::new(desc),
            Cell::new(e.category),
            Cell::new(money(e.amount)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\nDetailed Expenses\n{detail}");
    Ok(())
}
