use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use super::FilterArgs;
use crate::aggregate::{self, SortKey};
use crate::error::Result;
use crate::fmt::{long_date, money};
use crate::reports;

pub fn run(filters: &FilterArgs, sort: &str) -> Result<()> {
    let filter = filters.to_filter()?;
    let sort: SortKey = sort.parse()?;
    let store = super::open_store()?;
    let data = reports::get_history(store.expenses(), &filter, sort);

    let desc = reports::filter_description(&filter);
    if desc.is_empty() {
        println!("Expense History ({})", sort.label());
    } else {
        println!("Expense History ({}) {}", sort.label(), desc.dimmed());
    }

    if data.rows.is_empty() {
        println!("No expenses found. Add your first expense with `penny add <amount>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "", "Expense", "Category", "Date", "Payment", "Amount", ""]);
    for e in &data.rows {
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(e.category.icon()),
            Cell::new(e.title()),
            Cell::new(e.category),
            Cell::new(long_date(e.date)),
            Cell::new(e.payment_method),
            Cell::new(money(e.amount)).set_alignment(CellAlignment::Right),
            Cell::new(if e.has_receipt() { "\u{1F4CE}" } else { "" }),
        ]);
    }
    println!("{table}");
    println!(
        "{} {}  ({} expenses)",
        "Total:".bold(),
        money(data.total).blue().bold(),
        data.count
    );
    Ok(())
}

pub fn months() -> Result<()> {
    let store = super::open_store()?;
    let months = aggregate::months(store.expenses());
    if months.is_empty() {
        println!("No expenses yet.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Month", "", "Expenses", "Total"]);
    for m in months {
        let rows = aggregate::filter(
            store.expenses(),
            &aggregate::ExpenseFilter {
                month: Some(m),
                ..Default::default()
            },
        );
        table.add_row(vec![
            Cell::new(m),
            Cell::new(m.label()),
            Cell::new(rows.len()),
            Cell::new(money(aggregate::sum_amount(rows.iter().copied())))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    Ok(())
}
