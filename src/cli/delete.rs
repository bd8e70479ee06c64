use colored::Colorize;

use crate::error::Result;
use crate::fmt::{long_date, money};

pub fn run(id: i64, yes: bool) -> Result<()> {
    let mut store = super::open_store()?;
    let Some(expense) = store.get(id) else {
        println!("No expense with id {id}.");
        return Ok(());
    };

    let summary = format!(
        "{} {} on {} ({})",
        expense.title(),
        money(expense.amount),
        long_date(expense.date),
        expense.category
    );
    if !yes && !super::confirm(&format!("Delete {summary}?")) {
        println!("Cancelled.");
        return Ok(());
    }

    if store.remove(id)? {
        println!("{} {summary}", "Deleted".red().bold());
    }
    Ok(())
}
