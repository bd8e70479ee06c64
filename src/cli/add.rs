use std::path::Path;

use colored::Colorize;

use crate::error::{PennyError, Result};
use crate::fmt::{long_date, money};
use crate::models::{parse_date, Category, NewExpense, PaymentMethod};

/// Parse the amount the user typed. Non-numeric input is an invalid amount,
/// same as a non-positive one.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    cleaned
        .parse::<f64>()
        .map_err(|_| PennyError::InvalidAmount(raw.to_string()))
}

pub fn run(
    amount: &str,
    category: &str,
    date: Option<&str>,
    description: Option<&str>,
    payment: &str,
    receipt: Option<&str>,
) -> Result<()> {
    let amount = parse_amount(amount)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PennyError::InvalidAmount(amount.to_string()));
    }
    let category: Category = category.parse()?;
    let payment_method: PaymentMethod = payment.parse()?;
    let date = match date {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    // Read the attachment fully before anything is recorded.
    let receipt = receipt
        .map(|p| crate::receipt::attach(Path::new(&crate::settings::shellexpand_path(p))))
        .transpose()?;

    let mut store = super::open_store()?;
    let expense = store.add(NewExpense {
        date,
        category,
        amount,
        description: description.unwrap_or("").trim().to_string(),
        payment_method,
        receipt,
    })?;

    println!(
        "{} {} {} {}",
        "Added".green().bold(),
        expense.category.icon(),
        expense.title(),
        money(expense.amount).bold()
    );
    println!(
        "  {} \u{2022} {} \u{2022} {} \u{2022} id {}{}",
        expense.category,
        long_date(expense.date),
        expense.payment_method,
        expense.id,
        if expense.has_receipt() { " \u{2022} receipt attached" } else { "" }
    );

    let recent = store.recent(5);
    if recent.len() > 1 {
        println!("\nRecent expenses");
        for e in recent {
            println!(
                "  {:<10} {:<30} {:>12}",
                e.date.format("%b %-d").to_string(),
                e.title(),
                money(e.amount)
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50").unwrap(), 12.5);
        assert_eq!(parse_amount("$1,200").unwrap(), 1200.0);
        assert_eq!(parse_amount(" 3 ").unwrap(), 3.0);
        assert_eq!(parse_amount("-5").unwrap(), -5.0);
        assert!(matches!(parse_amount("abc"), Err(PennyError::InvalidAmount(_))));
        assert!(parse_amount("").is_err());
    }
}
