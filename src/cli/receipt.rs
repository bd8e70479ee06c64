use std::path::PathBuf;

use crate::error::{PennyError, Result};
use crate::fmt::{format_bytes, long_date, money};
use crate::receipt;
use crate::settings::{get_data_dir, shellexpand_path};

pub fn show(id: i64) -> Result<()> {
    let store = super::open_store()?;
    let Some(e) = store.get(id) else {
        println!("No expense with id {id}.");
        return Ok(());
    };

    println!("Expense:   {} {}", e.category.icon(), e.title());
    println!("Amount:    {}", money(e.amount));
    println!("Date:      {}", long_date(e.date));
    println!("Category:  {}", e.category);
    println!("Payment:   {}", e.payment_method);
    match e.receipt.as_deref() {
        Some(url) => {
            let (mime, bytes) = receipt::decode(url)?;
            println!("Receipt:   {mime}, {}", format_bytes(bytes.len() as u64));
            println!("           save with `penny receipt save {id}`");
        }
        None => println!("Receipt:   (none)"),
    }
    Ok(())
}

pub fn save(id: i64, output: Option<String>) -> Result<()> {
    let store = super::open_store()?;
    let expense = store
        .get(id)
        .ok_or_else(|| PennyError::Other(format!("No expense with id {id}")))?;
    let output = output.map(|p| PathBuf::from(shellexpand_path(&p)));
    let path = receipt::save(expense, output.as_deref(), &get_data_dir().join("receipts"))?;
    println!("Saved receipt to {}", path.display());
    Ok(())
}
